use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub langbase: LangbaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub pipes: PipeConfig,
    pub artifacts: ArtifactConfig,
    pub document: DocumentConfig,
    pub pipeline: PipelineConfig,
}

/// Langbase API configuration
#[derive(Debug, Clone)]
pub struct LangbaseConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

/// Langbase pipe name configuration
#[derive(Debug, Clone)]
pub struct PipeConfig {
    /// Pipe shared by every negotiation stage; the persona travels in the system message.
    pub agent: String,
    pub classifier: String,
}

/// Sidecar artifact configuration
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Root directory; each run writes under `<root>/<run_id>/`.
    pub root: PathBuf,
}

/// Contract text budgets
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub max_pages: usize,
    pub pipeline_max_chars: usize,
    pub classifier_max_chars: usize,
}

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub stage_timeout_ms: u64,
    pub include_coaching: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let langbase = LangbaseConfig {
            api_key: env::var("LANGBASE_API_KEY").map_err(|_| AppError::Config {
                message: "LANGBASE_API_KEY is required".to_string(),
            })?,
            base_url: env::var("LANGBASE_BASE_URL")
                .unwrap_or_else(|_| "https://api.langbase.com".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: parse_env("REQUEST_TIMEOUT_MS").unwrap_or(120_000),
        };

        let pipes = PipeConfig {
            agent: env::var("PIPE_AGENT").unwrap_or_else(|_| "war-room-agent-v1".to_string()),
            classifier: env::var("PIPE_CLASSIFIER")
                .unwrap_or_else(|_| "war-room-classifier-v1".to_string()),
        };

        let artifacts = ArtifactConfig {
            root: PathBuf::from(
                env::var("ARTIFACT_DIR").unwrap_or_else(|_| "./data/runs".to_string()),
            ),
        };

        let document = DocumentConfig {
            max_pages: parse_env("DOCUMENT_MAX_PAGES").unwrap_or(5),
            pipeline_max_chars: parse_env("PIPELINE_MAX_CHARS").unwrap_or(5000),
            classifier_max_chars: parse_env("CLASSIFIER_MAX_CHARS").unwrap_or(10_000),
        };

        let pipeline = PipelineConfig {
            stage_timeout_ms: parse_env("STAGE_TIMEOUT_MS").unwrap_or(180_000),
            include_coaching: parse_flag("INCLUDE_COACHING").unwrap_or(true),
        };

        Ok(Config {
            langbase,
            logging,
            request,
            pipes,
            artifacts,
            document,
            pipeline,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Boolean switch; accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`.
fn parse_flag(key: &str) -> Option<bool> {
    let value = env::var(key).ok()?;
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 120_000 }
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            agent: "war-room-agent-v1".to_string(),
            classifier: "war-room-classifier-v1".to_string(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_pages: 5,
            pipeline_max_chars: 5000,
            classifier_max_chars: 10_000,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout_ms: 180_000,
            include_coaching: true,
        }
    }
}
