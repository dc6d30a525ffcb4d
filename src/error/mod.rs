use std::path::PathBuf;

use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Langbase error: {0}")]
    Langbase(#[from] LangbaseError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

/// Langbase API errors
#[derive(Debug, Error)]
pub enum LangbaseError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure of a single generation call. This is the only error a stage result carries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation failed: {message}")]
    Collaborator { message: String },

    #[error("generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("generation returned an empty response")]
    EmptyResponse,
}

/// Sidecar artifact I/O errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Contract document loading errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document contains no text")]
    Empty,
}

/// A clause comparison block that could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClauseBlockError {
    #[error("block has no '{marker}' marker")]
    MissingMarker { marker: &'static str },

    #[error("block has neither original nor revised text")]
    Empty,
}

impl From<LangbaseError> for GenerationError {
    fn from(err: LangbaseError) -> Self {
        match err {
            LangbaseError::Timeout { timeout_ms } => GenerationError::Timeout { timeout_ms },
            other => GenerationError::Collaborator {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for Langbase operations
pub type LangbaseResult<T> = Result<T, LangbaseError>;

/// Result type alias for generation calls
pub type GenerationResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");
    }

    #[test]
    fn test_langbase_error_display() {
        let err = LangbaseError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - Invalid API key");

        let err = LangbaseError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::Collaborator {
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "generation failed: boom");
        assert_eq!(
            GenerationError::EmptyResponse.to_string(),
            "generation returned an empty response"
        );
    }

    #[test]
    fn test_langbase_timeout_maps_to_generation_timeout() {
        let err: GenerationError = LangbaseError::Timeout { timeout_ms: 42 }.into();
        assert_eq!(err, GenerationError::Timeout { timeout_ms: 42 });
    }

    #[test]
    fn test_langbase_api_maps_to_collaborator() {
        let err: GenerationError = LangbaseError::Api {
            status: 500,
            message: "down".to_string(),
        }
        .into();
        match err {
            GenerationError::Collaborator { message } => {
                assert!(message.contains("500"));
                assert!(message.contains("down"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_clause_block_error_display() {
        let err = ClauseBlockError::MissingMarker {
            marker: "REVISED:",
        };
        assert_eq!(err.to_string(), "block has no 'REVISED:' marker");
    }

    #[test]
    fn test_document_error_wraps_into_app_error() {
        let err: AppError = DocumentError::Empty.into();
        assert_eq!(err.to_string(), "Document error: document contains no text");
    }
}
