use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contract_war_room::{
    config::{Config, LogFormat},
    generation::LangbaseGenerator,
    langbase::LangbaseClient,
    AggressionProfile, ContractDocument, SimulationOptions, WarRoom,
};

/// Simulate a contract negotiation between an aggressive advocate, a
/// protective advocate, a mediator and a negotiation coach.
#[derive(Debug, Parser)]
#[command(name = "war-room", version, about)]
struct Cli {
    /// Contract as extracted plain text (pages separated by form feeds).
    contract: PathBuf,

    /// Intensity of the adversarial stage: diplomat, professional or killer.
    #[arg(long, default_value = "professional")]
    aggression: AggressionProfile,

    /// Override the detected role of the party you represent.
    #[arg(long)]
    user_role: Option<String>,

    /// Override the detected role of the other party.
    #[arg(long)]
    counter_party: Option<String>,

    /// Skip the negotiation coaching stage.
    #[arg(long)]
    no_coaching: bool,

    /// Print the report as JSON instead of markdown.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        contract = %cli.contract.display(),
        "Contract War Room starting..."
    );

    let document = match ContractDocument::load(&cli.contract) {
        Ok(d) => d,
        Err(e) => {
            error!(error = %e, "Failed to load contract");
            return Err(e.into());
        }
    };

    // Initialize Langbase client
    let langbase = match LangbaseClient::new(&config.langbase, config.request.clone()) {
        Ok(c) => {
            info!(base_url = %config.langbase.base_url, "Langbase client initialized");
            c
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Langbase client");
            return Err(e.into());
        }
    };

    let agent = Arc::new(LangbaseGenerator::new(langbase.clone(), &config.pipes.agent));
    let classifier = Arc::new(LangbaseGenerator::new(langbase, &config.pipes.classifier));
    let war_room = WarRoom::from_config(&config, agent, classifier);

    let options = SimulationOptions {
        aggression: cli.aggression,
        user_role: cli.user_role,
        counter_party: cli.counter_party,
        include_coaching: config.pipeline.include_coaching && !cli.no_coaching,
    };

    let report = war_room.simulate(&document, &options).await;

    match war_room.save_report(&report) {
        Ok(path) => info!(path = %path.display(), "Report written"),
        Err(e) => warn!(error = %e, "Failed to write report"),
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.to_markdown());
    }

    info!(run_id = %report.run_id, "Simulation complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
