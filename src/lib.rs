//! # Contract War Room
//!
//! A multi-agent contract negotiation simulator. A contract is classified
//! (parties, risk) and then run through a fixed pipeline of role-played
//! generation stages backed by Langbase Pipes:
//!
//! - **Attack**: an aggressive advocate for the counter-party
//! - **Defense**: a protective advocate for the user
//! - **Verdict**: a neutral mediator producing clause-level redlines
//! - **Negotiation**: a coach turning the verdict into a playbook
//!
//! ## Architecture
//!
//! ```text
//! ContractDocument → classifier ─┐
//!                                ▼
//!            NegotiationPipeline (attack → defense → verdict → negotiation)
//!                                │            │
//!                     Generator (Langbase)   sidecars: <root>/<run_id>/<stage>.md
//!                                ▼
//!                 RunOutputs → redline parser → SimulationReport
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use contract_war_room::{Config, ContractDocument, SimulationOptions, WarRoom};
//! use contract_war_room::generation::LangbaseGenerator;
//! use contract_war_room::langbase::LangbaseClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = LangbaseClient::new(&config.langbase, config.request.clone())?;
//!     let agent = Arc::new(LangbaseGenerator::new(client.clone(), &config.pipes.agent));
//!     let classifier = Arc::new(LangbaseGenerator::new(client, &config.pipes.classifier));
//!     let war_room = WarRoom::from_config(&config, agent, classifier);
//!
//!     let document = ContractDocument::load("lease.txt")?;
//!     let report = war_room.simulate(&document, &SimulationOptions::default()).await;
//!     println!("{}", report.to_markdown());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Contract party and risk classification.
pub mod classifier;
/// Configuration management.
pub mod config;
/// Contract text loading and excerpting.
pub mod document;
/// Error types and result aliases for the application.
pub mod error;
/// The text-generation collaborator and its Langbase adapter.
pub mod generation;
/// Langbase API client and types for pipe communication.
pub mod langbase;
/// Stage graph, execution and output extraction.
pub mod pipeline;
/// Persona and task prompts for every stage.
pub mod prompts;
/// Word-level diffs and clause comparison parsing.
pub mod redline;
/// End-to-end simulation and reporting.
pub mod simulation;

pub use config::Config;
pub use document::ContractDocument;
pub use error::{AppError, AppResult};
pub use pipeline::{AggressionProfile, NegotiationInputs, PersonaConfig, RunOutputs};
pub use simulation::{SimulationOptions, SimulationReport, WarRoom};
