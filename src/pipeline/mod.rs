//! Multi-stage negotiation pipeline.
//!
//! A run is built as a small DAG of stages ([`PipelineBuilder`]), executed
//! strictly in order against a [`Generator`] ([`NegotiationPipeline::execute`])
//! and then reduced to one text per stage through the extraction chain
//! ([`CompletedRun::outputs`]).
//!
//! ```text
//! attack ──► defense ──► verdict ──► negotiation
//!    └──────────────────────▲
//! ```
//!
//! A failing stage never aborts the run: downstream stages receive a
//! placeholder in its place and the result mapping still carries every key.

mod artifacts;
mod builder;
mod executor;
mod extract;
mod persona;
mod types;

pub use artifacts::ArtifactStore;
pub use builder::{NegotiationPipeline, PipelineBuilder, PipelineSettings};
pub use executor::{context_text, CompletedRun};
pub use persona::{AggressionProfile, PersonaConfig};
pub use types::{
    NegotiationInputs, OutputStatus, PipelineStage, PipelineState, ResolvedOutput, RunOutputs,
    StageId, StageKind, StageResult, METADATA_LEAK, OUTPUT_NOT_GENERATED, STAGE_SKIPPED,
};

use tracing::info;

use crate::generation::Generator;

/// Build, execute and resolve a full negotiation run.
pub async fn run(
    generator: &dyn Generator,
    inputs: &NegotiationInputs,
    personas: &PersonaConfig,
    settings: &PipelineSettings,
) -> RunOutputs {
    let completed = run_to_completion(generator, inputs, personas, settings).await;
    completed.outputs()
}

/// Like [`run`], but hands back the completed run for further inspection.
pub async fn run_to_completion(
    generator: &dyn Generator,
    inputs: &NegotiationInputs,
    personas: &PersonaConfig,
    settings: &PipelineSettings,
) -> CompletedRun {
    let pipeline = NegotiationPipeline::negotiation(inputs, personas, settings);
    info!(
        run_id = %pipeline.run_id(),
        aggression = %inputs.aggression,
        user_role = %inputs.user_role,
        counter_party = %inputs.counter_party,
        "Starting negotiation run"
    );
    pipeline.execute(generator).await
}
