//! Data types for the negotiation pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::AggressionProfile;
use crate::error::GenerationResult;
use crate::generation::{Generation, RoleDescriptor};

/// Returned when no tier of the extraction chain produced text.
pub const OUTPUT_NOT_GENERATED: &str = "Simulation error: output not generated.";

/// Returned when a stage's text looks like leaked task metadata.
pub const METADATA_LEAK: &str =
    "Data cleaning error: internal task metadata leaked instead of report content.";

/// Returned for the coaching slot when the coaching stage was not built.
pub const STAGE_SKIPPED: &str = "Not requested: negotiation coaching was disabled for this run.";

/// The four kinds of stage in a negotiation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Adversarial advocate for the counter-party.
    Attack,
    /// Protective advocate for the user.
    Defense,
    /// Neutral mediator producing clause-level redlines.
    Verdict,
    /// Coach turning the verdict into a negotiation playbook.
    Negotiation,
}

impl StageKind {
    /// Every stage kind, in pipeline order.
    pub const ALL: [StageKind; 4] = [
        StageKind::Attack,
        StageKind::Defense,
        StageKind::Verdict,
        StageKind::Negotiation,
    ];

    /// Symbolic stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Attack => "attack",
            StageKind::Defense => "defense",
            StageKind::Verdict => "verdict",
            StageKind::Negotiation => "negotiation",
        }
    }

    /// Key of this stage's output in the run result mapping.
    pub fn result_key(&self) -> &'static str {
        match self {
            StageKind::Attack => "shark_report",
            StageKind::Defense => "shield_report",
            StageKind::Verdict => "final_verdict",
            StageKind::Negotiation => "negotiation_strategy",
        }
    }

    /// File name of the stage's sidecar artifact.
    pub fn artifact_name(&self) -> String {
        format!("{}.md", self.as_str())
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle to a stage already added to a [`PipelineBuilder`](super::PipelineBuilder).
///
/// Handles are only minted by `add_stage` and carry the id of the builder
/// that minted them, so a stage can only name stages added before it to
/// the same builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId {
    pub(crate) builder: u64,
    pub(crate) index: usize,
}

impl StageId {
    /// Position of the stage in execution order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One unit of work in the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineStage {
    pub(crate) index: usize,
    pub(crate) kind: StageKind,
    pub(crate) role: RoleDescriptor,
    pub(crate) task: String,
    pub(crate) upstream: Vec<StageId>,
    pub(crate) artifact_name: String,
}

impl PipelineStage {
    /// Position in execution order (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Stage kind.
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// Symbolic name.
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Role descriptor sent to the generator.
    pub fn role(&self) -> &RoleDescriptor {
        &self.role
    }

    /// Task description sent to the generator.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Stages whose outputs become this stage's context, in declaration order.
    pub fn upstream(&self) -> &[StageId] {
        &self.upstream
    }

    /// Sidecar artifact file name.
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }
}

/// Outcome of executing one stage.
pub type StageResult = GenerationResult<Generation>;

/// Lifecycle of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Stages constructed, none executed.
    Built,
    Running,
    /// Every stage has a result.
    Completed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineState::Built => "built",
            PipelineState::Running => "running",
            PipelineState::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// Where a resolved output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    /// Read from the in-memory stage result.
    Generated,
    /// Read from the stage's sidecar artifact.
    RecoveredFromSidecar,
    /// No tier produced text; the text is [`OUTPUT_NOT_GENERATED`].
    Missing,
    /// Text looked like leaked metadata; the text is [`METADATA_LEAK`].
    MetadataLeak,
    /// Stage was not part of this run; the text is [`STAGE_SKIPPED`].
    Skipped,
}

/// A stage output after the extraction chain, tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOutput {
    pub text: String,
    pub status: OutputStatus,
}

impl ResolvedOutput {
    pub(crate) fn missing() -> Self {
        Self {
            text: OUTPUT_NOT_GENERATED.to_string(),
            status: OutputStatus::Missing,
        }
    }

    pub(crate) fn metadata_leak() -> Self {
        Self {
            text: METADATA_LEAK.to_string(),
            status: OutputStatus::MetadataLeak,
        }
    }

    pub(crate) fn skipped() -> Self {
        Self {
            text: STAGE_SKIPPED.to_string(),
            status: OutputStatus::Skipped,
        }
    }

    /// True when the text is real stage content rather than a sentinel.
    pub fn is_content(&self) -> bool {
        matches!(
            self.status,
            OutputStatus::Generated | OutputStatus::RecoveredFromSidecar
        )
    }
}

/// Resolved outputs of a run, keyed by result key.
///
/// All four keys are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutputs {
    pub run_id: String,
    pub outputs: BTreeMap<String, ResolvedOutput>,
}

impl RunOutputs {
    /// Resolved output for a stage kind.
    pub fn get(&self, kind: StageKind) -> Option<&ResolvedOutput> {
        self.outputs.get(kind.result_key())
    }

    /// Text for a stage kind, sentinel included.
    pub fn text(&self, kind: StageKind) -> &str {
        self.get(kind)
            .map(|o| o.text.as_str())
            .unwrap_or(OUTPUT_NOT_GENERATED)
    }

    /// Plain `{result_key: text}` mapping.
    pub fn into_text_map(self) -> BTreeMap<String, String> {
        self.outputs
            .into_iter()
            .map(|(key, output)| (key, output.text))
            .collect()
    }
}

/// Everything needed to build the standard negotiation stages.
#[derive(Debug, Clone)]
pub struct NegotiationInputs {
    pub contract_text: String,
    pub user_role: String,
    pub counter_party: String,
    pub aggression: AggressionProfile,
    pub include_coaching: bool,
}

impl NegotiationInputs {
    /// Inputs with the default profile and coaching enabled.
    pub fn new(
        contract_text: impl Into<String>,
        user_role: impl Into<String>,
        counter_party: impl Into<String>,
    ) -> Self {
        Self {
            contract_text: contract_text.into(),
            user_role: user_role.into(),
            counter_party: counter_party.into(),
            aggression: AggressionProfile::default(),
            include_coaching: true,
        }
    }

    /// Set the aggression profile.
    pub fn with_aggression(mut self, aggression: AggressionProfile) -> Self {
        self.aggression = aggression;
        self
    }

    /// Enable or disable the coaching stage.
    pub fn with_coaching(mut self, include: bool) -> Self {
        self.include_coaching = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_names() {
        assert_eq!(StageKind::Attack.as_str(), "attack");
        assert_eq!(StageKind::Negotiation.to_string(), "negotiation");
        assert_eq!(StageKind::Verdict.artifact_name(), "verdict.md");
    }

    #[test]
    fn test_stage_kind_result_keys() {
        let keys: Vec<&str> = StageKind::ALL.iter().map(|k| k.result_key()).collect();
        assert_eq!(
            keys,
            vec![
                "shark_report",
                "shield_report",
                "final_verdict",
                "negotiation_strategy"
            ]
        );
    }

    #[test]
    fn test_resolved_output_is_content() {
        assert!(!ResolvedOutput::missing().is_content());
        assert!(!ResolvedOutput::metadata_leak().is_content());
        assert!(!ResolvedOutput::skipped().is_content());
        let generated = ResolvedOutput {
            text: "x".to_string(),
            status: OutputStatus::Generated,
        };
        assert!(generated.is_content());
    }

    #[test]
    fn test_run_outputs_text_map() {
        let mut outputs = BTreeMap::new();
        outputs.insert("shark_report".to_string(), ResolvedOutput::missing());
        let run = RunOutputs {
            run_id: "r".to_string(),
            outputs,
        };
        assert_eq!(run.text(StageKind::Attack), OUTPUT_NOT_GENERATED);
        assert_eq!(run.text(StageKind::Defense), OUTPUT_NOT_GENERATED);
        let map = run.into_text_map();
        assert_eq!(map.get("shark_report").unwrap(), OUTPUT_NOT_GENERATED);
    }

    #[test]
    fn test_output_status_serialization() {
        let json = serde_json::to_string(&OutputStatus::RecoveredFromSidecar).unwrap();
        assert_eq!(json, "\"recovered_from_sidecar\"");
    }

    #[test]
    fn test_negotiation_inputs_builder() {
        let inputs = NegotiationInputs::new("text", "Tenant", "Landlord")
            .with_aggression(crate::pipeline::AggressionProfile::Killer)
            .with_coaching(false);
        assert_eq!(inputs.aggression, crate::pipeline::AggressionProfile::Killer);
        assert!(!inputs.include_coaching);
    }
}
