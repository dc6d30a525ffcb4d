//! Stage graph construction.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use super::artifacts::ArtifactStore;
use super::persona::PersonaConfig;
use super::types::{NegotiationInputs, PipelineStage, PipelineState, StageId, StageKind};
use crate::config::Config;
use crate::generation::RoleDescriptor;
use crate::prompts;
use crate::redline::ClauseProtocol;

/// Run-independent settings for building pipelines.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Root under which each run gets its own artifact directory.
    pub artifact_root: PathBuf,
    /// Upper bound on one stage's generation call.
    pub stage_timeout: Duration,
}

impl PipelineSettings {
    /// Settings from application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            artifact_root: config.artifacts.root.clone(),
            stage_timeout: Duration::from_millis(config.pipeline.stage_timeout_ms),
        }
    }
}

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(0);

/// Collects stages in execution order.
#[derive(Debug)]
pub struct PipelineBuilder {
    id: u64,
    stages: Vec<PipelineStage>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
            stages: Vec::new(),
        }
    }
}

impl PipelineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage whose context is the output of `upstream`, in order.
    ///
    /// Handles minted by another builder are dropped with a warning, so the
    /// stored upstream list only ever names earlier stages of this builder.
    pub fn add_stage(
        &mut self,
        kind: StageKind,
        role: RoleDescriptor,
        task: impl Into<String>,
        upstream: &[StageId],
    ) -> StageId {
        let index = self.stages.len();
        let (accepted, foreign): (Vec<StageId>, Vec<StageId>) = upstream
            .iter()
            .copied()
            .partition(|id| id.builder == self.id && id.index < index);
        if !foreign.is_empty() {
            warn!(
                stage = kind.as_str(),
                dropped = foreign.len(),
                "Ignoring upstream handles not minted by this builder"
            );
        }
        self.stages.push(PipelineStage {
            index,
            kind,
            role,
            task: task.into(),
            upstream: accepted,
            artifact_name: kind.artifact_name(),
        });
        StageId {
            builder: self.id,
            index,
        }
    }

    /// Number of stages added so far.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when no stage has been added.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Finish building for a specific run.
    pub fn build(self, run_id: impl Into<String>, settings: &PipelineSettings) -> NegotiationPipeline {
        let run_id = run_id.into();
        let artifacts = ArtifactStore::for_run(&settings.artifact_root, &run_id);
        info!(
            run_id = %run_id,
            stages = self.stages.len(),
            state = %PipelineState::Built,
            "Pipeline built"
        );
        NegotiationPipeline {
            run_id,
            stages: self.stages,
            artifacts,
            stage_timeout: settings.stage_timeout,
        }
    }
}

/// A built, not yet executed, pipeline.
#[derive(Debug, Clone)]
pub struct NegotiationPipeline {
    pub(crate) run_id: String,
    pub(crate) stages: Vec<PipelineStage>,
    pub(crate) artifacts: ArtifactStore,
    pub(crate) stage_timeout: Duration,
}

impl NegotiationPipeline {
    /// Build the standard attack → defense → verdict (→ coaching) graph for a
    /// fresh run id.
    pub fn negotiation(
        inputs: &NegotiationInputs,
        personas: &PersonaConfig,
        settings: &PipelineSettings,
    ) -> Self {
        let mut builder = PipelineBuilder::new();

        let attack = builder.add_stage(
            StageKind::Attack,
            prompts::shark_role(&inputs.counter_party, personas.backstory(inputs.aggression)),
            prompts::attack_task(&inputs.contract_text, &inputs.counter_party),
            &[],
        );
        let defense = builder.add_stage(
            StageKind::Defense,
            prompts::shield_role(&inputs.user_role),
            prompts::defense_task(&inputs.contract_text, &inputs.user_role),
            &[attack],
        );
        let verdict = builder.add_stage(
            StageKind::Verdict,
            prompts::mediator_role(),
            prompts::verdict_task(&inputs.contract_text, &ClauseProtocol::default()),
            &[attack, defense],
        );
        if inputs.include_coaching {
            builder.add_stage(
                StageKind::Negotiation,
                prompts::coach_role(&inputs.user_role, &inputs.counter_party),
                prompts::negotiation_task(&inputs.user_role, &inputs.counter_party),
                &[verdict],
            );
        }

        builder.build(Uuid::new_v4().to_string(), settings)
    }

    /// Run identifier; also the artifact directory name.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Sidecar store for this run.
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AggressionProfile;
    use crate::prompts::{SHARK_KILLER_BACKSTORY, SHARK_PROFESSIONAL_BACKSTORY};

    fn settings() -> PipelineSettings {
        PipelineSettings {
            artifact_root: PathBuf::from("/tmp/war-room-tests"),
            stage_timeout: Duration::from_secs(5),
        }
    }

    fn inputs() -> NegotiationInputs {
        NegotiationInputs::new("The Tenant shall pay $500.", "Tenant", "Landlord")
    }

    #[test]
    fn test_builder_assigns_indices_in_order() {
        let mut builder = PipelineBuilder::new();
        assert!(builder.is_empty());
        let first = builder.add_stage(
            StageKind::Attack,
            RoleDescriptor::new("a", "b", "c"),
            "task",
            &[],
        );
        let second = builder.add_stage(
            StageKind::Defense,
            RoleDescriptor::new("a", "b", "c"),
            "task",
            &[first],
        );
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(builder.len(), 2);

        let pipeline = builder.build("run-x", &settings());
        assert_eq!(pipeline.run_id(), "run-x");
        assert_eq!(pipeline.stages()[1].upstream(), &[first]);
        assert_eq!(
            pipeline.artifacts().dir(),
            PathBuf::from("/tmp/war-room-tests/run-x").as_path()
        );
    }

    #[test]
    fn test_handles_from_another_builder_are_dropped() {
        let mut other = PipelineBuilder::new();
        other.add_stage(StageKind::Attack, RoleDescriptor::new("a", "b", "c"), "task", &[]);
        let foreign = other.add_stage(StageKind::Defense, RoleDescriptor::new("a", "b", "c"), "task", &[]);

        let mut builder = PipelineBuilder::new();
        let first = builder.add_stage(StageKind::Attack, RoleDescriptor::new("a", "b", "c"), "task", &[foreign]);
        let second = builder.add_stage(
            StageKind::Defense,
            RoleDescriptor::new("a", "b", "c"),
            "task",
            &[first, foreign],
        );

        let pipeline = builder.build("run-y", &settings());
        assert!(pipeline.stages()[0].upstream().is_empty());
        assert_eq!(pipeline.stages()[1].upstream(), &[first]);
        assert_eq!(second.index(), 1);
    }

    #[test]
    fn test_negotiation_graph_shape() {
        let pipeline = NegotiationPipeline::negotiation(&inputs(), &PersonaConfig::default(), &settings());
        let stages = pipeline.stages();
        let kinds: Vec<StageKind> = stages.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, StageKind::ALL.to_vec());

        let upstream: Vec<Vec<usize>> = stages
            .iter()
            .map(|s| s.upstream().iter().map(|id| id.index()).collect())
            .collect();
        assert_eq!(upstream, vec![vec![], vec![0], vec![0, 1], vec![2]]);

        for stage in stages {
            assert!(stage.upstream().iter().all(|id| id.index() < stage.index()));
            assert!(!stage.role().persona.is_empty());
            assert!(!stage.task().is_empty());
            assert_eq!(stage.artifact_name(), format!("{}.md", stage.name()));
        }
    }

    #[test]
    fn test_negotiation_graph_without_coaching() {
        let inputs = inputs().with_coaching(false);
        let pipeline = NegotiationPipeline::negotiation(&inputs, &PersonaConfig::default(), &settings());
        assert_eq!(pipeline.stages().len(), 3);
    }

    #[test]
    fn test_aggression_profile_selects_backstory() {
        let personas = PersonaConfig::default();

        let pipeline = NegotiationPipeline::negotiation(&inputs(), &personas, &settings());
        let expected = prompts::fill_roles(SHARK_PROFESSIONAL_BACKSTORY, "", "Landlord");
        assert_eq!(pipeline.stages()[0].role().backstory, expected);

        let killer = inputs().with_aggression(AggressionProfile::Killer);
        let pipeline = NegotiationPipeline::negotiation(&killer, &personas, &settings());
        let expected = prompts::fill_roles(SHARK_KILLER_BACKSTORY, "", "Landlord");
        assert_eq!(pipeline.stages()[0].role().backstory, expected);
    }

    #[test]
    fn test_each_pipeline_gets_its_own_run_id() {
        let a = NegotiationPipeline::negotiation(&inputs(), &PersonaConfig::default(), &settings());
        let b = NegotiationPipeline::negotiation(&inputs(), &PersonaConfig::default(), &settings());
        assert_ne!(a.run_id(), b.run_id());
        assert_ne!(a.artifacts().dir(), b.artifacts().dir());
    }
}
