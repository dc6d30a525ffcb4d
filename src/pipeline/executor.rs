//! Sequential stage execution.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::artifacts::ArtifactStore;
use super::builder::NegotiationPipeline;
use super::types::{PipelineStage, PipelineState, StageKind, StageResult};
use crate::error::GenerationError;
use crate::generation::Generator;

/// A pipeline whose stages have all been attempted.
#[derive(Debug)]
pub struct CompletedRun {
    pub(crate) run_id: String,
    pub(crate) stages: Vec<PipelineStage>,
    pub(crate) results: Vec<StageResult>,
    pub(crate) artifacts: ArtifactStore,
}

impl CompletedRun {
    /// Run identifier.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Result of the stage at `index`.
    pub fn result(&self, index: usize) -> Option<&StageResult> {
        self.results.get(index)
    }

    /// Index of the stage of `kind`, if it was built.
    pub fn stage_index(&self, kind: StageKind) -> Option<usize> {
        self.stages.iter().position(|s| s.kind == kind)
    }

    /// Sidecar store for this run.
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }
}

/// Text a finished stage contributes as context to later stages.
///
/// Failed stages contribute a placeholder so downstream stages still run.
pub fn context_text(stage: &PipelineStage, result: &StageResult) -> String {
    match result {
        Ok(generation) => match generation.text() {
            Some(text) => text.to_string(),
            None => format!("[{} stage produced no readable output]", stage.name()),
        },
        Err(e) => format!("[{} stage failed: {}]", stage.name(), e),
    }
}

impl NegotiationPipeline {
    /// Execute every stage in order.
    ///
    /// A failing stage records an `Err` and the run carries on; nothing here
    /// aborts the pipeline.
    pub async fn execute(self, generator: &dyn Generator) -> CompletedRun {
        let run_start = Instant::now();
        info!(
            run_id = %self.run_id,
            stages = self.stages.len(),
            state = %PipelineState::Running,
            "Pipeline running"
        );

        let mut results: Vec<StageResult> = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let context: Vec<String> = stage
                .upstream
                .iter()
                .filter_map(|id| {
                    let upstream = self.stages.get(id.index)?;
                    results.get(id.index).map(|r| context_text(upstream, r))
                })
                .collect();
            let result = self.execute_stage(stage, &context, generator).await;
            results.push(result);
        }

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            run_id = %self.run_id,
            failed_stages = failed,
            duration_ms = run_start.elapsed().as_millis(),
            state = %PipelineState::Completed,
            "Pipeline completed"
        );

        CompletedRun {
            run_id: self.run_id,
            stages: self.stages,
            results,
            artifacts: self.artifacts,
        }
    }

    async fn execute_stage(
        &self,
        stage: &PipelineStage,
        context: &[String],
        generator: &dyn Generator,
    ) -> StageResult {
        let start = Instant::now();
        info!(
            run_id = %self.run_id,
            stage = stage.name(),
            context_blocks = context.len(),
            "Executing stage"
        );

        let call = generator.generate(&stage.role, &stage.task, context);
        let result = match tokio::time::timeout(self.stage_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                timeout_ms: duration_ms(self.stage_timeout),
            }),
        };

        let latency = start.elapsed().as_millis();
        match &result {
            Ok(generation) => {
                if let Some(text) = generation.artifact_text() {
                    if let Err(e) = self.artifacts.write(&stage.artifact_name, &text) {
                        warn!(
                            run_id = %self.run_id,
                            stage = stage.name(),
                            error = %e,
                            "Failed to write stage artifact"
                        );
                    }
                }
                info!(
                    run_id = %self.run_id,
                    stage = stage.name(),
                    latency_ms = latency,
                    "Stage completed"
                );
            }
            Err(e) => {
                warn!(
                    run_id = %self.run_id,
                    stage = stage.name(),
                    error = %e,
                    latency_ms = latency,
                    "Stage failed, continuing with placeholder context"
                );
            }
        }

        result
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Generation, MockGenerator, RoleDescriptor, StructuredOutput};
    use crate::pipeline::{OutputStatus, PipelineBuilder, PipelineSettings, StageId, METADATA_LEAK};
    use tempfile::tempdir;

    fn settings(root: &std::path::Path) -> PipelineSettings {
        PipelineSettings {
            artifact_root: root.to_path_buf(),
            stage_timeout: Duration::from_secs(5),
        }
    }

    fn two_stage_pipeline(root: &std::path::Path) -> NegotiationPipeline {
        let mut builder = PipelineBuilder::new();
        let attack = builder.add_stage(
            StageKind::Attack,
            RoleDescriptor::new("shark", "goal", "story"),
            "attack task",
            &[],
        );
        builder.add_stage(
            StageKind::Defense,
            RoleDescriptor::new("shield", "goal", "story"),
            "defense task",
            &[attack],
        );
        builder.build("run-1", &settings(root))
    }

    #[tokio::test]
    async fn test_context_flows_to_downstream_stage() {
        let root = tempdir().unwrap();
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .withf(|role, _, context| role.persona == "shark" && context.is_empty())
            .times(1)
            .returning(|_, _, _| Ok(Generation::RawText("Red Report".to_string())));
        generator
            .expect_generate()
            .withf(|role, _, context| role.persona == "shield" && context == ["Red Report".to_string()])
            .times(1)
            .returning(|_, _, _| Ok(Generation::RawText("Blue Report".to_string())));

        let run = two_stage_pipeline(root.path()).execute(&generator).await;

        assert_eq!(run.results.len(), 2);
        assert!(run.results.iter().all(|r| r.is_ok()));
        assert_eq!(
            run.artifacts().read("defense.md").unwrap().as_deref(),
            Some("Blue Report")
        );
    }

    #[tokio::test]
    async fn test_failed_stage_passes_placeholder_forward() {
        let root = tempdir().unwrap();
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .withf(|role, _, _| role.persona == "shark")
            .times(1)
            .returning(|_, _, _| {
                Err(GenerationError::Collaborator {
                    message: "rate limited".to_string(),
                })
            });
        generator
            .expect_generate()
            .withf(|role, _, context| {
                role.persona == "shield"
                    && context.len() == 1
                    && context[0] == "[attack stage failed: generation failed: rate limited]"
            })
            .times(1)
            .returning(|_, _, _| Ok(Generation::RawText("Blue Report".to_string())));

        let run = two_stage_pipeline(root.path()).execute(&generator).await;

        assert!(run.result(0).unwrap().is_err());
        assert!(run.result(1).unwrap().is_ok());
        assert_eq!(run.artifacts().read("attack.md").unwrap(), None);
    }

    #[tokio::test]
    async fn test_artifact_write_failure_is_swallowed() {
        let root = tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, "file, not dir").unwrap();

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _, _| Ok(Generation::RawText("text".to_string())));

        let run = two_stage_pipeline(&blocker).execute(&generator).await;
        assert!(run.results.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_structured_result_without_raw_is_persisted_and_flagged() {
        let root = tempdir().unwrap();
        let mut generator = MockGenerator::new();
        generator.expect_generate().returning(|_, _, _| {
            Ok(Generation::Structured(StructuredOutput {
                description: Some("Find weaknesses".to_string()),
                ..Default::default()
            }))
        });

        let run = two_stage_pipeline(root.path()).execute(&generator).await;

        assert_eq!(
            run.artifacts().read("attack.md").unwrap().as_deref(),
            Some("description=Find weaknesses")
        );
        let resolved = run.resolve_output(0);
        assert_eq!(resolved.status, OutputStatus::MetadataLeak);
        assert_eq!(resolved.text, METADATA_LEAK);
    }

    #[tokio::test]
    async fn test_foreign_handle_never_reaches_execution() {
        let root = tempdir().unwrap();
        let mut other = PipelineBuilder::new();
        other.add_stage(StageKind::Attack, RoleDescriptor::new("x", "g", "b"), "t", &[]);
        let foreign = other.add_stage(StageKind::Defense, RoleDescriptor::new("x", "g", "b"), "t", &[]);

        let mut builder = PipelineBuilder::new();
        builder.add_stage(
            StageKind::Attack,
            RoleDescriptor::new("shark", "goal", "story"),
            "attack task",
            &[foreign],
        );
        let pipeline = builder.build("run-2", &settings(root.path()));

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .withf(|_, _, context| context.is_empty())
            .times(1)
            .returning(|_, _, _| Ok(Generation::RawText("Red Report".to_string())));

        let run = pipeline.execute(&generator).await;
        assert!(run.result(0).unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_out_of_range_upstream_is_skipped() {
        let root = tempdir().unwrap();
        let mut pipeline = two_stage_pipeline(root.path());
        let bogus = StageId {
            builder: u64::MAX,
            index: 7,
        };
        pipeline.stages[1].upstream.push(bogus);

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .withf(|role, _, context| role.persona == "shark" && context.is_empty())
            .times(1)
            .returning(|_, _, _| Ok(Generation::RawText("Red Report".to_string())));
        generator
            .expect_generate()
            .withf(|role, _, context| role.persona == "shield" && context == ["Red Report".to_string()])
            .times(1)
            .returning(|_, _, _| Ok(Generation::RawText("Blue Report".to_string())));

        let run = pipeline.execute(&generator).await;
        assert!(run.results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_context_text_variants() {
        let stage = PipelineStage {
            index: 0,
            kind: StageKind::Verdict,
            role: RoleDescriptor::new("m", "g", "b"),
            task: "t".to_string(),
            upstream: vec![],
            artifact_name: "verdict.md".to_string(),
        };
        assert_eq!(
            context_text(&stage, &Ok(Generation::RawText("ok".to_string()))),
            "ok"
        );
        assert_eq!(
            context_text(&stage, &Ok(Generation::RawText(" ".to_string()))),
            "[verdict stage produced no readable output]"
        );
        assert_eq!(
            context_text(&stage, &Err(GenerationError::EmptyResponse)),
            "[verdict stage failed: generation returned an empty response]"
        );
    }
}
