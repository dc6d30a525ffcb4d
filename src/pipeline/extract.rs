//! Output extraction with fallback.
//!
//! A stage's final text comes from the first tier that yields something:
//! the in-memory result, then the sidecar artifact, then a sentinel. The
//! chosen text is sanitized before it is returned.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::executor::CompletedRun;
use super::types::{OutputStatus, ResolvedOutput, RunOutputs, StageKind};

/// Substring marking text that is serialized task metadata, not a report.
const METADATA_MARKER: &str = "description=";

/// Literal noise some collaborators emit for absent fields.
const UNDEFINED_TOKEN: &str = "undefined";

/// Apply the leak check and cleanup to a candidate text found by `status`.
fn sanitize(text: &str, status: OutputStatus) -> ResolvedOutput {
    if text.contains(METADATA_MARKER) {
        return ResolvedOutput::metadata_leak();
    }
    let cleaned = text.replace(UNDEFINED_TOKEN, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return ResolvedOutput::missing();
    }
    ResolvedOutput {
        text: cleaned.to_string(),
        status,
    }
}

/// Resolve one output from its two candidate sources.
pub(crate) fn resolve(primary: Option<&str>, sidecar: Option<&str>) -> ResolvedOutput {
    let candidates = [
        (primary, OutputStatus::Generated),
        (sidecar, OutputStatus::RecoveredFromSidecar),
    ];
    candidates
        .into_iter()
        .find_map(|(candidate, status)| {
            candidate
                .filter(|t| !t.trim().is_empty())
                .map(|text| sanitize(text, status))
        })
        .unwrap_or_else(ResolvedOutput::missing)
}

impl CompletedRun {
    /// Final text of the stage at `index`, walking the fallback chain.
    pub fn resolve_output(&self, index: usize) -> ResolvedOutput {
        let Some(stage) = self.stages.get(index) else {
            return ResolvedOutput::missing();
        };

        let primary = match self.results.get(index) {
            Some(Ok(generation)) => generation.text(),
            _ => None,
        };

        let sidecar = if primary.is_none() {
            match self.artifacts.read(stage.artifact_name()) {
                Ok(content) => content,
                Err(e) => {
                    warn!(stage = stage.name(), error = %e, "Failed to read stage artifact");
                    None
                }
            }
        } else {
            None
        };

        let resolved = resolve(primary, sidecar.as_deref());
        debug!(stage = stage.name(), status = ?resolved.status, "Stage output resolved");
        resolved
    }

    /// Resolved outputs for every stage kind.
    ///
    /// Kinds absent from the run resolve to the skipped sentinel, so the
    /// mapping always carries all four keys.
    pub fn outputs(&self) -> RunOutputs {
        let outputs: BTreeMap<String, ResolvedOutput> = StageKind::ALL
            .iter()
            .map(|kind| {
                let resolved = match self.stage_index(*kind) {
                    Some(index) => self.resolve_output(index),
                    None => ResolvedOutput::skipped(),
                };
                (kind.result_key().to_string(), resolved)
            })
            .collect();

        RunOutputs {
            run_id: self.run_id.clone(),
            outputs,
        }
    }
}
