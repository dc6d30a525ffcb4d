//! The text-generation collaborator.
//!
//! Every stage talks to the model through the [`Generator`] trait. What comes
//! back is classified once, at the adapter boundary, into a [`Generation`]:
//! either plain text or a structured result whose fields may or may not carry
//! readable content. Callers never inspect response shapes ad hoc.

mod langbase;

pub use self::langbase::LangbaseGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationResult;

/// Who the model is asked to be for one call. Used only to steer generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
    /// Short persona label, e.g. "The Shark (Advocate for Landlord)".
    pub persona: String,
    /// One-sentence goal.
    pub goal: String,
    /// Backstory paragraph.
    pub backstory: String,
}

impl RoleDescriptor {
    /// Create a new role descriptor.
    pub fn new(
        persona: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            persona: persona.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Render the descriptor as a system prompt.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}.\n\nYour goal: {}\n\n{}",
            self.persona, self.goal, self.backstory
        )
    }
}

/// Fields of a structured generation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredOutput {
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// What a generation call returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Free-form text.
    RawText(String),
    /// A structured result object.
    Structured(StructuredOutput),
}

impl Generation {
    /// Readable content, if the result carries any.
    ///
    /// Structured results only count when their `raw` field is non-blank; the
    /// other fields describe the task, not its output.
    pub fn text(&self) -> Option<&str> {
        let text = match self {
            Generation::RawText(text) => Some(text.as_str()),
            Generation::Structured(output) => output.raw.as_deref(),
        };
        text.filter(|t| !t.trim().is_empty())
    }

    /// What to persist as the stage's sidecar artifact.
    ///
    /// Readable content when there is some; otherwise the structured fields
    /// rendered as `key=value` lines, so a later read can tell task metadata
    /// from a report.
    pub fn artifact_text(&self) -> Option<String> {
        if let Some(text) = self.text() {
            return Some(text.to_string());
        }
        match self {
            Generation::RawText(_) => None,
            Generation::Structured(output) => output.render_fields(),
        }
    }
}

impl StructuredOutput {
    fn render_fields(&self) -> Option<String> {
        let fields = [
            ("raw", &self.raw),
            ("description", &self.description),
            ("expected_output", &self.expected_output),
            ("summary", &self.summary),
        ];
        let lines: Vec<String> = fields
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| format!("{}={}", key, v))
            })
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Join a task description with the outputs of earlier stages.
///
/// Context blocks are appended in order after the task so the model sees the
/// task first.
pub fn compose_task(task: &str, context: &[String]) -> String {
    if context.is_empty() {
        return task.to_string();
    }

    let mut composed = String::with_capacity(
        task.len() + context.iter().map(|c| c.len() + 32).sum::<usize>(),
    );
    composed.push_str(task);
    composed.push_str("\n\n=== Context from earlier stages ===");
    for (idx, block) in context.iter().enumerate() {
        composed.push_str(&format!("\n\n--- Context {} ---\n", idx + 1));
        composed.push_str(block);
    }
    composed
}

/// A fallible text-generation service.
///
/// One call per stage; implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for `task` in the voice of `role`, seeing `context`.
    async fn generate(
        &self,
        role: &RoleDescriptor,
        task: &str,
        context: &[String],
    ) -> GenerationResult<Generation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_exposes_text() {
        let gen = Generation::RawText("Red Report".to_string());
        assert_eq!(gen.text(), Some("Red Report"));
    }

    #[test]
    fn test_blank_raw_text_has_no_text() {
        let gen = Generation::RawText("   \n".to_string());
        assert_eq!(gen.text(), None);
    }

    #[test]
    fn test_structured_uses_raw_field_only() {
        let gen = Generation::Structured(StructuredOutput {
            raw: None,
            description: Some("Analyze the contract".to_string()),
            ..Default::default()
        });
        assert_eq!(gen.text(), None);

        let gen = Generation::Structured(StructuredOutput {
            raw: Some("Blue Report".to_string()),
            description: Some("Analyze the contract".to_string()),
            ..Default::default()
        });
        assert_eq!(gen.text(), Some("Blue Report"));
    }

    #[test]
    fn test_artifact_text_prefers_readable_content() {
        let gen = Generation::RawText("Red Report".to_string());
        assert_eq!(gen.artifact_text().as_deref(), Some("Red Report"));
        assert_eq!(Generation::RawText(" ".to_string()).artifact_text(), None);
    }

    #[test]
    fn test_artifact_text_renders_structured_fields() {
        let gen = Generation::Structured(StructuredOutput {
            description: Some("Analyze the contract".to_string()),
            summary: Some("Analyze...".to_string()),
            ..Default::default()
        });
        assert_eq!(
            gen.artifact_text().as_deref(),
            Some("description=Analyze the contract\nsummary=Analyze...")
        );
        assert_eq!(
            Generation::Structured(StructuredOutput::default()).artifact_text(),
            None
        );
    }

    #[test]
    fn test_compose_task_without_context() {
        assert_eq!(compose_task("Review it", &[]), "Review it");
    }

    #[test]
    fn test_compose_task_appends_context_in_order() {
        let composed = compose_task(
            "Review it",
            &["first output".to_string(), "second output".to_string()],
        );
        assert!(composed.starts_with("Review it"));
        let first = composed.find("first output").unwrap();
        let second = composed.find("second output").unwrap();
        assert!(first < second);
        assert!(composed.contains("--- Context 2 ---"));
    }

    #[test]
    fn test_system_prompt_contains_all_parts() {
        let role = RoleDescriptor::new("The Mediator", "Be fair", "You weigh both sides.");
        let prompt = role.system_prompt();
        assert!(prompt.contains("The Mediator"));
        assert!(prompt.contains("Be fair"));
        assert!(prompt.contains("You weigh both sides."));
    }
}
