use async_trait::async_trait;
use tracing::debug;

use super::{compose_task, Generation, Generator, RoleDescriptor, StructuredOutput};
use crate::error::{GenerationError, GenerationResult};
use crate::langbase::{LangbaseClient, Message, PipeRequest};

/// [`Generator`] backed by a Langbase pipe.
#[derive(Clone)]
pub struct LangbaseGenerator {
    client: LangbaseClient,
    pipe_name: String,
}

impl LangbaseGenerator {
    /// Create a generator that runs every call through `pipe_name`.
    pub fn new(client: LangbaseClient, pipe_name: impl Into<String>) -> Self {
        Self {
            client,
            pipe_name: pipe_name.into(),
        }
    }

    /// Name of the pipe this generator calls.
    pub fn pipe_name(&self) -> &str {
        &self.pipe_name
    }

    fn build_messages(role: &RoleDescriptor, task: &str, context: &[String]) -> Vec<Message> {
        vec![
            Message::system(role.system_prompt()),
            Message::user(compose_task(task, context)),
        ]
    }
}

/// Classify a completion string into a [`Generation`].
///
/// JSON objects carrying `raw` or `description` keys are structured results;
/// anything else is plain text.
pub(crate) fn classify_completion(completion: &str) -> GenerationResult<Generation> {
    let trimmed = completion.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            let is_structured = value
                .as_object()
                .map(|obj| obj.contains_key("raw") || obj.contains_key("description"))
                .unwrap_or(false);
            if is_structured {
                if let Ok(output) = serde_json::from_value::<StructuredOutput>(value) {
                    return Ok(Generation::Structured(output));
                }
            }
        }
    }

    Ok(Generation::RawText(completion.to_string()))
}

#[async_trait]
impl Generator for LangbaseGenerator {
    async fn generate(
        &self,
        role: &RoleDescriptor,
        task: &str,
        context: &[String],
    ) -> GenerationResult<Generation> {
        let messages = Self::build_messages(role, task, context);
        let request = PipeRequest::new(&self.pipe_name, messages);

        let response = self.client.call_pipe(request).await?;
        if !response.success {
            debug!(pipe = %self.pipe_name, "Langbase reported an unsuccessful run");
            return Err(GenerationError::EmptyResponse);
        }

        classify_completion(&response.completion)
    }
}
