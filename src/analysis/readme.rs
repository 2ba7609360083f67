use super::prompt::PromptSet;
use crate::llm::{BackendError, ChatMessage, Conversation, LLMClient};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Second model exchange: turns the analysis into a README document
pub struct ReadmeGenerator {
    client: Arc<dyn LLMClient>,
    prompts: PromptSet,
    max_tokens: Option<u32>,
}

impl ReadmeGenerator {
    pub fn new(client: Arc<dyn LLMClient>, prompts: PromptSet) -> Self {
        Self {
            client,
            prompts,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Appends the README request to `conversation`, sends the whole history
    /// and returns the generated document.
    ///
    /// On success the reply is appended as well. On failure the conversation
    /// keeps the request that was sent.
    pub async fn generate(&self, conversation: &mut Conversation) -> Result<String, BackendError> {
        conversation.push(ChatMessage::user(self.prompts.readme.as_str()));

        debug!(
            messages = conversation.len(),
            client = self.client.name(),
            "Requesting README"
        );

        let request = conversation
            .to_request()
            .with_optional_max_tokens(self.max_tokens);
        let response = self.client.chat(request).await?;

        if response.content.trim().is_empty() {
            warn!("Model returned a blank README");
        }

        info!(
            readme_chars = response.content.len(),
            response_time_ms = response.response_time.as_millis(),
            "README generated"
        );

        conversation.push(ChatMessage::assistant(response.content.as_str()));
        Ok(response.content)
    }
}

impl std::fmt::Debug for ReadmeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadmeGenerator")
            .field("client", &self.client.name())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
