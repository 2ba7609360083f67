use super::prompt::PromptSet;
use crate::llm::{BackendError, ChatMessage, Conversation, LLMClient, LLMRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// First model exchange: asks for a structured analysis of the extracted code
pub struct CodeAnalyzer {
    client: Arc<dyn LLMClient>,
    prompts: PromptSet,
    max_tokens: Option<u32>,
}

impl CodeAnalyzer {
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

    /// Sends the file index and code blob to the model
    ///
    /// Returns the system message, the user request and the assistant's reply,
    /// in that order. Errors from the client are returned as-is.
    pub async fn analyze(
        &self,
        file_index: &[String],
        code: &str,
    ) -> Result<Conversation, BackendError> {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::system(self.prompts.system.as_str()));
        conversation.push(ChatMessage::user(
            self.prompts.render_analysis(file_index, code),
        ));

        debug!(
            files = file_index.len(),
            code_bytes = code.len(),
            client = self.client.name(),
            "Requesting code analysis"
        );

        let request: LLMRequest = conversation
            .to_request()
            .with_optional_max_tokens(self.max_tokens);
        let response = self.client.chat(request).await?;

        info!(
            response_chars = response.content.len(),
            response_time_ms = response.response_time.as_millis(),
            "Analysis received"
        );

        conversation.push(ChatMessage::assistant(response.content));
        Ok(conversation)
    }
}

impl std::fmt::Debug for CodeAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeAnalyzer")
            .field("client", &self.client.name())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MessageRole, MockLLMClient, MockResponse};

    #[tokio::test]
    async fn test_analyze_returns_three_messages() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("{'structure': 'flat'}"));

        let analyzer = CodeAnalyzer::new(client.clone(), PromptSet::default());
        let index = vec!["a.py".to_string()];
        let conversation = analyzer
            .analyze(&index, "---- File: a.py ----\nprint(1)\n")
            .await
            .unwrap();

        assert_eq!(conversation.len(), 3);
        let roles: Vec<MessageRole> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(conversation.messages()[2].content, "{'structure': 'flat'}");
    }

    #[tokio::test]
    async fn test_analyze_sends_system_and_user_only() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("ok"));

        let prompts = PromptSet {
            system: "SYS".to_string(),
            ..PromptSet::default()
        };
        let analyzer = CodeAnalyzer::new(client.clone(), prompts).with_max_tokens(Some(256));
        analyzer
            .analyze(&["x.py".to_string()], "CODE-BLOB")
            .await
            .unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.messages.len(), 2);
        assert_eq!(sent.messages[0].content, "SYS");
        assert!(sent.messages[1].content.contains("CODE-BLOB"));
        assert!(sent.messages[1].content.contains("x.py"));
        assert_eq!(sent.max_tokens, Some(256));
    }

    #[tokio::test]
    async fn test_analyze_propagates_backend_error() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::error(BackendError::ApiError {
            message: "rate limited".to_string(),
            status_code: Some(429),
        }));

        let analyzer = CodeAnalyzer::new(client, PromptSet::default());
        let err = analyzer.analyze(&[], "").await.unwrap_err();

        assert!(matches!(
            err,
            BackendError::ApiError {
                status_code: Some(429),
                ..
            }
        ));
    }
}
