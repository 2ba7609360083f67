//! GenAI-based LLM client implementation
//!
//! This module provides an LLM client implementation using the `genai` crate,
//! supporting multiple providers (OpenAI, Anthropic, Gemini, Ollama, ...).
//!
//! The credential is handed to the client explicitly and installed through a
//! service-target resolver, so no process-wide key has to be set before a call.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
use crate::config::ApiKey;
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// GenAI-based LLM client supporting multiple providers
pub struct GenAIClient {
    /// GenAI client instance
    client: Client,
    /// Model name
    model: String,
    /// Provider type
    provider: AdapterKind,
    /// Request timeout
    timeout: Duration,
}

impl GenAIClient {
    /// Creates a new GenAI client
    ///
    /// # Arguments
    ///
    /// * `provider` - LLM provider to use
    /// * `model` - Model name (without provider prefix)
    /// * `api_key` - Credential for the provider; `None` keeps genai's default lookup
    /// * `base_url` - Optional endpoint override (proxies, compatible gateways)
    /// * `timeout` - Request timeout
    pub fn new(
        provider: AdapterKind,
        model: String,
        api_key: Option<ApiKey>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        if model.trim().is_empty() {
            return Err(BackendError::ConfigurationError {
                message: "model name must not be empty".to_string(),
            });
        }

        if let Some(ref url) = base_url {
            debug!("Using custom endpoint for {}: {}", provider.as_str(), url);
        }

        let model_clone = model.clone();
        let resolver = ServiceTargetResolver::from_resolver_fn(
            move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let ServiceTarget { endpoint, auth, .. } = service_target;

                let endpoint = match base_url {
                    Some(ref url) => Endpoint::from_owned(url.clone()),
                    None => endpoint,
                };

                let auth = match api_key {
                    Some(ref key) => AuthData::from_single(key.expose().to_string()),
                    None => auth,
                };

                Ok(ServiceTarget {
                    endpoint,
                    auth,
                    model: ModelIden::new(provider, &model_clone),
                })
            },
        );

        let client = Client::builder()
            .with_service_target_resolver(resolver)
            .build();

        debug!(
            "Creating GenAI client: provider={}, model={}",
            provider.as_str(),
            model,
        );

        Ok(Self {
            client,
            model,
            provider,
            timeout,
        })
    }

    /// Converts our ChatMessage to genai ChatMessage
    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(msg.content.as_str()),
            MessageRole::User => GenAIChatMessage::user(msg.content.as_str()),
            MessageRole::Assistant => GenAIChatMessage::assistant(msg.content.as_str()),
        }
    }

    fn map_api_error(&self, err: genai::Error) -> BackendError {
        let message = err.to_string();
        error!("{} API error: {}", self.provider.as_str(), message);

        let status_code = response_status(&err);
        let rejected_credential = matches!(status_code, Some(401) | Some(403))
            || matches!(
                err,
                genai::Error::RequiresApiKey { .. }
                    | genai::Error::NoAuthResolver { .. }
                    | genai::Error::NoAuthData { .. }
            );

        if rejected_credential {
            BackendError::AuthenticationError {
                message: format!("{} rejected the credential: {}", self.provider.as_str(), message),
            }
        } else {
            BackendError::ApiError {
                message: format!("{} request failed: {}", self.provider.as_str(), message),
                status_code,
            }
        }
    }
}

/// HTTP status of a failed provider call, if the call got that far
fn response_status(err: &genai::Error) -> Option<u16> {
    match err {
        genai::Error::WebModelCall { webc_error, .. }
        | genai::Error::WebAdapterCall { webc_error, .. } => match webc_error {
            genai::webc::Error::ResponseFailedStatus { status, .. } => Some(status.as_u16()),
            genai::webc::Error::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        },
        _ => None,
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let genai_request = GenAIChatRequest::new(messages);

        let mut options = ChatOptions::default();
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        debug!(
            "Sending request to {}: messages={}",
            self.provider.as_str(),
            request.messages.len()
        );

        let response = match tokio::time::timeout(
            self.timeout,
            self.client
                .exec_chat(&self.model, genai_request, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => return Err(self.map_api_error(e)),
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.provider.as_str(),
                    self.timeout.as_secs()
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response
            .first_text()
            .ok_or_else(|| {
                error!("No text content in {} response", self.provider.as_str());
                BackendError::InvalidResponse {
                    message: "No text content in response".to_string(),
                    raw_response: None,
                }
            })?
            .to_string();

        debug!(
            "{} response length: {} characters",
            self.provider.as_str(),
            content.len()
        );

        Ok(LLMResponse::text(content, start.elapsed()))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
