//! Groq HTTP backend.
//!
//! Drives Groq's OpenAI-compatible chat-completions endpoint. Some models
//! served there (notably the gpt-oss family) occasionally return an empty
//! `content` field with the actual answer in a non-standard `reasoning`
//! field; that field is used as the fallback content source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::http_client::HttpClient;
use crate::types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};
use ponder_config::Settings;
use ponder_utils::error::LlmError;

/// Default Groq chat-completions endpoint
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Clone)]
pub(crate) struct GroqBackend {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: String,
}

/// Per-invocation sampling parameters
#[derive(Debug, Clone, PartialEq)]
struct SamplingParams {
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 4096,
            top_p: 0.9,
        }
    }
}

impl GroqBackend {
    /// Create a backend with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be
    /// constructed.
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, LlmError> {
        let client = HttpClient::new()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
        })
    }

    /// Create a backend from runtime settings, reading the API key from the
    /// configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the API key variable is not
    /// set or the HTTP client cannot be constructed.
    pub fn new_from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
            LlmError::Misconfiguration(format!(
                "Groq API key not found in environment variable '{}'. \
                 Set this variable before running.",
                settings.api_key_env
            ))
        })?;

        Self::new(api_key, settings.base_url.clone())
    }

    /// Resolve sampling parameters from invocation metadata, falling back to
    /// the defaults for anything unspecified.
    fn resolve_params(inv: &LlmInvocation) -> SamplingParams {
        let defaults = SamplingParams::default();

        SamplingParams {
            temperature: inv
                .metadata
                .get("temperature")
                .and_then(|v| v.as_f64())
                .map(|v| v as f32)
                .unwrap_or(defaults.temperature),
            max_tokens: inv
                .metadata
                .get("max_tokens")
                .and_then(|v| v.as_u64())
                .map(|v| v as u32)
                .unwrap_or(defaults.max_tokens),
            top_p: inv
                .metadata
                .get("top_p")
                .and_then(|v| v.as_f64())
                .map(|v| v as f32)
                .unwrap_or(defaults.top_p),
        }
    }

    /// Convert messages to the OpenAI-compatible wire format.
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|msg| WireMessage {
                role: match msg.role {
                    Role::System => "system".to_string(),
                    Role::User => "user".to_string(),
                    Role::Assistant => "assistant".to_string(),
                },
                content: msg.content.clone(),
            })
            .collect()
    }

    /// Pull the response text out of the top choice, falling back to the
    /// `reasoning` field when `content` is absent or empty.
    fn extract_text(choice: &Choice) -> Option<String> {
        match choice.message.content.as_deref() {
            Some(content) if !content.is_empty() => Some(content.to_string()),
            _ => choice
                .message
                .reasoning
                .as_deref()
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        }
    }
}

#[async_trait]
impl LlmBackend for GroqBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let params = Self::resolve_params(&inv);

        debug!(
            provider = "groq",
            phase = %inv.phase_id,
            model = %inv.model,
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            top_p = params.top_p,
            timeout_secs = inv.timeout.as_secs(),
            "Invoking Groq backend"
        );

        let request_body = ChatRequest {
            model: inv.model.clone(),
            messages: Self::convert_messages(&inv.messages),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            stream: false,
        };

        let request = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body);

        let response = self
            .client
            .execute_with_retry(request, inv.timeout, "groq")
            .await?;

        let response_body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to parse Groq response: {e}")))?;

        let choice = response_body
            .choices
            .first()
            .ok_or_else(|| LlmError::Transport("Groq response missing choices[0]".to_string()))?;

        let content = Self::extract_text(choice).ok_or_else(|| {
            LlmError::Transport("Groq response contained no text content".to_string())
        })?;

        let mut result = LlmResult::new(content, "groq", inv.model);

        if let Some(usage) = response_body.usage {
            result.tokens_input = Some(usage.prompt_tokens);
            result.tokens_output = Some(usage.completion_tokens);
        }

        debug!(
            provider = "groq",
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Groq invocation completed"
        );

        Ok(result)
    }
}

/// OpenAI-compatible message for requests
#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

/// Chat-completions request body
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

/// Chat-completions response body
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Response message; `reasoning` is the non-standard Groq field
#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    reasoning: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn invocation() -> LlmInvocation {
        LlmInvocation::new(
            "A",
            "openai/gpt-oss-120b",
            Duration::from_secs(60),
            vec![Message::user("hello")],
        )
    }

    #[test]
    fn resolve_params_uses_defaults_without_metadata() {
        let params = GroqBackend::resolve_params(&invocation());
        assert_eq!(params, SamplingParams::default());
    }

    #[test]
    fn resolve_params_applies_metadata_overrides() {
        let inv = invocation()
            .with_metadata("temperature", serde_json::json!(0.3))
            .with_metadata("max_tokens", serde_json::json!(512))
            .with_metadata("top_p", serde_json::json!(0.5));

        let params = GroqBackend::resolve_params(&inv);
        assert_eq!(params.temperature, 0.3);
        assert_eq!(params.max_tokens, 512);
        assert_eq!(params.top_p, 0.5);
    }

    #[test]
    fn convert_messages_maps_roles() {
        let wire = GroqBackend::convert_messages(&[
            Message::system("sys"),
            Message::user("usr"),
        ]);
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[1].content, "usr");
    }

    #[test]
    fn extract_text_prefers_content() {
        let choice = Choice {
            message: ResponseMessage {
                content: Some("answer".to_string()),
                reasoning: Some("chain of thought".to_string()),
            },
        };
        assert_eq!(GroqBackend::extract_text(&choice).as_deref(), Some("answer"));
    }

    #[test]
    fn extract_text_falls_back_to_reasoning_when_content_empty() {
        let choice = Choice {
            message: ResponseMessage {
                content: Some(String::new()),
                reasoning: Some("recovered answer".to_string()),
            },
        };
        assert_eq!(
            GroqBackend::extract_text(&choice).as_deref(),
            Some("recovered answer")
        );

        let choice = Choice {
            message: ResponseMessage {
                content: None,
                reasoning: Some("recovered answer".to_string()),
            },
        };
        assert_eq!(
            GroqBackend::extract_text(&choice).as_deref(),
            Some("recovered answer")
        );
    }

    #[test]
    fn extract_text_empty_when_both_fields_missing() {
        let choice = Choice {
            message: ResponseMessage {
                content: None,
                reasoning: None,
            },
        };
        assert!(GroqBackend::extract_text(&choice).is_none());
    }

    #[test]
    fn response_body_deserializes_reasoning_field() {
        let body: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"content": "", "reasoning": "r"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 20}
            }"#,
        )
        .unwrap();
        assert_eq!(body.choices[0].message.reasoning.as_deref(), Some("r"));
        assert_eq!(body.usage.unwrap().completion_tokens, 20);
    }
}
