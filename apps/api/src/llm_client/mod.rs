//! LLM Client — the single point of entry for all model calls in the service.
//!
//! No other module talks to the model provider directly. Handlers depend on
//! the `CompletionProvider` trait; `LlmClient` is the production
//! implementation over an OpenAI-compatible chat-completions endpoint.
//!
//! Calls are not retried; a failed call is surfaced to the HTTP caller as-is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmConfig;

pub mod prompts;

/// Finish reason reported when generation stopped at the token cap.
pub const FINISH_REASON_LENGTH: &str = "length";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response body: {0}")]
    Parse(String),

    #[error("Response contained no choices")]
    NoChoices,
}

/// Text and finish signal of a single completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn was_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some(FINISH_REASON_LENGTH)
    }
}

/// Anything that can turn a system/user message pair into a completion.
///
/// Carried in `AppState` as `Arc<dyn CompletionProvider>`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Some gateways send only part of this object.
#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Production `CompletionProvider` over a chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> Result<String, LlmError> {
        let base = self
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| LlmError::ConfigurationMissing("LLM_API_BASE_URL".to_string()))?;
        Ok(chat_completions_url(base))
    }

    /// Name and value of the one credential header sent upstream.
    fn auth_header(&self) -> Result<(String, String), LlmError> {
        let key = self
            .config
            .effective_key()
            .ok_or_else(|| LlmError::ConfigurationMissing("LLM_API_KEY".to_string()))?;
        Ok(auth_header_pair(&self.config.auth_header, key))
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion, LlmError> {
        let url = self.endpoint()?;
        let (header_name, header_value) = self.auth_header()?;
        let header_name = reqwest::header::HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| LlmError::InvalidConfiguration(format!("LLM_AUTH_HEADER: {e}")))?;

        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut request = self
            .client
            .post(&url)
            .header(header_name, header_value)
            .json(&request_body);
        if let Some(version) = &self.config.api_version {
            request = request.query(&[("api-version", version.as_str())]);
        }

        debug!("Calling model {} at {}", self.config.model, url);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    secs: self.config.timeout_secs,
                }
            } else {
                LlmError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Model API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    secs: self.config.timeout_secs,
                }
            } else {
                LlmError::Http(e)
            }
        })?;
        let chat = parse_chat_response(&body)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Model call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion_from_response(chat)
    }
}

fn parse_chat_response(body: &str) -> Result<ChatResponse, LlmError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        warn!("Unparseable model API response: {e}; body starts with {preview:?}");
        LlmError::Parse(e.to_string())
    })
}

fn completion_from_response(chat: ChatResponse) -> Result<Completion, LlmError> {
    let choice = chat.choices.into_iter().next().ok_or(LlmError::NoChoices)?;
    Ok(Completion {
        content: choice
            .message
            .and_then(|m| m.content)
            .unwrap_or_default(),
        finish_reason: choice.finish_reason,
    })
}

fn chat_completions_url(base: &str) -> String {
    format!("{}/chat/completions", base.trim_end_matches('/'))
}

/// `Authorization` gets the bearer scheme; any other header carries the raw key.
fn auth_header_pair(name: &str, key: &str) -> (String, String) {
    if name.eq_ignore_ascii_case("authorization") {
        ("authorization".to_string(), format!("Bearer {key}"))
    } else {
        (name.to_ascii_lowercase(), key.to_string())
    }
}
