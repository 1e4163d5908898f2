//! LLM client — the single point of entry for all model calls in the
//! pipeline.
//!
//! ARCHITECTURAL RULE: no other module may talk to the provider API
//! directly. Both external services (extraction, enrichment) go through
//! `LlmClient`, and both share the same `RetryPolicy` machinery so there is
//! exactly one definition of "retryable".
//!
//! The wire protocol is the OpenAI-compatible chat-completions API, which
//! covers OpenAI itself plus inference.net-style gateways behind a
//! configurable base URL.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod enrichment;
pub mod extraction;
pub mod prompts;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

impl LlmError {
    /// Transport failures, rate limits, server errors, and malformed
    /// payloads are all worth another attempt; schema violations retry
    /// exactly like timeouts and are only distinguished in logs.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Parse(_) => true,
            LlmError::EmptyContent => true,
            LlmError::Exhausted { .. } => false,
        }
    }
}

/// Bounded retry with exponential backoff, shared by both external call
/// sites. A value, not a global: concurrent runs may carry different
/// policies.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the given retry (1-based): base, 2x, 4x, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff * (1u32 << (attempt - 1).min(8))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Thin chat-completions client. Cloneable; the inner reqwest client is
/// already reference-counted.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            base_url,
            api_key,
        }
    }

    /// One round trip, no retries. Classification of the outcome is left to
    /// the caller's policy loop.
    async fn call_once(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "LLM call succeeded"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    /// Calls the model and deserializes its JSON answer, retrying the whole
    /// round trip (including the parse — a malformed response is treated
    /// like a timeout) under the given policy.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        model: &str,
        system: &str,
        user: &str,
        retry: &RetryPolicy,
    ) -> Result<T, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 1..=retry.max_attempts {
            if attempt > 1 {
                let delay = retry.backoff(attempt - 1);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    last_error = %last_error.as_ref().map(ToString::to_string).unwrap_or_default(),
                    "retrying LLM call"
                );
                tokio::time::sleep(delay).await;
            }

            let outcome = match self.call_once(model, system, user).await {
                Ok(text) => {
                    serde_json::from_str::<T>(strip_json_fences(&text)).map_err(LlmError::Parse)
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::Exhausted {
            attempts: retry.max_attempts,
        }))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// Belt and braces: JSON mode should make these impossible, but gateway
/// models occasionally wrap anyway.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
