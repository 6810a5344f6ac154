//! LLM Client: the single point of entry for all text-generation calls.
//!
//! ARCHITECTURAL RULE: No other module may call the chat completions API directly.
//! All generator interactions go through the `TextGenerator` trait defined here.
//!
//! Model: gpt-4.1-mini (hardcoded, not configurable)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// The model used for all generator calls.
pub const MODEL: &str = "gpt-4.1-mini";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status})")]
    Api { status: u16, message: String },

    #[error("completion payload has no choices[0].message.content string")]
    MissingContent { raw: String },

    #[error("completion payload is not valid JSON: {source}")]
    MalformedEnvelope {
        source: serde_json::Error,
        raw: String,
    },

    #[error("completion content does not match the expected shape: {source}")]
    InvalidContent {
        source: serde_json::Error,
        raw: String,
    },
}

impl LlmError {
    /// The raw upstream body, when the failure happened after one was received.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            LlmError::Api { message, .. } => Some(message),
            LlmError::MissingContent { raw }
            | LlmError::MalformedEnvelope { raw, .. }
            | LlmError::InvalidContent { raw, .. } => Some(raw),
            LlmError::Http(_) => None,
        }
    }
}

/// A text-generation backend. Takes one prompt, returns the raw wrapper payload
/// (a chat-completions envelope). Unwrapping is done by `extract_completion_content`.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completions client. One request per call: no retries, bounded by the
/// HTTP client timeout.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let start = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Generator API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!(
            model = MODEL,
            duration_ms = start.elapsed().as_millis() as u64,
            bytes = body.len(),
            "Generator call succeeded"
        );

        Ok(body)
    }
}

/// Pulls the assistant text out of a chat-completions envelope
/// (`choices[0].message.content`) and strips surrounding code fences.
///
/// Every failure carries the raw envelope so format drift fails loudly.
pub fn extract_completion_content(raw: &str) -> Result<String, LlmError> {
    let envelope: Value =
        serde_json::from_str(raw).map_err(|source| LlmError::MalformedEnvelope {
            source,
            raw: raw.to_string(),
        })?;

    let content = envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::MissingContent {
            raw: raw.to_string(),
        })?;

    Ok(strip_json_fences(content).to_string())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// The `json` tag is matched case-insensitively.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };
    let stripped = match stripped.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &stripped[4..],
        _ => stripped,
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped)
}
