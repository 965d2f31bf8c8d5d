//! Assistant: streamed chat against the study-assistant backend function.
//!
//! DESIGN
//! ======
//! The backend function proxies an OpenAI-compatible model and answers with a
//! server-sent-events body. `AssistantClient` posts the conversation, maps
//! refusal statuses to typed errors, then hands the body to [`drive_stream`],
//! which owns one `StreamDecoder` per request.
//!
//! TRADE-OFFS
//! ==========
//! - No automatic retries. `AssistantError::retryable()` tells the caller
//!   whether a retry makes sense.
//! - The request timeout covers the whole streamed body, so very long answers
//!   need a larger `STUDYDASH_REQUEST_TIMEOUT_SECS`.

pub mod config;
pub mod conversation;
pub mod stream;
pub mod types;

use std::time::Duration;

use chatstream::{DecoderLimits, StreamDecoder};
use serde_json::Value;

use config::AssistantConfig;
pub use conversation::{ChatSession, Conversation};
use stream::drive_stream;
pub use types::{AssistantChat, AssistantError, ChatMessage, ChatOutcome, ChatRequest, StudyMode, Termination};

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the study-assistant function.
pub struct AssistantClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    limits: DecoderLimits,
}

impl AssistantClient {
    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the HTTP client fails.
    pub fn from_env() -> Result<Self, AssistantError> {
        Self::new(AssistantConfig::from_env()?)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| AssistantError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: config.endpoint, access_token: config.access_token, limits: config.limits })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl AssistantChat for AssistantClient {
    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        mode: StudyMode,
        on_snapshot: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<ChatOutcome, AssistantError> {
        let Some(token) = self.access_token.as_deref() else {
            return Err(AssistantError::NotSignedIn);
        };

        tracing::info!(%mode, messages = messages.len(), "assistant: sending request");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&ChatRequest { messages, mode })
            .send()
            .await
            .map_err(|e| AssistantError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| AssistantError::ApiRequest(e.to_string()))?;
            let err = classify_status(status, &body);
            tracing::warn!(status, error = %err, "assistant: request refused");
            return Err(err);
        }

        let outcome = drive_stream(response.bytes_stream(), StreamDecoder::with_limits(self.limits), on_snapshot).await?;
        tracing::info!(
            chars = outcome.text.chars().count(),
            termination = ?outcome.termination,
            "assistant: reply complete"
        );
        Ok(outcome)
    }
}

// =============================================================================
// STATUS MAPPING
// =============================================================================

/// Map a non-success status and its body to a typed error.
pub(crate) fn classify_status(status: u16, body: &str) -> AssistantError {
    match status {
        429 => AssistantError::RateLimited,
        402 => AssistantError::CreditsExhausted,
        _ => AssistantError::ApiResponse { status, message: error_message(body) },
    }
}

fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .map(|root| root.get("error").and_then(Value::as_str).map(str::to_owned));
    match from_json {
        Ok(Some(message)) => message,
        _ if body.trim().is_empty() => "failed to get response".to_string(),
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
