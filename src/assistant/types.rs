//! Study-assistant types: chat messages, request body, outcomes, and errors.

use std::fmt;
use std::str::FromStr;

use chatstream::DecodeError;
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while talking to the study assistant.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// A required environment variable is not set.
    #[error("missing config: env var {var} not set")]
    MissingConfig { var: String },

    /// No session token is available; the user has to sign in first.
    #[error("not signed in: set STUDYDASH_ACCESS_TOKEN")]
    NotSignedIn,

    /// The prompt was empty after trimming.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request could not be sent.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The proxy rejected the request for rate limiting (HTTP 429).
    #[error("rate limit exceeded, wait a moment and retry")]
    RateLimited,

    /// The proxy's model credits are used up (HTTP 402).
    #[error("AI credits exhausted")]
    CreditsExhausted,

    /// Any other non-success status.
    #[error("API response error: status {status}: {message}")]
    ApiResponse { status: u16, message: String },

    /// The response body stream failed mid-read.
    #[error("stream transport failed: {0}")]
    Transport(String),

    /// The response body could not be decoded within bounds.
    #[error("stream decode failed: {0}")]
    Decode(#[from] DecodeError),
}

impl ErrorCode for AssistantError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingConfig { .. } => "E_MISSING_CONFIG",
            Self::NotSignedIn => "E_NOT_SIGNED_IN",
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::RateLimited => "E_RATE_LIMITED",
            Self::CreditsExhausted => "E_CREDITS_EXHAUSTED",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Decode(_) => "E_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ApiRequest(_) | Self::Transport(_) | Self::RateLimited | Self::ApiResponse { status: 500..=599, .. }
        )
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Which prompt the proxy should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    #[default]
    Answer,
    Summarize,
    Practice,
}

impl StudyMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::Summarize => "summarize",
            Self::Practice => "practice",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Answer => "Ask questions about any subject",
            Self::Summarize => "Paste notes to get a summary",
            Self::Practice => "Generate practice questions",
        }
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyMode {
    type Err = AssistantError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "answer" => Ok(Self::Answer),
            "summarize" => Ok(Self::Summarize),
            "practice" => Ok(Self::Practice),
            other => Err(AssistantError::ConfigParse(format!(
                "unknown mode '{other}' (expected 'answer', 'summarize' or 'practice')"
            ))),
        }
    }
}

/// Body posted to the study-assistant endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub mode: StudyMode,
}

// =============================================================================
// OUTCOME
// =============================================================================

/// How a response stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The `[DONE]` sentinel arrived.
    Sentinel,
    /// The body closed without a sentinel.
    Closed,
}

/// Final result of one streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    pub text: String,
    pub termination: Termination,
}

// =============================================================================
// ASSISTANT CHAT TRAIT
// =============================================================================

/// Streamed chat against the study assistant. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AssistantChat: Send + Sync {
    /// Send the conversation and stream the reply.
    ///
    /// `on_snapshot` receives the full reply text each time it grows.
    ///
    /// # Errors
    ///
    /// Returns an [`AssistantError`] if the request is refused, the status is
    /// not successful, the body stream fails, or decoding exceeds its bounds.
    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        mode: StudyMode,
        on_snapshot: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<ChatOutcome, AssistantError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
