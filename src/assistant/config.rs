//! Study-assistant configuration parsed from environment variables.

use chatstream::{DEFAULT_MAX_BUFFER_BYTES, DEFAULT_MAX_REBUFFER_ATTEMPTS, DecoderLimits};

use super::types::AssistantError;

pub const ASSISTANT_PATH: &str = "/functions/v1/study-assistant";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const BACKEND_URL_VAR: &str = "STUDYDASH_BACKEND_URL";
const ACCESS_TOKEN_VAR: &str = "STUDYDASH_ACCESS_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Full URL of the study-assistant function.
    pub endpoint: String,
    pub access_token: Option<String>,
    pub timeouts: Timeouts,
    pub limits: DecoderLimits,
}

impl AssistantConfig {
    /// Build typed assistant config from environment variables.
    ///
    /// Required:
    /// - `STUDYDASH_BACKEND_URL`: backend base URL (`http` or `https`)
    ///
    /// Optional:
    /// - `STUDYDASH_ACCESS_TOKEN`: session token; requests are refused without it
    /// - `STUDYDASH_REQUEST_TIMEOUT_SECS`: default 120
    /// - `STUDYDASH_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STUDYDASH_STREAM_MAX_REBUFFERS`: default 16
    /// - `STUDYDASH_STREAM_MAX_BUFFER_BYTES`: default 1 MiB
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is missing or not an HTTP URL.
    pub fn from_env() -> Result<Self, AssistantError> {
        let backend = std::env::var(BACKEND_URL_VAR)
            .map_err(|_| AssistantError::MissingConfig { var: BACKEND_URL_VAR.into() })?;
        let endpoint = endpoint_for(&backend)?;

        let access_token = match std::env::var(ACCESS_TOKEN_VAR) {
            Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
            _ => None,
        };

        let timeouts = Timeouts {
            request_secs: env_parse("STUDYDASH_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("STUDYDASH_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let limits = DecoderLimits {
            max_rebuffer_attempts: env_parse("STUDYDASH_STREAM_MAX_REBUFFERS", DEFAULT_MAX_REBUFFER_ATTEMPTS),
            max_buffer_bytes: env_parse("STUDYDASH_STREAM_MAX_BUFFER_BYTES", DEFAULT_MAX_BUFFER_BYTES),
        };

        Ok(Self { endpoint, access_token, timeouts, limits })
    }
}

/// Join a backend base URL with the assistant function path.
///
/// # Errors
///
/// Returns `ConfigParse` if the URL is not `http://` or `https://`.
pub fn endpoint_for(backend: &str) -> Result<String, AssistantError> {
    let base = backend.trim().trim_end_matches('/');
    let has_host = ["https://", "http://"]
        .iter()
        .any(|scheme| base.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(AssistantError::ConfigParse(format!(
            "{BACKEND_URL_VAR} must be an http(s) URL, got '{backend}'"
        )));
    }
    Ok(format!("{base}{ASSISTANT_PATH}"))
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key).map(|raw| raw.trim().parse::<T>()) {
        Ok(Ok(value)) => value,
        Ok(Err(_)) => {
            tracing::warn!(%key, "config: unparseable value, using default");
            default
        }
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
