use super::*;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Callers hold `ENV_LOCK` so no other test touches the environment.
unsafe fn clear_assistant_env() {
    unsafe {
        std::env::remove_var("STUDYDASH_BACKEND_URL");
        std::env::remove_var("STUDYDASH_ACCESS_TOKEN");
        std::env::remove_var("STUDYDASH_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("STUDYDASH_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("STUDYDASH_STREAM_MAX_REBUFFERS");
        std::env::remove_var("STUDYDASH_STREAM_MAX_BUFFER_BYTES");
    }
}

#[test]
fn from_env_applies_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_assistant_env();
        std::env::set_var("STUDYDASH_BACKEND_URL", "https://project.supabase.co/");
    }

    let cfg = AssistantConfig::from_env().unwrap();
    assert_eq!(cfg.endpoint, "https://project.supabase.co/functions/v1/study-assistant");
    assert_eq!(cfg.access_token, None);
    assert_eq!(cfg.timeouts, Timeouts::default());
    assert_eq!(cfg.limits, DecoderLimits::default());

    unsafe { clear_assistant_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_assistant_env();
        std::env::set_var("STUDYDASH_BACKEND_URL", "http://127.0.0.1:54321");
        std::env::set_var("STUDYDASH_ACCESS_TOKEN", " eyJhbGciOi ");
        std::env::set_var("STUDYDASH_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("STUDYDASH_CONNECT_TIMEOUT_SECS", "7");
        std::env::set_var("STUDYDASH_STREAM_MAX_REBUFFERS", "4");
        std::env::set_var("STUDYDASH_STREAM_MAX_BUFFER_BYTES", "2048");
    }

    let cfg = AssistantConfig::from_env().unwrap();
    assert_eq!(cfg.endpoint, "http://127.0.0.1:54321/functions/v1/study-assistant");
    assert_eq!(cfg.access_token.as_deref(), Some("eyJhbGciOi"));
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });
    assert_eq!(cfg.limits, DecoderLimits { max_rebuffer_attempts: 4, max_buffer_bytes: 2048 });

    unsafe { clear_assistant_env() };
}

#[test]
fn from_env_ignores_bad_numbers_and_blank_token() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_assistant_env();
        std::env::set_var("STUDYDASH_BACKEND_URL", "https://example.test");
        std::env::set_var("STUDYDASH_ACCESS_TOKEN", "   ");
        std::env::set_var("STUDYDASH_REQUEST_TIMEOUT_SECS", "soon");
    }

    let cfg = AssistantConfig::from_env().unwrap();
    assert_eq!(cfg.access_token, None);
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_assistant_env() };
}

#[test]
fn from_env_requires_backend_url() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe { clear_assistant_env() };

    let err = AssistantConfig::from_env().unwrap_err();
    assert!(matches!(err, AssistantError::MissingConfig { ref var } if var == "STUDYDASH_BACKEND_URL"));
}

#[test]
fn endpoint_rejects_non_http_urls() {
    assert!(endpoint_for("ftp://example.test").is_err());
    assert!(endpoint_for("https://").is_err());
    assert!(endpoint_for("example.test").is_err());
    assert_eq!(
        endpoint_for("https://example.test//").unwrap(),
        "https://example.test/functions/v1/study-assistant"
    );
}
