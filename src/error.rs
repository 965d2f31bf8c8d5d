//! Shared error-code contract.

/// Grepable error code and retryable flag, logged alongside the message.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
