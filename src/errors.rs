//! Application error model with MCP error mapping
//!
//! Defines a typed error hierarchy using `thiserror` for internal error handling,
//! and maps each variant to the appropriate MCP `ErrorData` type for protocol
//! compliance. Provider failures travel through the mailbox layer untouched;
//! only the tool boundary converts them.

use rmcp::model::ErrorData;
use serde_json::json;
use thiserror::Error;

/// Application error type
///
/// Covers tool validation, configuration, and every failure the Gmail
/// provider can report. Each variant maps to an MCP error code in
/// [`ErrorData`].
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid user input or configuration (validation failed, malformed value)
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Resource not found at the provider (message, label)
    #[error("not found: {0}")]
    NotFound(String),
    /// Authentication or authorization failure (expired token, missing scope)
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    /// Provider quota or rate limit exceeded
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Provider request did not complete in time
    #[error("operation timed out: {0}")]
    Timeout(String),
    /// Any other provider failure (5xx, transport fault, unreadable response)
    #[error("provider error: {0}")]
    Provider(String),
    /// Internal error (unexpected local failure)
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Convenience constructor for `InvalidInput`
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Convert to MCP `ErrorData`
    ///
    /// Maps each `AppError` variant to the appropriate MCP error type and
    /// includes a structured `code` field for client error handling.
    ///
    /// # Mappings
    ///
    /// - `InvalidInput` → `invalid_params`
    /// - `NotFound` → `resource_not_found`
    /// - `AuthFailed` → `invalid_request`
    /// - `RateLimited` → `internal_error`
    /// - `Timeout` → `internal_error`
    /// - `Provider` → `internal_error`
    /// - `Internal` → `internal_error`
    pub fn to_error_data(&self) -> ErrorData {
        match self {
            Self::InvalidInput(msg) => {
                ErrorData::invalid_params(msg.clone(), Some(json!({ "code": "invalid_input" })))
            }
            Self::NotFound(msg) => {
                ErrorData::resource_not_found(msg.clone(), Some(json!({ "code": "not_found" })))
            }
            Self::AuthFailed(msg) => {
                ErrorData::invalid_request(msg.clone(), Some(json!({ "code": "auth_failed" })))
            }
            Self::RateLimited(msg) => {
                ErrorData::internal_error(msg.clone(), Some(json!({ "code": "rate_limited" })))
            }
            Self::Timeout(msg) => {
                ErrorData::internal_error(msg.clone(), Some(json!({ "code": "timeout" })))
            }
            Self::Provider(msg) => {
                ErrorData::internal_error(msg.clone(), Some(json!({ "code": "provider" })))
            }
            Self::Internal(msg) => {
                ErrorData::internal_error(msg.clone(), Some(json!({ "code": "internal" })))
            }
        }
    }
}

/// Type alias for fallible return values
///
/// Use this for all internal functions that can fail. Provides a consistent
/// error type throughout the codebase.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn error_data_carries_structured_code() {
        let cases = [
            (AppError::invalid("bad"), "invalid_input"),
            (AppError::NotFound("msg".to_owned()), "not_found"),
            (AppError::AuthFailed("token".to_owned()), "auth_failed"),
            (AppError::RateLimited("quota".to_owned()), "rate_limited"),
            (AppError::Timeout("slow".to_owned()), "timeout"),
            (AppError::Provider("503".to_owned()), "provider"),
            (AppError::Internal("oops".to_owned()), "internal"),
        ];

        for (err, code) in cases {
            let data = err.to_error_data();
            let payload = data.data.expect("error data must include payload");
            assert_eq!(payload["code"], code);
        }
    }

    #[test]
    fn display_includes_kind_prefix() {
        let err = AppError::NotFound("message 'abc'".to_owned());
        assert_eq!(err.to_string(), "not found: message 'abc'");
    }
}
