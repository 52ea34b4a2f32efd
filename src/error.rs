//! Error types for the rt-mcp server.
//!
//! This module defines `RtError`, the unified error type used throughout
//! the application for consistent error handling and propagation.
//!
//! # Security
//!
//! All error messages are sanitized to ensure the RT token is never leaked
//! in logs or tool responses. Use `sanitize_message()` when constructing
//! error messages from external sources.

use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong between the environment, RT and a tool.
///
/// Tool functions turn these into error records; `main` turns the
/// configuration variants into startup failures.
#[derive(Error, Debug)]
pub enum RtError {
    /// Missing or invalid `RT_*` environment variable.
    #[error("configuration error: {0}")]
    Config(String),

    /// RT could not be reached (DNS, refused connection, broken body).
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The reqwest client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// RT answered with a non-2xx status.
    #[error("HTTP error! status {status} : {body}")]
    HttpStatus {
        /// Status RT answered with.
        status: reqwest::StatusCode,
        /// Redacted, truncated body; the status reason when RT sent none.
        body: String,
    },

    /// No answer from RT within the configured timeout.
    #[error("request timed out after {duration:?} - the server may be slow or unreachable")]
    Timeout {
        /// The configured timeout.
        duration: Duration,
        /// Method and path of the call, e.g. `GET /ticket/7`.
        operation: String,
    },

    /// RT sent a body that is not JSON, or a record that does not decode.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// RT answered with JSON that does not have the expected shape.
    #[error("Unexpected response format")]
    UnexpectedFormat {
        /// The raw payload RT returned.
        data: serde_json::Value,
    },

    /// Tool input outside its published constraints.
    #[error("validation error: {0}")]
    Validation(String),

    /// The startup probe of `GET /rt` failed.
    #[error("connection test failed: {message}")]
    ConnectionTest {
        /// What went wrong, already redacted.
        message: String,
    },
}

impl RtError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        RtError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// A present but unusable configuration value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        RtError::Config(message.into())
    }

    /// Tool input rejected before any RT call.
    pub fn validation(message: impl Into<String>) -> Self {
        RtError::Validation(message.into())
    }

    /// RT did not answer `operation` within `duration`.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        RtError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Creates an unexpected-format error carrying the raw payload.
    pub fn unexpected_format(data: serde_json::Value) -> Self {
        RtError::UnexpectedFormat { data }
    }

    /// Startup probe failure.
    pub fn connection_test(message: impl Into<String>) -> Self {
        RtError::ConnectionTest {
            message: message.into(),
        }
    }

    /// Replaces every occurrence of `token` in `message` with `[REDACTED]`.
    ///
    /// An empty token leaves the message untouched.
    #[must_use]
    pub fn sanitize_message(message: &str, token: &str) -> String {
        if token.is_empty() {
            return message.to_string();
        }
        message.replace(token, "[REDACTED]")
    }

    /// The display message with the token redacted.
    #[must_use]
    pub fn sanitized_display(&self, token: &str) -> String {
        Self::sanitize_message(&self.to_string(), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_names_variable() {
        let err = RtError::missing_env("RT_BASE_URL");
        assert_eq!(
            err.to_string(),
            "configuration error: missing required environment variable: RT_BASE_URL"
        );
    }

    #[test]
    fn test_validation_message() {
        let err = RtError::validation("ticket_id must be a positive integer");
        assert_eq!(
            err.to_string(),
            "validation error: ticket_id must be a positive integer"
        );
    }

    #[test]
    fn test_timeout_mentions_duration() {
        let err = RtError::timeout(Duration::from_secs(20), "GET /ticket/7/history");
        assert!(err.to_string().contains("timed out after 20s"));
        match err {
            RtError::Timeout { operation, .. } => assert_eq!(operation, "GET /ticket/7/history"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_http_status_matches_rt_wording() {
        let err = RtError::HttpStatus {
            status: reqwest::StatusCode::NOT_FOUND,
            body: "Resource does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error! status 404 Not Found : Resource does not exist"
        );
    }

    #[test]
    fn test_unexpected_format_keeps_payload() {
        let err = RtError::unexpected_format(serde_json::json!([1, 2]));
        assert_eq!(err.to_string(), "Unexpected response format");
        assert!(matches!(err, RtError::UnexpectedFormat { data } if data == serde_json::json!([1, 2])));
    }

    #[test]
    fn test_sanitize_message_redacts_every_occurrence() {
        let token = "1-56-ddce60ef";
        let message = format!("token {} rejected; retry with {}", token, token);
        let sanitized = RtError::sanitize_message(&message, token);
        assert_eq!(sanitized, "token [REDACTED] rejected; retry with [REDACTED]");
    }

    #[test]
    fn test_sanitize_message_without_token_is_identity() {
        assert_eq!(RtError::sanitize_message("queue not found", ""), "queue not found");
    }

    #[test]
    fn test_sanitized_display_on_status_error() {
        let err = RtError::HttpStatus {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "bad token 1-56-abc".to_string(),
        };
        let msg = err.sanitized_display("1-56-abc");
        assert_eq!(msg, "HTTP error! status 401 Unauthorized : bad token [REDACTED]");
    }

    #[test]
    fn test_connection_test_message() {
        let err = RtError::connection_test("Authentication failed - verify RT_TOKEN is correct");
        assert_eq!(
            err.to_string(),
            "connection test failed: Authentication failed - verify RT_TOKEN is correct"
        );
    }
}
