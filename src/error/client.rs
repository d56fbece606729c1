//! Errors raised while opening a streaming call.
//!
//! Once the response body is handed to a stream handler, failures are
//! reported as [`StreamError`](super::StreamError) instead.

use thiserror::Error;

/// Error type for [`DifyClient`](crate::client::DifyClient) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status.
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Client configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ServerError { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Config(_) => None,
        }
    }

    /// Check if reissuing the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            ClientError::ServerError { status, .. } => *status == 429 || *status >= 500,
            ClientError::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ClientError::ServerError {
            status: 400,
            message: "invalid_param".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("400"));
        assert!(display.contains("invalid_param"));
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_error_retryable_statuses() {
        for status in [429u16, 500, 502, 503] {
            let err = ClientError::ServerError {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "Expected {} to be retryable", status);
        }
    }

    #[test]
    fn test_config_error() {
        let err = ClientError::Config("DIFY_API_KEY is not set".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Configuration error: DIFY_API_KEY is not set"
        );
    }
}
