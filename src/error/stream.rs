//! Streaming-related error types.
//!
//! These are the only failures a stream session surfaces to callers.
//! Malformed payloads and unknown event tags are recovered inside the
//! session and reported through the diagnostic sink instead.

use std::time::Duration;

use thiserror::Error;

/// Terminal error of a stream session.
///
/// Cloned once per registered error callback and once per completion
/// awaitable, so it carries rendered messages rather than the source error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The underlying byte stream reported an error.
    #[error("Stream transport error: {message}")]
    Transport { message: String },

    /// No terminal condition was reached within the configured window.
    #[error("Response stream timeout after {} ms", duration.as_millis())]
    Timeout { duration: Duration },
}

impl StreamError {
    /// Build a transport error from anything displayable.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        StreamError::Transport {
            message: err.to_string(),
        }
    }

    /// Check if this error is likely transient and the call can be reissued.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::Transport { .. } | StreamError::Timeout { .. }
        )
    }

    /// Check if this error was raised by the session's own timer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, StreamError::Timeout { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Transport { message } => {
                format!("Connection to the server was interrupted: {}", message)
            }
            StreamError::Timeout { duration } => format!(
                "No complete response from server within {:.1} seconds.",
                duration.as_secs_f64()
            ),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport { .. } => "E_STREAM_TRANSPORT",
            StreamError::Timeout { .. } => "E_STREAM_TIMEOUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error() {
        let err = StreamError::transport("connection reset by peer");
        assert!(err.is_retryable());
        assert!(!err.is_timeout());
        assert_eq!(err.error_code(), "E_STREAM_TRANSPORT");
        assert!(err.user_message().contains("connection reset by peer"));
    }

    #[test]
    fn test_timeout_error() {
        let err = StreamError::Timeout {
            duration: Duration::from_millis(50),
        };
        assert!(err.is_retryable());
        assert!(err.is_timeout());
        assert_eq!(err.error_code(), "E_STREAM_TIMEOUT");
        assert_eq!(err.to_string(), "Response stream timeout after 50 ms");
    }

    #[test]
    fn test_user_message_formats() {
        let err = StreamError::Timeout {
            duration: Duration::from_secs(60),
        };
        assert!(err.user_message().contains("60.0 seconds"));
    }

    #[test]
    fn test_display_format() {
        let err = StreamError::Transport {
            message: "broken pipe".to_string(),
        };
        assert_eq!(format!("{}", err), "Stream transport error: broken pipe");
    }
}
