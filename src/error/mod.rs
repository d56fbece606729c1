//! Error types.
//!
//! Two failure domains, split by when they can occur:
//!
//! | Type | Raised by | When |
//! |------|-----------|------|
//! | [`ClientError`] | `DifyClient` | Before the response body is handed over |
//! | [`StreamError`] | Stream handlers | While the body is being consumed |
//!
//! Malformed frames and unknown event tags are not errors; see
//! [`crate::stream::Diagnostic`].

mod client;
mod stream;

pub use client::ClientError;
pub use stream::StreamError;

/// Result of a client call.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_codes_are_distinct() {
        let transport = StreamError::transport("reset");
        let timeout = StreamError::Timeout {
            duration: Duration::from_secs(1),
        };
        assert_ne!(transport.error_code(), timeout.error_code());
    }

    #[test]
    fn test_client_result_alias() {
        let result: ClientResult<()> = Err(ClientError::Config("missing".to_string()));
        assert!(result.is_err());
    }
}
