//! Client configuration.
//!
//! # Example
//!
//! ```ignore
//! use dify_stream::config::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("app-xxxx")
//!     .with_base_url("http://localhost/v1")
//!     .with_stream_timeout(Duration::from_secs(120));
//! ```

use std::fmt;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai/v1";

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_API_KEY: &str = "DIFY_API_KEY";
pub const ENV_BASE_URL: &str = "DIFY_BASE_URL";
pub const ENV_STREAM_TIMEOUT_SECS: &str = "DIFY_STREAM_TIMEOUT_SECS";

/// Settings for [`DifyClient`](crate::client::DifyClient).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// App API key, sent as a bearer token.
    pub api_key: String,
    /// API root without trailing slash.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Overall deadline for each stream (default: none).
    ///
    /// No whole-request HTTP timeout is applied, so this is the only bound
    /// on how long a stream may run.
    pub stream_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            stream_timeout: None,
        }
    }

    /// Set the API root. A trailing slash is stripped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = Some(timeout);
        self
    }

    /// Read `DIFY_API_KEY` (required), `DIFY_BASE_URL` and
    /// `DIFY_STREAM_TIMEOUT_SECS`.
    pub fn from_env() -> ClientResult<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClientError::Config(format!("{} is not set", ENV_API_KEY)))?;

        let mut config = Self::new(api_key);

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                config = config.with_base_url(url.trim());
            }
        }

        if let Ok(raw) = std::env::var(ENV_STREAM_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_STREAM_TIMEOUT_SECS, raw
                ))
            })?;
            config = config.with_stream_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Join an endpoint path onto the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("connect_timeout", &self.connect_timeout)
            .field("stream_timeout", &self.stream_timeout)
            .finish()
    }
}
