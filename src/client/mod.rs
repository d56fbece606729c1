//! Streaming HTTP client for the Dify app API.
//!
//! Each call issues one POST with `response_mode: "streaming"` and hands
//! the response body to the matching stream handler. Only the status line
//! is awaited here; the body is consumed by the handler's session task
//! once the handler is started.

mod params;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, warn};

pub use params::{
    ChatMessageParams, CompletionMessageParams, RunWorkflowParams, TransferMethod, VisionFile,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::handler::{ChatStreamHandler, CompletionStreamHandler, WorkflowStreamHandler};
use crate::stream::StreamOptions;
use params::StreamingBody;

pub const CHAT_MESSAGES_PATH: &str = "chat-messages";
pub const WORKFLOW_RUN_PATH: &str = "workflows/run";
pub const COMPLETION_MESSAGES_PATH: &str = "completion-messages";

/// Client for the streaming endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DifyClient {
    config: ClientConfig,
    client: Client,
}

impl DifyClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// Build from `DIFY_*` environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Use an existing reqwest client, e.g. one with custom TLS or proxies.
    pub fn with_client(config: ClientConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stream a chat answer.
    pub async fn chat_stream(&self, params: &ChatMessageParams) -> ClientResult<ChatStreamHandler> {
        let response = self.open_stream(CHAT_MESSAGES_PATH, params).await?;
        Ok(ChatStreamHandler::with_options(
            response.bytes_stream(),
            self.stream_options(),
        ))
    }

    /// Stream a workflow run.
    pub async fn run_workflow_stream(
        &self,
        params: &RunWorkflowParams,
    ) -> ClientResult<WorkflowStreamHandler> {
        let response = self.open_stream(WORKFLOW_RUN_PATH, params).await?;
        Ok(WorkflowStreamHandler::with_options(
            response.bytes_stream(),
            self.stream_options(),
        ))
    }

    /// Stream a text completion.
    pub async fn completion_stream(
        &self,
        params: &CompletionMessageParams,
    ) -> ClientResult<CompletionStreamHandler> {
        let response = self.open_stream(COMPLETION_MESSAGES_PATH, params).await?;
        Ok(CompletionStreamHandler::with_options(
            response.bytes_stream(),
            self.stream_options(),
        ))
    }

    fn stream_options(&self) -> StreamOptions {
        match self.config.stream_timeout {
            Some(timeout) => StreamOptions::default().with_timeout(timeout),
            None => StreamOptions::default(),
        }
    }

    async fn open_stream<P: Serialize>(&self, path: &str, params: &P) -> ClientResult<Response> {
        let url = self.config.endpoint(path);
        debug!(%url, "Opening stream");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(&StreamingBody::new(params))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%url, status = status.as_u16(), "Stream request rejected");
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message: server_message(&message),
            });
        }

        Ok(response)
    }
}

/// Pull `message` out of a JSON error body, falling back to the raw text.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"code":"invalid_param","message":"query is required","status":400}"#),
            "query is required"
        );
        assert_eq!(server_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(server_message(r#"{"detail":"x"}"#), r#"{"detail":"x"}"#);
    }

    #[test]
    fn test_stream_options_follow_config() {
        let client = DifyClient::new(
            ClientConfig::new("app-key").with_stream_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(client.stream_options().timeout, Some(Duration::from_secs(5)));

        let client = DifyClient::new(ClientConfig::new("app-key")).unwrap();
        assert_eq!(client.stream_options().timeout, None);
    }
}
