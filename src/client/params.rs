//! Request bodies for the streaming endpoints.
//!
//! None of these carry `response_mode`; the client always sends
//! `"streaming"`.

use serde::Serialize;
use serde_json::Value;

use crate::events::JsonObject;

/// How a [`VisionFile`] reaches the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMethod {
    RemoteUrl,
    LocalFile,
}

/// A file attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisionFile {
    /// `document`, `image`, `audio`, `video` or `custom`.
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub transfer_method: TransferMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_file_id: Option<String>,
}

impl VisionFile {
    pub fn remote(file_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_type: file_type.into(),
            name: None,
            transfer_method: TransferMethod::RemoteUrl,
            url: Some(url.into()),
            upload_file_id: None,
        }
    }

    /// A file previously uploaded through the files endpoint.
    pub fn uploaded(file_type: impl Into<String>, upload_file_id: impl Into<String>) -> Self {
        Self {
            file_type: file_type.into(),
            name: None,
            transfer_method: TransferMethod::LocalFile,
            url: None,
            upload_file_id: Some(upload_file_id.into()),
        }
    }
}

/// Body of `POST /chat-messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessageParams {
    pub inputs: JsonObject,
    pub query: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<VisionFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_generate_name: Option<bool>,
}

impl ChatMessageParams {
    pub fn new(query: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            inputs: JsonObject::new(),
            query: query.into(),
            user: user.into(),
            conversation_id: None,
            files: Vec::new(),
            auto_generate_name: None,
        }
    }

    /// Continue an existing conversation.
    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_file(mut self, file: VisionFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_auto_generate_name(mut self, enabled: bool) -> Self {
        self.auto_generate_name = Some(enabled);
        self
    }
}

/// Body of `POST /workflows/run`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunWorkflowParams {
    /// Workflow variables; file variables take a list of [`VisionFile`].
    pub inputs: JsonObject,
    pub user: String,
}

impl RunWorkflowParams {
    pub fn new(inputs: JsonObject, user: impl Into<String>) -> Self {
        Self {
            inputs,
            user: user.into(),
        }
    }
}

/// Body of `POST /completion-messages`.
///
/// The prompt travels as `inputs.query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionMessageParams {
    pub inputs: JsonObject,
    pub user: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<VisionFile>,
}

impl CompletionMessageParams {
    pub fn new(query: impl Into<String>, user: impl Into<String>) -> Self {
        let mut inputs = JsonObject::new();
        inputs.insert("query".to_string(), Value::String(query.into()));
        Self {
            inputs,
            user: user.into(),
            files: Vec::new(),
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_file(mut self, file: VisionFile) -> Self {
        self.files.push(file);
        self
    }
}

/// Wraps any params body and pins `response_mode`.
#[derive(Debug, Serialize)]
pub(crate) struct StreamingBody<'a, P: Serialize> {
    #[serde(flatten)]
    pub params: &'a P,
    pub response_mode: &'static str,
}

impl<'a, P: Serialize> StreamingBody<'a, P> {
    pub fn new(params: &'a P) -> Self {
        Self {
            params,
            response_mode: "streaming",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_body_omits_unset_fields() {
        let params = ChatMessageParams::new("What is Rust?", "user-1");
        let body = serde_json::to_value(StreamingBody::new(&params)).unwrap();
        assert_eq!(
            body,
            json!({
                "inputs": {},
                "query": "What is Rust?",
                "user": "user-1",
                "response_mode": "streaming"
            })
        );
    }

    #[test]
    fn test_chat_body_with_conversation_and_file() {
        let params = ChatMessageParams::new("describe", "user-1")
            .with_conversation_id("c1")
            .with_file(VisionFile::remote("image", "https://example.com/cat.png"))
            .with_auto_generate_name(false);
        let body = serde_json::to_value(StreamingBody::new(&params)).unwrap();
        assert_eq!(body["conversation_id"], "c1");
        assert_eq!(body["auto_generate_name"], false);
        assert_eq!(
            body["files"],
            json!([{
                "type": "image",
                "transfer_method": "remote_url",
                "url": "https://example.com/cat.png"
            }])
        );
    }

    #[test]
    fn test_completion_query_lives_in_inputs() {
        let params = CompletionMessageParams::new("Translate: hello", "user-2");
        let body = serde_json::to_value(StreamingBody::new(&params)).unwrap();
        assert_eq!(body["inputs"]["query"], "Translate: hello");
        assert!(body.get("query").is_none());
        assert!(body.get("files").is_none());
    }

    #[test]
    fn test_uploaded_file_shape() {
        let file = VisionFile::uploaded("document", "upload-42");
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["transfer_method"], "local_file");
        assert_eq!(value["upload_file_id"], "upload-42");
        assert!(value.get("url").is_none());
    }
}
