//! Event payload structs.
//!
//! One struct per event shape. The `event` discriminant itself is
//! consumed by the flavor unions (`ChatEvent`, `WorkflowEvent`,
//! `CompletionEvent`), so it does not appear here.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Free-form JSON object (workflow inputs, outputs, process data).
pub type JsonObject = Map<String, Value>;

/// Token usage and pricing reported with `message_end`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub prompt_unit_price: String,
    pub prompt_price_unit: String,
    pub prompt_price: String,
    pub completion_tokens: u64,
    pub completion_unit_price: String,
    pub completion_price_unit: String,
    pub completion_price: String,
    pub total_tokens: u64,
    pub total_price: String,
    pub currency: String,
    /// Seconds
    pub latency: f64,
}

/// Knowledge retrieval citation attached to an answer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RetrieverResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub metadata: Option<JsonObject>,
}

/// Status of a workflow run or node execution.
///
/// Unrecognized values are kept in [`RunStatus::Other`] so a new upstream
/// status never turns a well-formed frame into a parse failure.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(from = "String")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
    Stopped,
    Cancelled,
    Other(String),
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "running" => RunStatus::Running,
            "succeeded" => RunStatus::Succeeded,
            "failed" => RunStatus::Failed,
            "stopped" => RunStatus::Stopped,
            "cancelled" => RunStatus::Cancelled,
            _ => RunStatus::Other(value),
        }
    }
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Stopped => "stopped",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Other(s) => s,
        }
    }
}

/// Streamed answer fragment (`message`, also used for `message_replace`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MessageEvent {
    pub task_id: String,
    #[serde(default)]
    pub id: Option<String>,
    pub message_id: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub answer: String,
    #[serde(default)]
    pub created_at: i64,
}

/// Content moderation replaced the whole answer (`message_replace`).
pub type MessageReplaceEvent = MessageEvent;

/// Metadata block of `message_end`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct MessageEndMetadata {
    pub usage: Usage,
    pub retriever_resources: Vec<RetrieverResource>,
}

/// Final event of an answer (`message_end`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MessageEndEvent {
    pub task_id: String,
    #[serde(default)]
    pub id: Option<String>,
    pub message_id: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub metadata: MessageEndMetadata,
}

/// A file produced by the assistant (`message_file`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MessageFileEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub belongs_to: String,
    pub url: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Text-to-speech audio chunk (`tts_message` and `tts_message_end`).
///
/// `audio` is base64-encoded; it is empty on `tts_message_end`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TtsMessageEvent {
    pub task_id: String,
    pub message_id: String,
    #[serde(default)]
    pub audio: String,
    #[serde(default)]
    pub created_at: i64,
}

/// Error reported in-band by the server (`error`).
///
/// This is an ordinary event: it is dispatched to `on_error_event`
/// callbacks and does not terminate the session.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ErrorEvent {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    /// Raw error text, when the server sends one alongside `message`.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowStartedData {
    pub id: String,
    pub workflow_id: String,
    #[serde(default)]
    pub sequence_number: u64,
    #[serde(default)]
    pub created_at: i64,
}

/// A workflow run began (`workflow_started`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowStartedEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: WorkflowStartedData,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowFinishedData {
    pub id: String,
    pub workflow_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub outputs: Option<JsonObject>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_steps: u64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub finished_at: i64,
}

/// A workflow run ended, successfully or not (`workflow_finished`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowFinishedEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: WorkflowFinishedData,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NodeStartedData {
    pub id: String,
    pub node_id: String,
    pub node_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub predecessor_node_id: Option<String>,
    #[serde(default)]
    pub inputs: Option<JsonObject>,
    #[serde(default)]
    pub created_at: i64,
}

/// A workflow node began executing (`node_started`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NodeStartedEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: NodeStartedData,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ExecutionMetadata {
    pub total_tokens: Option<u64>,
    pub total_price: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NodeFinishedData {
    pub id: String,
    pub node_id: String,
    pub node_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub predecessor_node_id: Option<String>,
    #[serde(default)]
    pub inputs: Option<JsonObject>,
    #[serde(default)]
    pub process_data: Option<JsonObject>,
    #[serde(default)]
    pub outputs: Option<JsonObject>,
    pub status: RunStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub execution_metadata: ExecutionMetadata,
    #[serde(default)]
    pub created_at: i64,
}

/// A workflow node finished executing (`node_finished`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NodeFinishedEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: NodeFinishedData,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TextChunkData {
    pub text: String,
    #[serde(default)]
    pub from_variable_selector: Vec<String>,
}

/// Streamed text output of a workflow (`text_chunk`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TextChunkEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: TextChunkData,
}

/// Accepts `12`, `"12"` or `null` (upstream is inconsistent about `total_steps`).
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("expected unsigned integer, got {}", n))),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected integer or string, got {}",
            other
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
