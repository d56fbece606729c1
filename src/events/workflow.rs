//! Workflow flavor events (`/workflows/run`).

use serde::Deserialize;

use super::payloads::{
    NodeFinishedEvent, NodeStartedEvent, TextChunkEvent, TtsMessageEvent, WorkflowFinishedEvent,
    WorkflowStartedEvent,
};
use super::{EventKind, StreamEvent};

/// Tags accepted on a workflow stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowEventKind {
    WorkflowStarted,
    NodeStarted,
    NodeFinished,
    TextChunk,
    WorkflowFinished,
    TtsMessage,
    TtsMessageEnd,
}

impl EventKind for WorkflowEventKind {
    const ALL: &'static [Self] = &[
        WorkflowEventKind::WorkflowStarted,
        WorkflowEventKind::NodeStarted,
        WorkflowEventKind::NodeFinished,
        WorkflowEventKind::TextChunk,
        WorkflowEventKind::WorkflowFinished,
        WorkflowEventKind::TtsMessage,
        WorkflowEventKind::TtsMessageEnd,
    ];

    fn as_str(self) -> &'static str {
        match self {
            WorkflowEventKind::WorkflowStarted => "workflow_started",
            WorkflowEventKind::NodeStarted => "node_started",
            WorkflowEventKind::NodeFinished => "node_finished",
            WorkflowEventKind::TextChunk => "text_chunk",
            WorkflowEventKind::WorkflowFinished => "workflow_finished",
            WorkflowEventKind::TtsMessage => "tts_message",
            WorkflowEventKind::TtsMessageEnd => "tts_message_end",
        }
    }
}

/// Events of a workflow stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    WorkflowStarted(WorkflowStartedEvent),
    NodeStarted(NodeStartedEvent),
    NodeFinished(NodeFinishedEvent),
    TextChunk(TextChunkEvent),
    WorkflowFinished(WorkflowFinishedEvent),
    TtsMessage(TtsMessageEvent),
    TtsMessageEnd(TtsMessageEvent),
}

impl StreamEvent for WorkflowEvent {
    type Kind = WorkflowEventKind;

    const FLAVOR: &'static str = "workflow";

    fn kind(&self) -> WorkflowEventKind {
        match self {
            WorkflowEvent::WorkflowStarted(_) => WorkflowEventKind::WorkflowStarted,
            WorkflowEvent::NodeStarted(_) => WorkflowEventKind::NodeStarted,
            WorkflowEvent::NodeFinished(_) => WorkflowEventKind::NodeFinished,
            WorkflowEvent::TextChunk(_) => WorkflowEventKind::TextChunk,
            WorkflowEvent::WorkflowFinished(_) => WorkflowEventKind::WorkflowFinished,
            WorkflowEvent::TtsMessage(_) => WorkflowEventKind::TtsMessage,
            WorkflowEvent::TtsMessageEnd(_) => WorkflowEventKind::TtsMessageEnd,
        }
    }
}
