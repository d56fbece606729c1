//! Completion flavor events (`/completion-messages`).

use serde::Deserialize;

use super::payloads::{
    ErrorEvent, MessageEndEvent, MessageEvent, MessageReplaceEvent, TtsMessageEvent,
};
use super::{EventKind, StreamEvent};

/// Tags accepted on a completion stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionEventKind {
    Message,
    MessageEnd,
    TtsMessage,
    TtsMessageEnd,
    MessageReplace,
    Error,
}

impl EventKind for CompletionEventKind {
    const ALL: &'static [Self] = &[
        CompletionEventKind::Message,
        CompletionEventKind::MessageEnd,
        CompletionEventKind::TtsMessage,
        CompletionEventKind::TtsMessageEnd,
        CompletionEventKind::MessageReplace,
        CompletionEventKind::Error,
    ];

    fn as_str(self) -> &'static str {
        match self {
            CompletionEventKind::Message => "message",
            CompletionEventKind::MessageEnd => "message_end",
            CompletionEventKind::TtsMessage => "tts_message",
            CompletionEventKind::TtsMessageEnd => "tts_message_end",
            CompletionEventKind::MessageReplace => "message_replace",
            CompletionEventKind::Error => "error",
        }
    }
}

/// Events of a completion stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CompletionEvent {
    Message(MessageEvent),
    MessageEnd(MessageEndEvent),
    TtsMessage(TtsMessageEvent),
    TtsMessageEnd(TtsMessageEvent),
    MessageReplace(MessageReplaceEvent),
    Error(ErrorEvent),
}

impl StreamEvent for CompletionEvent {
    type Kind = CompletionEventKind;

    const FLAVOR: &'static str = "completion";

    fn kind(&self) -> CompletionEventKind {
        match self {
            CompletionEvent::Message(_) => CompletionEventKind::Message,
            CompletionEvent::MessageEnd(_) => CompletionEventKind::MessageEnd,
            CompletionEvent::TtsMessage(_) => CompletionEventKind::TtsMessage,
            CompletionEvent::TtsMessageEnd(_) => CompletionEventKind::TtsMessageEnd,
            CompletionEvent::MessageReplace(_) => CompletionEventKind::MessageReplace,
            CompletionEvent::Error(_) => CompletionEventKind::Error,
        }
    }
}
