//! Chat flavor events (`/chat-messages`).

use serde::Deserialize;

use super::payloads::{
    ErrorEvent, MessageEndEvent, MessageEvent, MessageFileEvent, MessageReplaceEvent,
    TtsMessageEvent,
};
use super::{EventKind, StreamEvent};

/// Tags accepted on a chat stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatEventKind {
    Message,
    MessageEnd,
    MessageFile,
    TtsMessage,
    TtsMessageEnd,
    MessageReplace,
    Error,
}

impl EventKind for ChatEventKind {
    const ALL: &'static [Self] = &[
        ChatEventKind::Message,
        ChatEventKind::MessageEnd,
        ChatEventKind::MessageFile,
        ChatEventKind::TtsMessage,
        ChatEventKind::TtsMessageEnd,
        ChatEventKind::MessageReplace,
        ChatEventKind::Error,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ChatEventKind::Message => "message",
            ChatEventKind::MessageEnd => "message_end",
            ChatEventKind::MessageFile => "message_file",
            ChatEventKind::TtsMessage => "tts_message",
            ChatEventKind::TtsMessageEnd => "tts_message_end",
            ChatEventKind::MessageReplace => "message_replace",
            ChatEventKind::Error => "error",
        }
    }
}

/// Events of a chat stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChatEvent {
    Message(MessageEvent),
    MessageEnd(MessageEndEvent),
    MessageFile(MessageFileEvent),
    TtsMessage(TtsMessageEvent),
    TtsMessageEnd(TtsMessageEvent),
    MessageReplace(MessageReplaceEvent),
    Error(ErrorEvent),
}

impl StreamEvent for ChatEvent {
    type Kind = ChatEventKind;

    const FLAVOR: &'static str = "chat";

    fn kind(&self) -> ChatEventKind {
        match self {
            ChatEvent::Message(_) => ChatEventKind::Message,
            ChatEvent::MessageEnd(_) => ChatEventKind::MessageEnd,
            ChatEvent::MessageFile(_) => ChatEventKind::MessageFile,
            ChatEvent::TtsMessage(_) => ChatEventKind::TtsMessage,
            ChatEvent::TtsMessageEnd(_) => ChatEventKind::TtsMessageEnd,
            ChatEvent::MessageReplace(_) => ChatEventKind::MessageReplace,
            ChatEvent::Error(_) => ChatEventKind::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_message() {
        let data = r#"{"event":"message","task_id":"t1","message_id":"m1","conversation_id":"c1","answer":"hi","created_at":1}"#;
        let event: ChatEvent = serde_json::from_str(data).unwrap();
        assert_eq!(event.kind(), ChatEventKind::Message);
        match event {
            ChatEvent::Message(message) => {
                assert_eq!(message.answer, "hi");
                assert_eq!(message.conversation_id.as_deref(), Some("c1"));
                assert_eq!(message.created_at, 1);
            }
            other => panic!("Expected Message, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_tts_message_end_with_empty_audio() {
        let data = r#"{"event":"tts_message_end","task_id":"t1","message_id":"m1","audio":"","created_at":2}"#;
        let event: ChatEvent = serde_json::from_str(data).unwrap();
        assert_eq!(event.kind(), ChatEventKind::TtsMessageEnd);
    }

    #[test]
    fn test_deserialize_error_event() {
        let data = r#"{"event":"error","task_id":"t1","message_id":"m1","status":400,"code":"invalid_param","message":"bad"}"#;
        let event: ChatEvent = serde_json::from_str(data).unwrap();
        match event {
            ChatEvent::Error(err) => {
                assert_eq!(err.status, 400);
                assert_eq!(err.code, "invalid_param");
            }
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[test]
    fn test_workflow_tag_rejected() {
        let data = r#"{"event":"text_chunk","task_id":"t1","workflow_run_id":"w","data":{"text":"x"}}"#;
        assert!(serde_json::from_str::<ChatEvent>(data).is_err());
    }
}
