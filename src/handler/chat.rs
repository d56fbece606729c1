//! Chat stream facade.

use std::fmt;

use futures::Stream;

use super::StreamControl;
use crate::events::{
    ChatEvent, ChatEventKind, ErrorEvent, MessageEndEvent, MessageEvent, MessageFileEvent,
    MessageReplaceEvent, TtsMessageEvent,
};
use crate::stream::{StreamOptions, StreamSession};

/// Handler for the body of a streaming `/chat-messages` call.
#[derive(Debug)]
pub struct ChatStreamHandler {
    session: StreamSession<ChatEvent>,
}

impl ChatStreamHandler {
    /// Start consuming `stream` with default options. Requires a tokio runtime.
    pub fn new<S, B, Err>(stream: S) -> Self
    where
        S: Stream<Item = Result<B, Err>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        Err: fmt::Display + Send + 'static,
    {
        Self::with_options(stream, StreamOptions::default())
    }

    pub fn with_options<S, B, Err>(stream: S, options: StreamOptions) -> Self
    where
        S: Stream<Item = Result<B, Err>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        Err: fmt::Display + Send + 'static,
    {
        Self {
            session: StreamSession::spawn(stream, options),
        }
    }

    /// Incremental answer text.
    pub fn on_message<F>(&self, callback: F) -> &Self
    where
        F: Fn(&MessageEvent) + Send + Sync + 'static,
    {
        self.session.register(ChatEventKind::Message, move |event| {
            if let ChatEvent::Message(payload) = event {
                callback(payload);
            }
        });
        self
    }

    /// End of the answer, with usage and retriever resources.
    pub fn on_message_end<F>(&self, callback: F) -> &Self
    where
        F: Fn(&MessageEndEvent) + Send + Sync + 'static,
    {
        self.session.register(ChatEventKind::MessageEnd, move |event| {
            if let ChatEvent::MessageEnd(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_message_file<F>(&self, callback: F) -> &Self
    where
        F: Fn(&MessageFileEvent) + Send + Sync + 'static,
    {
        self.session.register(ChatEventKind::MessageFile, move |event| {
            if let ChatEvent::MessageFile(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_tts_message<F>(&self, callback: F) -> &Self
    where
        F: Fn(&TtsMessageEvent) + Send + Sync + 'static,
    {
        self.session.register(ChatEventKind::TtsMessage, move |event| {
            if let ChatEvent::TtsMessage(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_tts_message_end<F>(&self, callback: F) -> &Self
    where
        F: Fn(&TtsMessageEvent) + Send + Sync + 'static,
    {
        self.session.register(ChatEventKind::TtsMessageEnd, move |event| {
            if let ChatEvent::TtsMessageEnd(payload) = event {
                callback(payload);
            }
        });
        self
    }

    /// Moderation replaced the answer so far.
    pub fn on_message_replace<F>(&self, callback: F) -> &Self
    where
        F: Fn(&MessageReplaceEvent) + Send + Sync + 'static,
    {
        self.session.register(ChatEventKind::MessageReplace, move |event| {
            if let ChatEvent::MessageReplace(payload) = event {
                callback(payload);
            }
        });
        self
    }

    /// Upstream `error` event. Not terminal; the stream may continue.
    pub fn on_error_event<F>(&self, callback: F) -> &Self
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        self.session.register(ChatEventKind::Error, move |event| {
            if let ChatEvent::Error(payload) = event {
                callback(payload);
            }
        });
        self
    }
}

impl StreamControl for ChatStreamHandler {
    type Event = ChatEvent;

    fn session(&self) -> &StreamSession<ChatEvent> {
        &self.session
    }
}
