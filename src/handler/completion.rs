//! Completion stream facade.

use std::fmt;

use futures::Stream;

use super::StreamControl;
use crate::events::{
    CompletionEvent, CompletionEventKind, ErrorEvent, MessageEndEvent, MessageEvent,
    MessageReplaceEvent, TtsMessageEvent,
};
use crate::stream::{StreamOptions, StreamSession};

/// Handler for the body of a streaming `/completion-messages` call.
#[derive(Debug)]
pub struct CompletionStreamHandler {
    session: StreamSession<CompletionEvent>,
}

impl CompletionStreamHandler {
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

    pub fn on_message<F>(&self, callback: F) -> &Self
    where
        F: Fn(&MessageEvent) + Send + Sync + 'static,
    {
        self.session.register(CompletionEventKind::Message, move |event| {
            if let CompletionEvent::Message(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_message_end<F>(&self, callback: F) -> &Self
    where
        F: Fn(&MessageEndEvent) + Send + Sync + 'static,
    {
        self.session.register(CompletionEventKind::MessageEnd, move |event| {
            if let CompletionEvent::MessageEnd(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_tts_message<F>(&self, callback: F) -> &Self
    where
        F: Fn(&TtsMessageEvent) + Send + Sync + 'static,
    {
        self.session.register(CompletionEventKind::TtsMessage, move |event| {
            if let CompletionEvent::TtsMessage(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_tts_message_end<F>(&self, callback: F) -> &Self
    where
        F: Fn(&TtsMessageEvent) + Send + Sync + 'static,
    {
        self.session.register(CompletionEventKind::TtsMessageEnd, move |event| {
            if let CompletionEvent::TtsMessageEnd(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_message_replace<F>(&self, callback: F) -> &Self
    where
        F: Fn(&MessageReplaceEvent) + Send + Sync + 'static,
    {
        self.session.register(CompletionEventKind::MessageReplace, move |event| {
            if let CompletionEvent::MessageReplace(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_error_event<F>(&self, callback: F) -> &Self
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        self.session.register(CompletionEventKind::Error, move |event| {
            if let CompletionEvent::Error(payload) = event {
                callback(payload);
            }
        });
        self
    }
}

impl StreamControl for CompletionStreamHandler {
    type Event = CompletionEvent;

    fn session(&self) -> &StreamSession<CompletionEvent> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamOutcome;
    use bytes::Bytes;
    use futures::stream;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_message_end_carries_usage() {
        let body = concat!(
            "data: {\"event\":\"message\",\"task_id\":\"t1\",\"message_id\":\"m1\",\"answer\":\"4\",\"created_at\":1}\n\n",
            "data: {\"event\":\"message_end\",\"task_id\":\"t1\",\"id\":\"e1\",\"message_id\":\"m1\",\"metadata\":{\"usage\":{\"prompt_tokens\":3,\"completion_tokens\":1,\"total_tokens\":4,\"latency\":0.25}}}\n\n",
        );
        let chunks: Vec<Result<Bytes, Infallible>> = vec![Ok(Bytes::from(body))];
        let handler = CompletionStreamHandler::new(stream::iter(chunks));

        let totals = Arc::new(Mutex::new(Vec::new()));
        let totals_clone = totals.clone();
        handler.on_message_end(move |end| {
            totals_clone
                .lock()
                .unwrap()
                .push(end.metadata.usage.total_tokens)
        });

        assert_eq!(handler.wait_for_completion().await, Ok(StreamOutcome::Finished));
        assert_eq!(*totals.lock().unwrap(), vec![4]);
    }

    #[tokio::test]
    async fn test_message_file_is_unknown_to_completion() {
        let body = "data: {\"event\":\"message_file\",\"id\":\"f1\",\"type\":\"image\",\"belongs_to\":\"assistant\",\"url\":\"https://x\"}\n\n";
        let chunks: Vec<Result<Bytes, Infallible>> = vec![Ok(Bytes::from(body))];
        let reported = Arc::new(Mutex::new(Vec::new()));
        let reported_clone = reported.clone();
        let options = StreamOptions::default().with_diagnostics(
            move |d: &crate::stream::Diagnostic| reported_clone.lock().unwrap().push(d.clone()),
        );
        let handler = CompletionStreamHandler::with_options(stream::iter(chunks), options);

        handler.wait_for_completion().await.unwrap();
        assert_eq!(
            *reported.lock().unwrap(),
            vec![crate::stream::Diagnostic::UnknownEvent {
                flavor: "completion",
                tag: Some("message_file".to_string()),
            }]
        );
    }
}
