//! Common test utilities for integration tests.
//!
//! Sessions are fed through an unbounded byte channel so each test decides
//! exactly where chunk boundaries fall and when the stream ends or fails.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures::channel::mpsc;
use serde_json::{json, Value};

/// Transport items as produced by the test channel.
pub type Chunk = Result<Bytes, String>;

/// Sending half of a test byte stream.
pub struct ByteFeed {
    tx: mpsc::UnboundedSender<Chunk>,
}

impl ByteFeed {
    /// Deliver one chunk. Delivery after the session released the stream
    /// is silently ignored, like a late packet.
    pub fn send(&self, chunk: impl Into<Bytes>) {
        let _ = self.tx.unbounded_send(Ok(chunk.into()));
    }

    /// Deliver a transport error.
    pub fn fail(&self, message: &str) {
        let _ = self.tx.unbounded_send(Err(message.to_string()));
    }

    /// End of stream.
    pub fn end(self) {
        drop(self);
    }

    /// True once the receiving session has dropped the stream.
    pub fn is_released(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A byte channel: feed on one side, a `Stream` for a handler on the other.
pub fn byte_channel() -> (ByteFeed, mpsc::UnboundedReceiver<Chunk>) {
    let (tx, rx) = mpsc::unbounded();
    (ByteFeed { tx }, rx)
}

/// Wrap a JSON payload as one SSE frame.
pub fn frame(payload: &Value) -> String {
    format!("data: {}\n\n", payload)
}

pub fn message_json(answer: &str) -> Value {
    json!({
        "event": "message",
        "task_id": "t1",
        "message_id": "m1",
        "conversation_id": "c1",
        "answer": answer,
        "created_at": 1
    })
}

pub fn message_end_json() -> Value {
    json!({
        "event": "message_end",
        "task_id": "t1",
        "id": "e1",
        "message_id": "m1",
        "conversation_id": "c1",
        "metadata": {
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 5,
                "total_tokens": 15,
                "total_price": "0.0001",
                "currency": "USD",
                "latency": 0.42
            },
            "retriever_resources": []
        }
    })
}

pub fn message_frame(answer: &str) -> String {
    frame(&message_json(answer))
}

pub fn message_end_frame() -> String {
    frame(&message_end_json())
}

/// Shared, ordered log of callback invocations.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Let the session task run until it blocks on the stream again.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Wait up to a second for the session to drop the stream. Works on any
/// runtime flavor, unlike [`settle`].
pub async fn released(feed: &ByteFeed) -> bool {
    for _ in 0..100 {
        if feed.is_released() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    feed.is_released()
}
