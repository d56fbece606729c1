//! Workflow stream facade.

use std::fmt;

use futures::Stream;

use super::StreamControl;
use crate::events::{
    NodeFinishedEvent, NodeStartedEvent, TextChunkEvent, TtsMessageEvent, WorkflowEvent,
    WorkflowEventKind, WorkflowFinishedEvent, WorkflowStartedEvent,
};
use crate::stream::{StreamOptions, StreamSession};

/// Handler for the body of a streaming `/workflows/run` call.
///
/// Workflow streams carry no `error` event; a failed run is reported
/// through `workflow_finished` with a failed status.
#[derive(Debug)]
pub struct WorkflowStreamHandler {
    session: StreamSession<WorkflowEvent>,
}

impl WorkflowStreamHandler {
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

    pub fn on_workflow_started<F>(&self, callback: F) -> &Self
    where
        F: Fn(&WorkflowStartedEvent) + Send + Sync + 'static,
    {
        self.session.register(WorkflowEventKind::WorkflowStarted, move |event| {
            if let WorkflowEvent::WorkflowStarted(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_node_started<F>(&self, callback: F) -> &Self
    where
        F: Fn(&NodeStartedEvent) + Send + Sync + 'static,
    {
        self.session.register(WorkflowEventKind::NodeStarted, move |event| {
            if let WorkflowEvent::NodeStarted(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_node_finished<F>(&self, callback: F) -> &Self
    where
        F: Fn(&NodeFinishedEvent) + Send + Sync + 'static,
    {
        self.session.register(WorkflowEventKind::NodeFinished, move |event| {
            if let WorkflowEvent::NodeFinished(payload) = event {
                callback(payload);
            }
        });
        self
    }

    /// Streamed output text of an answer or LLM node.
    pub fn on_text_chunk<F>(&self, callback: F) -> &Self
    where
        F: Fn(&TextChunkEvent) + Send + Sync + 'static,
    {
        self.session.register(WorkflowEventKind::TextChunk, move |event| {
            if let WorkflowEvent::TextChunk(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_workflow_finished<F>(&self, callback: F) -> &Self
    where
        F: Fn(&WorkflowFinishedEvent) + Send + Sync + 'static,
    {
        self.session.register(WorkflowEventKind::WorkflowFinished, move |event| {
            if let WorkflowEvent::WorkflowFinished(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_tts_message<F>(&self, callback: F) -> &Self
    where
        F: Fn(&TtsMessageEvent) + Send + Sync + 'static,
    {
        self.session.register(WorkflowEventKind::TtsMessage, move |event| {
            if let WorkflowEvent::TtsMessage(payload) = event {
                callback(payload);
            }
        });
        self
    }

    pub fn on_tts_message_end<F>(&self, callback: F) -> &Self
    where
        F: Fn(&TtsMessageEvent) + Send + Sync + 'static,
    {
        self.session.register(WorkflowEventKind::TtsMessageEnd, move |event| {
            if let WorkflowEvent::TtsMessageEnd(payload) = event {
                callback(payload);
            }
        });
        self
    }
}

impl StreamControl for WorkflowStreamHandler {
    type Event = WorkflowEvent;

    fn session(&self) -> &StreamSession<WorkflowEvent> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RunStatus;
    use crate::stream::StreamOutcome;
    use bytes::Bytes;
    use futures::stream;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_workflow_run_sequence() {
        let body = concat!(
            "data: {\"event\":\"workflow_started\",\"task_id\":\"t1\",\"workflow_run_id\":\"r1\",\"data\":{\"id\":\"r1\",\"workflow_id\":\"w1\",\"sequence_number\":1,\"created_at\":1}}\n\n",
            "data: {\"event\":\"node_started\",\"task_id\":\"t1\",\"workflow_run_id\":\"r1\",\"data\":{\"id\":\"n1\",\"node_id\":\"llm\",\"node_type\":\"llm\",\"title\":\"LLM\",\"index\":1,\"created_at\":1}}\n\n",
            "data: {\"event\":\"text_chunk\",\"task_id\":\"t1\",\"workflow_run_id\":\"r1\",\"data\":{\"text\":\"Hi\",\"from_variable_selector\":[\"llm\",\"text\"]}}\n\n",
            "data: {\"event\":\"node_finished\",\"task_id\":\"t1\",\"workflow_run_id\":\"r1\",\"data\":{\"id\":\"n1\",\"node_id\":\"llm\",\"node_type\":\"llm\",\"title\":\"LLM\",\"index\":1,\"status\":\"succeeded\",\"execution_metadata\":null,\"created_at\":2}}\n\n",
            "data: {\"event\":\"workflow_finished\",\"task_id\":\"t1\",\"workflow_run_id\":\"r1\",\"data\":{\"id\":\"r1\",\"workflow_id\":\"w1\",\"status\":\"succeeded\",\"total_steps\":\"2\",\"created_at\":1,\"finished_at\":3}}\n\n",
        );
        let chunks: Vec<Result<Bytes, Infallible>> = vec![Ok(Bytes::from(body))];
        let handler = WorkflowStreamHandler::new(stream::iter(chunks));

        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c, d, e) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
        handler
            .on_workflow_started(move |ev| a.lock().unwrap().push(format!("started:{}", ev.data.workflow_id)))
            .on_node_started(move |ev| b.lock().unwrap().push(format!("node:{}", ev.data.node_id)))
            .on_text_chunk(move |ev| c.lock().unwrap().push(format!("text:{}", ev.data.text)))
            .on_node_finished(move |ev| d.lock().unwrap().push(format!("done:{}", ev.data.status.as_str())))
            .on_workflow_finished(move |ev| {
                assert_eq!(ev.data.status, RunStatus::Succeeded);
                e.lock().unwrap().push(format!("finished:{}", ev.data.total_steps));
            });

        assert_eq!(handler.wait_for_completion().await, Ok(StreamOutcome::Finished));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["started:w1", "node:llm", "text:Hi", "done:succeeded", "finished:2"]
        );
    }

    #[tokio::test]
    async fn test_chat_tags_are_not_workflow_events() {
        let body = "data: {\"event\":\"message\",\"task_id\":\"t1\",\"message_id\":\"m1\",\"answer\":\"hi\"}\n\n";
        let chunks: Vec<Result<Bytes, Infallible>> = vec![Ok(Bytes::from(body))];
        let handler = WorkflowStreamHandler::new(stream::iter(chunks));

        let seen = Arc::new(Mutex::new(0usize));
        let seen_clone = seen.clone();
        handler.on_event(move |_| *seen_clone.lock().unwrap() += 1);

        handler.wait_for_completion().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
