//! Common imports.
//!
//! ```ignore
//! use dify_stream::prelude::*;
//! ```

pub use crate::client::{
    ChatMessageParams, CompletionMessageParams, DifyClient, RunWorkflowParams, VisionFile,
};
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, ClientResult, StreamError};
pub use crate::events::{
    ChatEvent, ChatEventKind, CompletionEvent, CompletionEventKind, EventKind, StreamEvent,
    WorkflowEvent, WorkflowEventKind,
};
pub use crate::handler::{
    ChatStreamHandler, CompletionStreamHandler, StreamControl, WorkflowStreamHandler,
};
pub use crate::stream::{
    Diagnostic, DiagnosticSink, SessionState, StopHandle, StreamOptions, StreamOutcome,
};
