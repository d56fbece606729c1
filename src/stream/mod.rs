//! Streaming engine shared by all protocol flavors.
//!
//! # Module structure
//! - `session` - Lifecycle state machine and the task that drives a stream
//! - `registry` - Per-tag callback lists
//! - `diagnostics` - Reporting of malformed and unknown frames

mod diagnostics;
mod registry;
mod session;

pub use diagnostics::{Diagnostic, DiagnosticSink, NoopSink, TracingSink};
pub use registry::{EventCallback, HandlerRegistry};
pub use session::{
    ErrorCallback, FinishCallback, SessionState, StopHandle, StreamOptions, StreamOutcome,
    StreamSession,
};
