//! Diagnostic channel for recoverable stream anomalies.
//!
//! Malformed payloads and unknown tags never end a session. They are
//! reported here so callers can log, count, or salvage them.

use tracing::{debug, warn};

/// A recoverable anomaly observed while decoding a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Frame payload was not valid JSON or did not fit its tag's shape.
    /// The frame was dropped.
    MalformedPayload {
        flavor: &'static str,
        payload: String,
        error: String,
    },
    /// Frame carried a tag outside the flavor's set (or none at all).
    UnknownEvent {
        flavor: &'static str,
        tag: Option<String>,
    },
}

/// Receiver of [`Diagnostic`]s.
///
/// Called synchronously from the session task; keep it cheap.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Default sink: forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::MalformedPayload {
                flavor,
                payload,
                error,
            } => {
                warn!(flavor, %error, payload_len = payload.len(), "Dropping malformed stream frame");
            }
            Diagnostic::UnknownEvent { flavor, tag } => {
                debug!(flavor, tag = ?tag, "Ignoring unrecognized stream event");
            }
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let sink = move |d: &Diagnostic| seen_clone.lock().unwrap().push(d.clone());

        let diagnostic = Diagnostic::UnknownEvent {
            flavor: "chat",
            tag: Some("agent_thought".to_string()),
        };
        sink.report(&diagnostic);

        assert_eq!(*seen.lock().unwrap(), vec![diagnostic]);
    }

    #[test]
    fn test_builtin_sinks_accept_all_variants() {
        let diagnostics = [
            Diagnostic::MalformedPayload {
                flavor: "chat",
                payload: "{".to_string(),
                error: "EOF while parsing".to_string(),
            },
            Diagnostic::UnknownEvent {
                flavor: "workflow",
                tag: None,
            },
        ];
        for d in &diagnostics {
            TracingSink.report(d);
            NoopSink.report(d);
        }
    }
}
