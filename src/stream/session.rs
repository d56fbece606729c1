//! Stream session lifecycle.
//!
//! A session owns one byte stream and drives it from a single tokio task:
//! chunks go through the [`FrameExtractor`], frames through the decoder,
//! events through the [`HandlerRegistry`]. Every chunk is processed to
//! completion before the next one is polled.
//!
//! The task is spawned at construction but does not poll the stream until
//! the session is started, by `start()`, by `completion()` or by dropping
//! the session. Callbacks registered before that see every event, on any
//! runtime flavor. The timeout is armed at construction.
//!
//! The session leaves `Active` exactly once. The terminal state lives in a
//! `watch` channel and every path (end of stream, transport error,
//! timeout, `stop()`) goes through the same compare-and-set, so the first
//! one wins and the rest are no-ops. The driver task watches that channel;
//! once it flips, the task exits and drops the stream and the timer.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::{FutureExt, Stream, StreamExt};
use tokio::sync::{watch, Notify};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use super::registry::HandlerRegistry;
use crate::error::StreamError;
use crate::events::StreamEvent;
use crate::sse::{decode_payload, Decoded, Frame, FrameExtractor};

/// Callback invoked with the terminal error of a session.
pub type ErrorCallback = Arc<dyn Fn(&StreamError) + Send + Sync>;

/// Callback invoked when a session completes cleanly.
pub type FinishCallback = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// End of stream reached without error.
    Completed,
    /// Transport error or timeout.
    Errored(StreamError),
    /// `stop()` was called before natural termination.
    Stopped,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Completed => "completed",
            SessionState::Errored(_) => "errored",
            SessionState::Stopped => "stopped",
        }
    }
}

/// Successful settlement of [`StreamSession::completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The stream ended and `on_finished` callbacks ran.
    Finished,
    /// The caller stopped the stream; neither `on_finished` nor
    /// `on_error` callbacks ran.
    Stopped,
}

/// Per-session settings.
#[derive(Clone)]
pub struct StreamOptions {
    /// Overall deadline for the stream. `None` or zero disables it.
    pub timeout: Option<Duration>,
    /// Where malformed and unknown frames are reported.
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            diagnostics: Arc::new(TracingSink),
        }
    }
}

impl fmt::Debug for StreamOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamOptions")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Arc::new(sink);
        self
    }

    fn armed_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|d| !d.is_zero())
    }
}

/// Generic streaming engine behind the protocol facades.
pub struct StreamSession<E: StreamEvent> {
    shared: Arc<Shared<E>>,
}

impl<E: StreamEvent> StreamSession<E> {
    /// Spawn the driver task for `stream`, held until [`start`](Self::start).
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn<S, B, Err>(stream: S, options: StreamOptions) -> Self
    where
        S: Stream<Item = Result<B, Err>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        Err: fmt::Display + Send + 'static,
    {
        let (state, _) = watch::channel(SessionState::Active);
        let shared = Arc::new(Shared {
            state,
            registry: Mutex::new(HandlerRegistry::new()),
            error_handlers: Mutex::new(Vec::new()),
            finish_handlers: Mutex::new(Vec::new()),
            diagnostics: options.diagnostics.clone(),
            start: Notify::new(),
        });

        let timeout = options
            .armed_timeout()
            .map(|duration| (duration, Instant::now() + duration));
        debug!(flavor = E::FLAVOR, ?timeout, "Stream session created");

        let driver = shared.clone();
        tokio::spawn(async move {
            let run = AssertUnwindSafe(drive(driver.clone(), stream, timeout)).catch_unwind();
            if run.await.is_err() {
                driver.fail(StreamError::transport("stream callback panicked"));
            }
        });

        Self { shared }
    }

    /// Register a callback for one event tag.
    pub fn register<F>(&self, kind: E::Kind, callback: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        lock(&self.shared.registry).register(kind, Arc::new(callback));
    }

    /// Register a callback for every event of the flavor.
    pub fn register_any<F>(&self, callback: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        lock(&self.shared.registry).register_any(Arc::new(callback));
    }

    pub fn add_error_handler<F>(&self, callback: F)
    where
        F: Fn(&StreamError) + Send + Sync + 'static,
    {
        lock(&self.shared.error_handlers).push(Arc::new(callback));
    }

    pub fn add_finish_handler<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        lock(&self.shared.finish_handlers).push(Arc::new(callback));
    }

    /// Let the driver start reading the stream. Idempotent.
    ///
    /// Register callbacks first; events read before a callback is
    /// registered are not replayed to it.
    pub fn start(&self) {
        self.shared.start.notify_one();
    }

    /// Force termination. Idempotent; a no-op once the session is terminal.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// A handle that can stop the session without keeping it alive.
    ///
    /// Use this inside callbacks: capturing the session itself in one of
    /// its own callbacks creates a reference cycle.
    pub fn stop_handle(&self) -> StopHandle {
        let weak: Weak<Shared<E>> = Arc::downgrade(&self.shared);
        StopHandle { target: weak }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }

    /// Start the session and return a future that settles once, when the
    /// session leaves `Active`.
    ///
    /// Resolves `Ok(Finished)` where `on_finished` fires, `Err` where
    /// `on_error` fires, and `Ok(Stopped)` after `stop()`. Any number of
    /// these futures may be created; all observe the same terminal state.
    pub fn completion(&self) -> BoxFuture<'static, Result<StreamOutcome, StreamError>> {
        let rx = self.shared.state.subscribe();
        self.start();
        settled(rx).boxed()
    }
}

impl<E: StreamEvent> Drop for StreamSession<E> {
    fn drop(&mut self) {
        // An unstarted driver would otherwise hold the stream forever.
        self.start();
    }
}

impl<E: StreamEvent> fmt::Debug for StreamSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("flavor", &E::FLAVOR)
            .field("state", &*self.shared.state.borrow())
            .finish()
    }
}

/// Weak handle for stopping a session from inside its own callbacks.
#[derive(Clone)]
pub struct StopHandle {
    target: Weak<dyn Terminate>,
}

impl StopHandle {
    /// Same as the session's `stop()`. Does nothing if the session is gone.
    pub fn stop(&self) {
        if let Some(target) = self.target.upgrade() {
            target.stop();
        }
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle").finish_non_exhaustive()
    }
}

trait Terminate: Send + Sync {
    fn stop(&self);
}

struct Shared<E: StreamEvent> {
    state: watch::Sender<SessionState>,
    registry: Mutex<HandlerRegistry<E>>,
    error_handlers: Mutex<Vec<ErrorCallback>>,
    finish_handlers: Mutex<Vec<FinishCallback>>,
    diagnostics: Arc<dyn DiagnosticSink>,
    start: Notify,
}

impl<E: StreamEvent> Terminate for Shared<E> {
    fn stop(&self) {
        if self.transition(SessionState::Stopped) {
            debug!(flavor = E::FLAVOR, "Stream session stopped");
        }
    }
}

impl<E: StreamEvent> Shared<E> {
    fn is_active(&self) -> bool {
        self.state.borrow().is_active()
    }

    /// Leave `Active`. Returns false if the session was already terminal.
    fn transition(&self, next: SessionState) -> bool {
        self.state.send_if_modified(move |state| {
            if state.is_terminal() {
                return false;
            }
            *state = next;
            true
        })
    }

    fn complete(&self) {
        if !self.transition(SessionState::Completed) {
            return;
        }
        debug!(flavor = E::FLAVOR, "Stream session completed");
        let handlers = lock(&self.finish_handlers).clone();
        for handler in handlers {
            handler();
        }
    }

    fn fail(&self, err: StreamError) {
        if !self.transition(SessionState::Errored(err.clone())) {
            return;
        }
        warn!(flavor = E::FLAVOR, code = err.error_code(), error = %err, "Stream session failed");
        let handlers = lock(&self.error_handlers).clone();
        for handler in handlers {
            handler(&err);
        }
    }

    fn handle_frame(&self, frame: &Frame) {
        match decode_payload::<E>(&frame.payload) {
            Decoded::Heartbeat => trace!(flavor = E::FLAVOR, "Heartbeat"),
            Decoded::Event(event) => self.dispatch(&event),
            Decoded::Unknown { tag } => self.diagnostics.report(&Diagnostic::UnknownEvent {
                flavor: E::FLAVOR,
                tag,
            }),
            Decoded::Malformed { error } => {
                self.diagnostics.report(&Diagnostic::MalformedPayload {
                    flavor: E::FLAVOR,
                    payload: frame.payload.clone(),
                    error,
                })
            }
        }
    }

    fn dispatch(&self, event: &E) {
        // Snapshot so callbacks may register more callbacks or stop the session.
        let callbacks = lock(&self.registry).callbacks_for(event);
        HandlerRegistry::run_while(&callbacks, event, || self.is_active());
    }

    fn handle_chunk(&self, frames: &mut FrameExtractor, chunk: &[u8]) {
        for frame in frames.push(chunk) {
            if !self.is_active() {
                return;
            }
            self.handle_frame(&frame);
        }
    }

    fn handle_end(&self, frames: &mut FrameExtractor) {
        if let Some(frame) = frames.finish() {
            self.handle_frame(&frame);
        }
        self.complete();
    }
}

async fn drive<E, S, B, Err>(
    shared: Arc<Shared<E>>,
    stream: S,
    timeout: Option<(Duration, Instant)>,
) where
    E: StreamEvent,
    S: Stream<Item = Result<B, Err>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    Err: fmt::Display + Send + 'static,
{
    let mut stream = Box::pin(stream);
    let mut frames = FrameExtractor::new();
    let mut state_rx = shared.state.subscribe();

    let mut started = false;

    let timer = deadline(timeout.map(|(_, at)| at));
    tokio::pin!(timer);

    loop {
        tokio::select! {
            biased;

            _ = terminated(&mut state_rx) => break,

            _ = &mut timer => {
                if let Some((duration, _)) = timeout {
                    shared.fail(StreamError::Timeout { duration });
                }
                break;
            }

            _ = shared.start.notified(), if !started => {
                started = true;
                trace!(flavor = E::FLAVOR, "Stream session started");
            }

            item = stream.next(), if started => match item {
                Some(Ok(chunk)) => shared.handle_chunk(&mut frames, chunk.as_ref()),
                Some(Err(e)) => {
                    shared.fail(StreamError::transport(e));
                    break;
                }
                None => {
                    shared.handle_end(&mut frames);
                    break;
                }
            },
        }
    }

    drop(stream);
    trace!(
        flavor = E::FLAVOR,
        state = shared.state.borrow().as_str(),
        unconsumed = frames.buffered().len(),
        "Stream transport released"
    );
}

fn deadline(at: Option<Instant>) -> impl Future<Output = ()> {
    async move {
        match at {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    }
}

/// Resolves once the watched state is terminal (or the sender is gone).
async fn terminated(rx: &mut watch::Receiver<SessionState>) {
    loop {
        let done = rx.borrow_and_update().is_terminal();
        if done || rx.changed().await.is_err() {
            return;
        }
    }
}

async fn settled(mut rx: watch::Receiver<SessionState>) -> Result<StreamOutcome, StreamError> {
    loop {
        let state = rx.borrow_and_update().clone();
        match state {
            SessionState::Active => {}
            SessionState::Completed => return Ok(StreamOutcome::Finished),
            SessionState::Stopped => return Ok(StreamOutcome::Stopped),
            SessionState::Errored(err) => return Err(err),
        }
        if rx.changed().await.is_err() {
            return Err(StreamError::transport(
                "stream session dropped before reaching a terminal state",
            ));
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
