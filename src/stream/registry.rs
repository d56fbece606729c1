//! Per-tag callback registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::events::StreamEvent;

/// Callback invoked with a decoded event.
pub type EventCallback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered callbacks per event tag, plus catch-all callbacks.
///
/// Push-only: a callback registered after some events were dispatched
/// only sees later events.
pub struct HandlerRegistry<E: StreamEvent> {
    handlers: HashMap<E::Kind, Vec<EventCallback<E>>>,
    catch_all: Vec<EventCallback<E>>,
}

impl<E: StreamEvent> HandlerRegistry<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            catch_all: Vec::new(),
        }
    }

    /// Append a callback for one tag.
    pub fn register(&mut self, kind: E::Kind, callback: EventCallback<E>) {
        self.handlers.entry(kind).or_default().push(callback);
    }

    /// Append a callback that receives every event.
    pub fn register_any(&mut self, callback: EventCallback<E>) {
        self.catch_all.push(callback);
    }

    /// Callbacks for `event` in invocation order: catch-all first, then
    /// the tag's own list, each in registration order.
    pub fn callbacks_for(&self, event: &E) -> Vec<EventCallback<E>> {
        let tagged = self.handlers.get(&event.kind());
        self.catch_all
            .iter()
            .chain(tagged.into_iter().flatten())
            .cloned()
            .collect()
    }

    #[cfg(test)]
    fn dispatch(&self, event: &E) -> usize {
        Self::run_while(&self.callbacks_for(event), event, || true)
    }

    /// Invoke `callbacks` in order, checking `is_live` before each one.
    ///
    /// Stops at the first `false` and returns how many callbacks ran. Takes
    /// a snapshot from [`callbacks_for`](Self::callbacks_for) so callbacks
    /// can run without the registry borrowed.
    pub fn run_while(
        callbacks: &[EventCallback<E>],
        event: &E,
        is_live: impl Fn() -> bool,
    ) -> usize {
        let mut ran = 0;
        for callback in callbacks {
            if !is_live() {
                break;
            }
            callback(event);
            ran += 1;
        }
        ran
    }
}

impl<E: StreamEvent> Default for HandlerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
