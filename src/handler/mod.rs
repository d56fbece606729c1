//! Protocol facades over [`StreamSession`].
//!
//! Each facade owns one session of its flavor and exposes one `on_*`
//! method per tag of that flavor. Registration methods take `&self` and
//! return `&Self`, so they chain. The stream is not read until
//! `start()` or `wait_for_completion()` is called:
//!
//! ```ignore
//! let handler = ChatStreamHandler::new(body);
//! handler
//!     .on_message(|m| print!("{}", m.answer))
//!     .on_message_end(|_| println!())
//!     .on_error(|e| eprintln!("{}", e));
//! handler.wait_for_completion().await?;
//! ```
//!
//! # Module structure
//! - `chat` - [`ChatStreamHandler`]
//! - `workflow` - [`WorkflowStreamHandler`]
//! - `completion` - [`CompletionStreamHandler`]

mod chat;
mod completion;
mod workflow;

use futures::future::BoxFuture;

use crate::error::StreamError;
use crate::events::StreamEvent;
use crate::stream::{SessionState, StopHandle, StreamOutcome, StreamSession};

pub use chat::ChatStreamHandler;
pub use completion::CompletionStreamHandler;
pub use workflow::WorkflowStreamHandler;

/// Operations common to every facade.
pub trait StreamControl {
    type Event: StreamEvent;

    /// The session driving this facade.
    fn session(&self) -> &StreamSession<Self::Event>;

    /// Receive every decoded event of the flavor, ahead of tag callbacks.
    fn on_event<F>(&self, callback: F) -> &Self
    where
        F: Fn(&Self::Event) + Send + Sync + 'static,
        Self: Sized,
    {
        self.session().register_any(callback);
        self
    }

    /// Transport errors and timeouts.
    fn on_error<F>(&self, callback: F) -> &Self
    where
        F: Fn(&StreamError) + Send + Sync + 'static,
        Self: Sized,
    {
        self.session().add_error_handler(callback);
        self
    }

    /// Clean end of stream.
    fn on_finished<F>(&self, callback: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
        Self: Sized,
    {
        self.session().add_finish_handler(callback);
        self
    }

    /// Begin reading the stream without waiting for it.
    fn start(&self) {
        self.session().start();
    }

    fn stop(&self) {
        self.session().stop();
    }

    fn stop_handle(&self) -> StopHandle {
        self.session().stop_handle()
    }

    fn state(&self) -> SessionState {
        self.session().state()
    }

    /// See [`StreamSession::completion`].
    fn wait_for_completion(&self) -> BoxFuture<'static, Result<StreamOutcome, StreamError>> {
        self.session().completion()
    }
}
