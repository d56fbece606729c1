//! dify-stream - streaming client for the Dify app API
//!
//! Turns the `text/event-stream` body of a chat, workflow or completion
//! call into typed events delivered to registered callbacks, with a
//! single well-defined end (finished, errored, timed out or stopped).
//!
//! ```ignore
//! use dify_stream::prelude::*;
//!
//! let client = DifyClient::from_env()?;
//! let handler = client
//!     .chat_stream(&ChatMessageParams::new("Hello", "user-1"))
//!     .await?;
//! handler
//!     .on_message(|m| print!("{}", m.answer))
//!     .on_error(|e| eprintln!("{}", e));
//! handler.wait_for_completion().await?;
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod handler;
pub mod prelude;
pub mod sse;
pub mod stream;
