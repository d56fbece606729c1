//! Typed stream events.
//!
//! Each protocol flavor (chat, workflow, completion) defines a closed set
//! of event tags. The flavor is modelled as a tagged union deserialized on
//! the `event` discriminant, paired with a plain tag enumeration used as
//! the handler registry key.
//!
//! # Module structure
//! - `payloads` - Payload structs shared between flavors
//! - `chat` / `workflow` / `completion` - Flavor unions and their tag sets

mod chat;
mod completion;
mod payloads;
mod workflow;

use std::fmt::Debug;
use std::hash::Hash;

use serde::de::DeserializeOwned;

pub use chat::{ChatEvent, ChatEventKind};
pub use completion::{CompletionEvent, CompletionEventKind};
pub use payloads::{
    ErrorEvent, ExecutionMetadata, JsonObject, MessageEndEvent, MessageEndMetadata, MessageEvent,
    MessageFileEvent, MessageReplaceEvent, NodeFinishedData, NodeFinishedEvent, NodeStartedData,
    NodeStartedEvent, RetrieverResource, RunStatus, TextChunkData, TextChunkEvent,
    TtsMessageEvent, Usage, WorkflowFinishedData, WorkflowFinishedEvent, WorkflowStartedData,
    WorkflowStartedEvent,
};
pub use workflow::{WorkflowEvent, WorkflowEventKind};

/// Name of the JSON field carrying the event tag.
pub const DISCRIMINANT_FIELD: &str = "event";

/// Closed set of event tags for one protocol flavor.
pub trait EventKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every tag of the flavor.
    const ALL: &'static [Self];

    /// Wire name of the tag.
    fn as_str(self) -> &'static str;

    /// Look up a wire tag; `None` for tags outside the flavor.
    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == tag)
    }
}

/// A decoded event of one protocol flavor.
pub trait StreamEvent: DeserializeOwned + Debug + Send + Sync + 'static {
    type Kind: EventKind;

    /// Short flavor name used in log output.
    const FLAVOR: &'static str;

    fn kind(&self) -> Self::Kind;
}
