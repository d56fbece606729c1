//! SSE (Server-Sent Events) wire handling
//!
//! Converts the raw body of a streaming response into typed events.
//! Wire format:
//! - `data: <json>` - one frame, terminated by a blank line
//! - `data: ping` / `ping` - heartbeat, never dispatched
//! - anything without the `data: ` prefix - ignored
//!
//! # Module structure
//! - `frame` - Byte buffering and blank-line framing (FrameExtractor)
//! - `decoder` - Payload decoding into a flavor's event union

mod decoder;
mod frame;

pub use decoder::{decode_payload, is_heartbeat, Decoded, HEARTBEAT_MARKERS};
pub use frame::{Frame, FrameExtractor, DATA_PREFIX, FRAME_DELIMITER};
