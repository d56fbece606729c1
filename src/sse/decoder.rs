//! Frame payload to typed event decoding.

use serde_json::Value;

use crate::events::{EventKind, StreamEvent, DISCRIMINANT_FIELD};

/// Literal keep-alive payloads. The second form appears when the upstream
/// double-prefixes its heartbeat frames.
pub const HEARTBEAT_MARKERS: [&str; 2] = ["ping", "data: ping"];

/// Result of decoding one frame payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<E> {
    /// Keep-alive frame; never dispatched.
    Heartbeat,
    /// A well-formed event of the flavor.
    Event(E),
    /// Valid JSON whose tag is missing or outside the flavor's tag set.
    Unknown { tag: Option<String> },
    /// Not JSON, or a known tag whose payload does not fit its shape.
    Malformed { error: String },
}

/// Check for a heartbeat payload.
pub fn is_heartbeat(payload: &str) -> bool {
    let payload = payload.trim_end();
    HEARTBEAT_MARKERS.iter().any(|marker| *marker == payload)
}

/// Decode a frame payload into an event of flavor `E`.
///
/// Unknown tags are filtered before typed deserialization so that a new
/// upstream event never shows up as a parse failure.
pub fn decode_payload<E: StreamEvent>(payload: &str) -> Decoded<E> {
    if is_heartbeat(payload) {
        return Decoded::Heartbeat;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            return Decoded::Malformed {
                error: e.to_string(),
            }
        }
    };

    let tag = match value.get(DISCRIMINANT_FIELD).and_then(Value::as_str) {
        Some(tag) => tag,
        None => return Decoded::Unknown { tag: None },
    };

    if E::Kind::from_tag(tag).is_none() {
        return Decoded::Unknown {
            tag: Some(tag.to_string()),
        };
    }

    match serde_json::from_value::<E>(value) {
        Ok(event) => Decoded::Event(event),
        Err(e) => Decoded::Malformed {
            error: e.to_string(),
        },
    }
}
