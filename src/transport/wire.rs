//! Length-prefixed JSON framing for slot payloads.
//!
//! Frame layout: 4 bytes little-endian body length, then the JSON body.
//! Both directions use the same framing; only the body type differs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::transport::{PAYLOAD_CAPACITY, TransportError};
use crate::world::Command;

/// Length of the frame prefix, in bytes.
const PREFIX_LEN: usize = 4;

/// What an agent sends back each turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentReply {
    /// Commands for this turn, applied in order.
    pub commands: Vec<Command>,
    /// Compute units the agent reports having spent this turn. Counted
    /// against the per-turn and per-game ceilings.
    pub units_used: u64,
}

/// Encode a value into a length-prefixed frame.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, TransportError> {
    let body = serde_json::to_vec(value).map_err(|e| TransportError::Codec(e.to_string()))?;
    let len = u32::try_from(body.len()).map_err(|_| TransportError::PayloadTooLarge {
        len: body.len(),
        capacity: PAYLOAD_CAPACITY,
    })?;

    let mut frame = Vec::with_capacity(PREFIX_LEN + body.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a length-prefixed frame.
pub(crate) fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T, TransportError> {
    let prefix: [u8; PREFIX_LEN] = frame
        .get(..PREFIX_LEN)
        .and_then(|p| p.try_into().ok())
        .ok_or_else(|| TransportError::Codec("truncated frame prefix".to_string()))?;
    #[allow(clippy::cast_possible_truncation)]
    let len = u32::from_le_bytes(prefix) as usize;

    let body = frame
        .get(PREFIX_LEN..PREFIX_LEN + len)
        .ok_or_else(|| TransportError::Codec("length prefix exceeds frame".to_string()))?;
    serde_json::from_slice(body).map_err(|e| TransportError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_roundtrip() {
        let reply = AgentReply {
            commands: vec![Command::BuildTower {
                position: crate::world::Coord::new(3, 4),
            }],
            units_used: 12_345,
        };

        let frame = encode(&reply).expect("encode");
        let back: AgentReply = decode(&frame).expect("decode");
        assert_eq!(back.commands, reply.commands);
        assert_eq!(back.units_used, reply.units_used);
    }

    #[test]
    fn test_prefix_matches_body_length() {
        let frame = encode(&AgentReply::default()).expect("encode");
        let mut prefix = [0u8; 4];
        prefix.copy_from_slice(&frame[..4]);
        assert_eq!(u32::from_le_bytes(prefix) as usize, frame.len() - 4);
    }

    #[test]
    fn test_truncated_frame_rejected() {
        let err = decode::<AgentReply>(&[1, 0]);
        assert!(matches!(err, Err(TransportError::Codec(_))));
    }

    #[test]
    fn test_lying_prefix_rejected() {
        let mut frame = encode(&AgentReply::default()).expect("encode");
        // Claim a longer body than the frame carries.
        frame[0] = frame[0].wrapping_add(10);
        let err = decode::<AgentReply>(&frame);
        assert!(matches!(err, Err(TransportError::Codec(_))));
    }

    #[test]
    fn test_trailing_garbage_ignored() {
        let mut frame = encode(&AgentReply::default()).expect("encode");
        frame.extend_from_slice(b"junk past the prefixed length");
        let back: AgentReply = decode(&frame).expect("decode");
        assert!(back.commands.is_empty());
    }
}
