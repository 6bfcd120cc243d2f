//! Wire message kinds
//!
//! The mesh protocol tags every frame with a single leading type byte. The
//! layout that follows is implied entirely by that byte: a 4-byte address
//! header (source, destination) and, for most kinds, one trailing payload
//! byte. There are no delimiters, length fields or checksums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the type byte plus the source/destination header.
pub const HEADER_LEN: usize = 5;

/// A decoded frame type byte.
///
/// Valid wire values are 1 through 8 inclusive; anything else is discarded by
/// the decoder before a [`Frame`](super::Frame) is constructed, so a
/// `MessageKind` in hand is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    /// Beacon from a node looking for a parent
    Join = 1,
    /// A prospective parent acknowledging a join beacon
    JoinAck = 2,
    /// Child confirming its choice of parent; establishes a topology edge
    JoinCfm = 3,
    /// Liveness probe from child to parent
    CheckAlive = 4,
    /// Parent confirming it is still reachable
    ReplyAlive = 5,
    /// Gateway polling its subtree for data
    GatewayReq = 6,
    /// Node answering a gateway request
    NodeReply = 7,
    /// Debug-only multihop marker, seen in special firmware tests
    Multihop = 8,
}

impl MessageKind {
    /// Highest valid wire value.
    pub const MAX_WIRE_VALUE: u8 = MessageKind::Multihop as u8;

    /// All kinds in wire-value order.
    pub const ALL: [MessageKind; 8] = [
        MessageKind::Join,
        MessageKind::JoinAck,
        MessageKind::JoinCfm,
        MessageKind::CheckAlive,
        MessageKind::ReplyAlive,
        MessageKind::GatewayReq,
        MessageKind::NodeReply,
        MessageKind::Multihop,
    ];

    /// Map a raw type byte to a kind. `None` for anything outside 1..=8.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(MessageKind::Join),
            2 => Some(MessageKind::JoinAck),
            3 => Some(MessageKind::JoinCfm),
            4 => Some(MessageKind::CheckAlive),
            5 => Some(MessageKind::ReplyAlive),
            6 => Some(MessageKind::GatewayReq),
            7 => Some(MessageKind::NodeReply),
            8 => Some(MessageKind::Multihop),
            _ => None,
        }
    }

    /// The wire value of this kind.
    pub fn wire_value(self) -> u8 {
        self as u8
    }

    /// Whether frames of this kind carry the single trailing payload byte.
    ///
    /// Exactly three kinds do not: JOIN, REPLY_ALIVE and MULTIHOP.
    pub fn has_payload(self) -> bool {
        !matches!(self, MessageKind::Join | MessageKind::ReplyAlive | MessageKind::Multihop)
    }

    /// Total frame length on the wire, including the type byte.
    pub fn wire_len(self) -> usize {
        if self.has_payload() { HEADER_LEN + 1 } else { HEADER_LEN }
    }
}

impl fmt::Display for MessageKind {
    /// The firmware's log spelling, used verbatim in event lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Join => "MESSAGE_JOIN",
            MessageKind::JoinAck => "MESSAGE_JOIN_ACK",
            MessageKind::JoinCfm => "MESSAGE_JOIN_CFM",
            MessageKind::CheckAlive => "MESSAGE_CHECK_ALIVE",
            MessageKind::ReplyAlive => "MESSAGE_REPLY_ALIVE",
            MessageKind::GatewayReq => "MESSAGE_GATEWAY_REQ",
            MessageKind::NodeReply => "MESSAGE_NODE_REPLY",
            MessageKind::Multihop => "MESSAGE_MULTIHOP",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_round_trip() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::from_byte(kind.wire_value()), Some(kind));
        }
    }

    #[test]
    fn out_of_range_bytes_are_rejected() {
        assert_eq!(MessageKind::from_byte(0), None);
        assert_eq!(MessageKind::from_byte(9), None);
        assert_eq!(MessageKind::from_byte(0xFF), None);
    }

    #[test]
    fn payload_table_matches_protocol() {
        assert!(!MessageKind::Join.has_payload());
        assert!(MessageKind::JoinAck.has_payload());
        assert!(MessageKind::JoinCfm.has_payload());
        assert!(MessageKind::CheckAlive.has_payload());
        assert!(!MessageKind::ReplyAlive.has_payload());
        assert!(MessageKind::GatewayReq.has_payload());
        assert!(MessageKind::NodeReply.has_payload());
        assert!(!MessageKind::Multihop.has_payload());
    }

    #[test]
    fn frame_lengths_are_five_or_six() {
        for kind in MessageKind::ALL {
            let expected = if kind.has_payload() { 6 } else { 5 };
            assert_eq!(kind.wire_len(), expected, "{kind}");
        }
    }
}
