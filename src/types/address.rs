//! Mesh node addressing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric boundary above which an address denotes a gateway node.
///
/// This is a naming convention of the mesh firmware, not a separate address
/// space: `0x8000` itself is still a relay.
pub const GATEWAY_ADDR_THRESHOLD: u16 = 0x8000;

/// A 16-bit mesh node identifier.
///
/// Addresses travel big-endian on the wire and render as exactly four
/// uppercase hex digits everywhere (log lines, DOT export, map keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u16);

impl Address {
    /// Parse an address from its two big-endian wire bytes.
    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Address(u16::from_be_bytes(bytes))
    }

    /// Whether this address names a gateway node (strictly above `0x8000`).
    pub fn is_gateway(self) -> bool {
        self.0 > GATEWAY_ADDR_THRESHOLD
    }

    /// Classify this address for snapshot coloring.
    pub fn class(self) -> NodeClass {
        if self.is_gateway() { NodeClass::Gateway } else { NodeClass::Relay }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl From<u16> for Address {
    fn from(value: u16) -> Self {
        Address(value)
    }
}

/// Node classification, recomputed from the address on every snapshot
/// rather than stored in topology state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    /// Uplink to external infrastructure (address above `0x8000`)
    Gateway,
    /// Ordinary in-mesh node
    Relay,
}
