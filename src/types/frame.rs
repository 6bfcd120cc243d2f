//! Decoded protocol frames

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{Address, MessageKind};

/// A decoded, validated protocol frame.
///
/// This is the fundamental data unit that flows through the system: the
/// decoder produces them one at a time and the topology state machine folds
/// each into the graph. A `Frame` is only ever constructed with a valid
/// [`MessageKind`]; invalid type bytes never get this far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Message kind from the leading type byte
    pub kind: MessageKind,

    /// Sending node
    pub source: Address,

    /// Addressed node
    pub destination: Address,

    /// Single payload byte, present exactly when [`MessageKind::has_payload`]
    pub payload: Option<u8>,

    /// Capture time, assigned by the decoder when the frame completes
    pub timestamp: DateTime<Local>,
}

impl Frame {
    /// Render the fixed-format event line for this frame.
    ///
    /// The format is stable because downstream log scrapers depend on it:
    /// `<time> <KIND>: sent from 0x<src> to 0x<dest> with payload = <n>`
    /// with an absent payload printed as `0`, matching the firmware's own
    /// monitor output.
    pub fn log_line(&self) -> String {
        format!(
            "{} {}: sent from 0x{} to 0x{} with payload = {}",
            self.timestamp.format("%Y-%m-%d-%H:%M:%S"),
            self.kind,
            self.source,
            self.destination,
            self.payload.unwrap_or(0),
        )
    }
}
