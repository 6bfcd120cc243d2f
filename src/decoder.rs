//! Stateful frame decoder for the undelimited gateway stream
//!
//! The gateway relays every mesh frame it overhears as raw bytes with no
//! delimiters, length prefix or checksum. Synchronization rests entirely on
//! the leading type byte implying the layout of the rest of the frame
//! (see [`MessageKind::wire_len`]).
//!
//! ## Decoding discipline
//!
//! - Between frames the decoder never blocks: it probes
//!   [`ByteSource::bytes_available`] and reports [`DecodeOutcome::Pending`]
//!   when the stream is idle.
//! - An out-of-range type byte consumes exactly that one byte and yields
//!   [`DecodeOutcome::Discarded`]; no resynchronization heuristics beyond
//!   that. The assumption is a well-formed frame sequence from the gateway.
//! - Once a type byte is accepted, the remaining header/payload reads are
//!   awaited, but each is bounded by the per-frame read timeout. A stall
//!   surfaces as [`MonitorError::FrameTimeout`] and truncation as
//!   [`MonitorError::Truncated`]; both are fatal for the stream, never
//!   silently hung on and never surfaced as a malformed frame.

use std::time::Duration;

use chrono::Local;
use tracing::{trace, warn};

use crate::source::ByteSource;
use crate::types::{Address, Frame, MessageKind};
use crate::{MonitorError, Result};

/// Outcome of a single decode attempt.
///
/// Modeled as a tagged result so call sites handle every case exhaustively;
/// stream-level failures travel separately through `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// A complete, validated frame
    Frame(Frame),

    /// No byte available yet; not an error, poll again later
    Pending,

    /// The consumed byte was not a valid type byte; nothing else was read
    Discarded {
        /// The offending byte, for diagnostics
        byte: u8,
    },
}

/// Decoder for the gateway's frame stream.
///
/// Stateless between frames apart from configuration; one instance is owned
/// by the driver task alongside the byte source it reads.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    read_timeout: Duration,
}

impl FrameDecoder {
    /// Default bound on each read inside an in-progress frame.
    ///
    /// At the gateway's 9600 baud a whole frame arrives in a few
    /// milliseconds, so a second of silence mid-frame means the stream is
    /// wedged, not slow.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

    /// Create a decoder with the default per-frame read timeout.
    pub fn new() -> Self {
        Self { read_timeout: Self::DEFAULT_READ_TIMEOUT }
    }

    /// Create a decoder with a custom per-frame read timeout.
    pub fn with_read_timeout(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }

    /// Attempt to decode the next frame from `source`.
    ///
    /// Returns:
    /// - `Ok(DecodeOutcome::Frame(_))` - a frame completed; its timestamp is
    ///   the wall-clock moment of completion
    /// - `Ok(DecodeOutcome::Pending)` - stream idle, nothing consumed
    /// - `Ok(DecodeOutcome::Discarded { .. })` - one invalid byte consumed
    /// - `Err(_)` - stream-level failure (I/O, truncation, mid-frame stall)
    pub async fn try_decode<S: ByteSource>(&self, source: &mut S) -> Result<DecodeOutcome> {
        if source.bytes_available()? == 0 {
            return Ok(DecodeOutcome::Pending);
        }

        let mut type_byte = [0u8; 1];
        source.read_exact(&mut type_byte).await?;

        let Some(kind) = MessageKind::from_byte(type_byte[0]) else {
            warn!("Unknown message type: {}. Discarded", type_byte[0]);
            return Ok(DecodeOutcome::Discarded { byte: type_byte[0] });
        };

        // Type byte accepted: the rest of the frame is read to completion,
        // each read bounded by the configured timeout.
        let mut header = [0u8; 4];
        self.read_bounded(source, &mut header, "address header").await?;
        let src = Address::from_be_bytes([header[0], header[1]]);
        let dest = Address::from_be_bytes([header[2], header[3]]);

        let payload = if kind.has_payload() {
            let mut byte = [0u8; 1];
            self.read_bounded(source, &mut byte, "payload").await?;
            Some(byte[0])
        } else {
            None
        };

        trace!("Decoded {} frame 0x{} -> 0x{}", kind, src, dest);

        Ok(DecodeOutcome::Frame(Frame {
            kind,
            source: src,
            destination: dest,
            payload,
            timestamp: Local::now(),
        }))
    }

    /// In-frame read with the per-frame timeout applied.
    async fn read_bounded<S: ByteSource>(
        &self,
        source: &mut S,
        buf: &mut [u8],
        context: &str,
    ) -> Result<()> {
        match tokio::time::timeout(self.read_timeout, source.read_exact(buf)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Read of {} stalled for {:?}", context, self.read_timeout);
                Err(MonitorError::FrameTimeout { duration: self.read_timeout })
            }
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySource;

    #[tokio::test]
    async fn empty_source_is_pending_not_error() {
        let mut source = MemorySource::new(vec![]);
        let decoder = FrameDecoder::new();
        assert_eq!(decoder.try_decode(&mut source).await.unwrap(), DecodeOutcome::Pending);
        // Polling again is harmless
        assert_eq!(decoder.try_decode(&mut source).await.unwrap(), DecodeOutcome::Pending);
    }

    #[tokio::test]
    async fn each_kind_consumes_exactly_its_wire_length() {
        let decoder = FrameDecoder::new();
        for kind in MessageKind::ALL {
            let mut bytes = vec![kind.wire_value(), 0x00, 0x01, 0x90, 0x01];
            if kind.has_payload() {
                bytes.push(0x2A);
            }
            // Trailing byte that must not be touched
            bytes.push(0xEE);

            let mut source = MemorySource::new(bytes);
            let outcome = decoder.try_decode(&mut source).await.unwrap();
            let DecodeOutcome::Frame(frame) = outcome else {
                panic!("{kind} should decode to a frame");
            };
            assert_eq!(frame.kind, kind);
            assert_eq!(frame.source, Address(0x0001));
            assert_eq!(frame.destination, Address(0x9001));
            assert_eq!(frame.payload, kind.has_payload().then_some(0x2A));
            assert_eq!(source.remaining(), 1, "{kind} must leave the trailing byte");
        }
    }

    #[tokio::test]
    async fn invalid_type_byte_consumes_exactly_one_byte() {
        let decoder = FrameDecoder::new();
        for bad in [0u8, 9, 0x7F, 0xFF] {
            let mut source = MemorySource::new(vec![bad, 0x01, 0x02]);
            let outcome = decoder.try_decode(&mut source).await.unwrap();
            assert_eq!(outcome, DecodeOutcome::Discarded { byte: bad });
            assert_eq!(source.remaining(), 2);
        }
    }

    #[tokio::test]
    async fn decoding_resumes_after_a_discarded_byte() {
        let decoder = FrameDecoder::new();
        let mut source = MemorySource::new(vec![0xAA, 0x01, 0x00, 0x02, 0x00, 0x00]);

        assert!(matches!(
            decoder.try_decode(&mut source).await.unwrap(),
            DecodeOutcome::Discarded { byte: 0xAA }
        ));
        let DecodeOutcome::Frame(frame) = decoder.try_decode(&mut source).await.unwrap() else {
            panic!("expected the JOIN frame after the garbage byte");
        };
        assert_eq!(frame.kind, MessageKind::Join);
        assert_eq!(frame.source, Address(0x0002));
    }

    #[tokio::test]
    async fn truncation_mid_frame_is_fatal() {
        let decoder = FrameDecoder::new();
        // JOIN_ACK claims 6 bytes but the stream ends after 3
        let mut source = MemorySource::new(vec![0x02, 0x00, 0x01]);
        let err = decoder.try_decode(&mut source).await.unwrap_err();
        assert!(matches!(err, MonitorError::Truncated { .. }), "got {err:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_frame_times_out() {
        let decoder = FrameDecoder::with_read_timeout(Duration::from_millis(100));
        // Type byte arrives, then the stream goes silent without ending
        let mut source = MemorySource::new(vec![0x01]).stalling();
        let err = decoder.try_decode(&mut source).await.unwrap_err();
        assert!(matches!(err, MonitorError::FrameTimeout { .. }), "got {err:?}");
    }
}
