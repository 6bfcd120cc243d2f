//! Byte source trait for gateway streams

use crate::Result;

/// Trait for gateway byte streams
///
/// Sources abstract over where the raw frame bytes come from (serial port,
/// capture file, in-memory buffer). The contract mirrors how the decoder
/// consumes data: the first byte of a frame is only taken when
/// [`bytes_available`](ByteSource::bytes_available) says one is ready, so
/// polling never blocks between frames; once a frame is in progress,
/// [`read_exact`](ByteSource::read_exact) may await the remaining bytes.
#[async_trait::async_trait]
pub trait ByteSource: Send + 'static {
    /// Number of bytes that can be read right now without waiting.
    ///
    /// Returning `Ok(0)` is the normal idle outcome; the driver simply polls
    /// again on its next tick.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read exactly `buf.len()` bytes, waiting for them if necessary.
    ///
    /// Returns:
    /// - `Ok(())` - buffer completely filled
    /// - `Err(MonitorError::Truncated)` - the stream ended first
    /// - `Err(MonitorError::Stream)` - an I/O failure underneath
    ///
    /// Callers bound the wait themselves (the decoder wraps this in its
    /// per-frame read timeout), so implementations should just await.
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Human-readable identity of the source, for logs.
    fn description(&self) -> String;
}
