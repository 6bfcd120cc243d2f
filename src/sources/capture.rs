//! Capture file replay source
//!
//! Replays a raw capture of gateway output (the byte stream exactly as the
//! radio emitted it, no container format) through the same polling path live
//! traffic takes. Bytes are released on the wall clock at the gateway's
//! serial rate, so a replayed capture exercises the decoder's idle/pending
//! handling the way a real port does instead of arriving in one burst.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use meshdeck::sources::CaptureSource;
//!
//! fn open_capture() -> meshdeck::Result<()> {
//!     let mut source = CaptureSource::open("mesh-session.bin")?;
//!     source.set_speed(4.0); // replay at four times real time
//!     Ok(())
//! }
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tokio::time::Instant;
use tracing::{debug, info};

use crate::source::ByteSource;
use crate::{MonitorError, Result};

/// Line rate of the gateway's serial link: 9600 baud, 8N1 (10 bits per byte).
const BYTES_PER_SECOND: f64 = 960.0;

/// Byte source that replays a capture file at serial-link pace.
pub struct CaptureSource {
    data: Vec<u8>,
    consumed: usize,
    path: PathBuf,
    opened_at: Instant,
    /// Replay speed multiplier (1.0 = real time)
    speed: f64,
}

impl CaptureSource {
    /// Open a capture file for replay.
    ///
    /// The file is loaded into memory at construction time; captures are
    /// small (a busy mesh produces a few hundred bytes a minute).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| MonitorError::file_error(path.to_path_buf(), e))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| MonitorError::file_error(path.to_path_buf(), e))?;

        info!("Opened capture file: {} ({} bytes)", path.display(), data.len());

        Ok(Self::from_parts(data, path.to_path_buf()))
    }

    /// Create a capture source from bytes (for testing).
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::from_parts(data.into(), PathBuf::from("<memory>"))
    }

    fn from_parts(data: Vec<u8>, path: PathBuf) -> Self {
        Self { data, consumed: 0, path, opened_at: Instant::now(), speed: 1.0 }
    }

    /// Set replay speed
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(0.1, 10.0); // Clamp to reasonable range
        debug!("Replay speed set to {}x", self.speed);
    }

    /// Total capture length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the capture holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes the replay clock has released so far.
    fn released(&self) -> usize {
        let elapsed = self.opened_at.elapsed().as_secs_f64();
        let released = (elapsed * BYTES_PER_SECOND * self.speed) as usize;
        released.min(self.data.len())
    }

    /// How long until `deficit` more bytes come off the replay clock.
    fn delay_for(&self, deficit: usize) -> std::time::Duration {
        std::time::Duration::from_secs_f64(deficit as f64 / (BYTES_PER_SECOND * self.speed))
    }
}

#[async_trait::async_trait]
impl ByteSource for CaptureSource {
    fn bytes_available(&mut self) -> Result<usize> {
        // A mid-replay slowdown can move the release point behind what has
        // already been consumed; those bytes are gone, not owed back.
        Ok(self.released().saturating_sub(self.consumed))
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.consumed + buf.len();
        if end > self.data.len() {
            // The capture itself ran out mid-frame
            return Err(MonitorError::truncated(
                format!("capture replay of {}", self.path.display()),
                end - self.data.len(),
            ));
        }

        // Wait for the replay clock to release the remainder of the read
        loop {
            let released = self.released();
            if released >= end {
                break;
            }
            tokio::time::sleep(self.delay_for(end - released)).await;
        }

        buf.copy_from_slice(&self.data[self.consumed..end]);
        self.consumed = end;
        Ok(())
    }

    fn description(&self) -> String {
        format!("capture replay of {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn nothing_is_available_at_open() {
        let mut source = CaptureSource::from_bytes(vec![1, 2, 3, 4, 5]);
        assert_eq!(source.bytes_available().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn bytes_release_on_the_replay_clock() {
        let mut source = CaptureSource::from_bytes(vec![0u8; 2000]);

        // One real-time second at 9600 baud releases 960 bytes
        tokio::time::advance(std::time::Duration::from_secs(1)).await;
        assert_eq!(source.bytes_available().unwrap(), 960);

        let mut buf = [0u8; 960];
        source.read_exact(&mut buf).await.unwrap();
        assert_eq!(source.bytes_available().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn read_waits_for_the_clock_instead_of_failing() {
        let mut source = CaptureSource::from_bytes(vec![7u8; 10]);
        let mut buf = [0u8; 10];
        // Nothing released yet; the paused clock auto-advances through the sleep
        source.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [7u8; 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn reading_past_the_capture_end_is_truncation() {
        let mut source = CaptureSource::from_bytes(vec![1, 2, 3]);
        let mut buf = [0u8; 5];
        let err = source.read_exact(&mut buf).await.unwrap_err();
        match err {
            MonitorError::Truncated { needed, .. } => assert_eq!(needed, 2),
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slowing_down_mid_replay_never_underflows_availability() {
        let mut source = CaptureSource::from_bytes(vec![0u8; 2000]);
        tokio::time::advance(std::time::Duration::from_secs(1)).await;

        let mut buf = [0u8; 960];
        source.read_exact(&mut buf).await.unwrap();

        // The release point recomputes below the consumed position
        source.set_speed(0.1);
        assert_eq!(source.bytes_available().unwrap(), 0);

        // The clock catches back up eventually and release resumes
        tokio::time::advance(std::time::Duration::from_secs(10)).await;
        assert_eq!(source.bytes_available().unwrap(), 96);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_multiplier_scales_release() {
        let mut source = CaptureSource::from_bytes(vec![0u8; 5000]);
        source.set_speed(2.0);
        tokio::time::advance(std::time::Duration::from_secs(1)).await;
        assert_eq!(source.bytes_available().unwrap(), 1920);
    }
}
