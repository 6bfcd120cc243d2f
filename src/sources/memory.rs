//! In-memory byte source

use std::collections::VecDeque;

use crate::source::ByteSource;
use crate::{MonitorError, Result};

/// Byte source backed by an in-memory buffer.
///
/// Useful for feeding recorded buffers programmatically and as the harness
/// for decoder tests. By default the buffer behaves like a closed stream:
/// running out of bytes mid-read is truncation. [`stalling`](Self::stalling)
/// switches exhaustion to an indefinite wait instead, modelling a live port
/// that has simply gone quiet.
#[derive(Debug)]
pub struct MemorySource {
    buffer: VecDeque<u8>,
    stall_when_empty: bool,
}

impl MemorySource {
    /// Create a source over the given bytes.
    pub fn new(bytes: impl Into<VecDeque<u8>>) -> Self {
        Self { buffer: bytes.into(), stall_when_empty: false }
    }

    /// Treat buffer exhaustion as a silent stream rather than a closed one.
    ///
    /// Reads that outlive the buffer never complete, which is exactly the
    /// condition the decoder's per-frame timeout exists to catch.
    pub fn stalling(mut self) -> Self {
        self.stall_when_empty = true;
        self
    }

    /// Append more bytes to the stream.
    pub fn feed(&mut self, bytes: impl IntoIterator<Item = u8>) {
        self.buffer.extend(bytes);
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }
}

#[async_trait::async_trait]
impl ByteSource for MemorySource {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.buffer.len())
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.buffer.pop_front() {
                Some(byte) => *slot = byte,
                None if self.stall_when_empty => {
                    // A quiet port delivers nothing, forever
                    *slot = futures::future::pending().await;
                }
                None => {
                    return Err(MonitorError::truncated("memory buffer read", buf.len() - i));
                }
            }
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("memory buffer ({} bytes left)", self.buffer.len())
    }
}
