//! Serial gateway byte source
//!
//! Reads the raw monitoring stream straight off the gateway radio's serial
//! port. The gateway does no framing of its own; bytes arrive exactly as the
//! mesh frames were overheard, so this source is a thin availability/read
//! shim over the port and all interpretation stays in the decoder.
//!
//! Only compiled with the `serial` cargo feature (pulls in tokio-serial,
//! which needs libudev on Linux).

use std::path::{Path, PathBuf};

use serialport::SerialPort;
use tokio::io::AsyncReadExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::info;

use crate::source::ByteSource;
use crate::{MonitorError, Result};

/// Line rate of the gateway's monitoring output.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Byte source reading from the gateway's serial port.
pub struct SerialSource {
    port_path: PathBuf,
    stream: SerialStream,
}

impl SerialSource {
    /// Open the gateway port at the default baud rate.
    pub fn open(port: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_baud_rate(port, DEFAULT_BAUD_RATE)
    }

    /// Open the gateway port at a custom baud rate.
    pub fn open_with_baud_rate(port: impl AsRef<Path>, baud_rate: u32) -> Result<Self> {
        let port_path = port.as_ref().to_path_buf();
        let stream = tokio_serial::new(port_path.to_string_lossy(), baud_rate)
            .open_native_async()
            .map_err(|e| {
                MonitorError::connection_failed_with_source(
                    format!("could not open serial port {}", port_path.display()),
                    Box::new(e),
                )
            })?;

        info!("Opened serial port {} at {} baud", port_path.display(), baud_rate);

        Ok(Self { port_path, stream })
    }

    /// The port this source reads from.
    pub fn port_path(&self) -> &Path {
        &self.port_path
    }
}

#[async_trait::async_trait]
impl ByteSource for SerialSource {
    fn bytes_available(&mut self) -> Result<usize> {
        let count = self
            .stream
            .bytes_to_read()
            .map_err(|e| MonitorError::stream_error("availability check", e.into()))?;
        Ok(count as usize)
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.stream.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(MonitorError::truncated(self.description(), buf.len()))
            }
            Err(e) => Err(MonitorError::stream_error(self.description(), e)),
        }
    }

    fn description(&self) -> String {
        format!("serial port {}", self.port_path.display())
    }
}
