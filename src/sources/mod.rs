//! Byte source implementations
//!
//! Every source implements [`crate::source::ByteSource`] and feeds the same
//! decoder: a live serial port (feature `serial`), a paced capture replay,
//! or an in-memory buffer.

mod capture;
mod memory;
#[cfg(feature = "serial")]
mod serial;

pub use capture::CaptureSource;
pub use memory::MemorySource;
#[cfg(feature = "serial")]
pub use serial::{DEFAULT_BAUD_RATE, SerialSource};
