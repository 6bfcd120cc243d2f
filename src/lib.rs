//! Type-safe Rust library for passively observing low-power mesh networks.
//!
//! Meshdeck ingests the raw byte stream a mesh radio gateway relays over its
//! serial port and reconstructs, incrementally, the live logical topology of
//! the mesh: which node joined, which node is whose parent, and which links
//! are still alive. It is a pure observer - nothing is ever transmitted.
//!
//! # Features
//!
//! - **Live Monitoring**: Real-time decoding from a gateway serial port
//!   (`serial` cargo feature)
//! - **Cross-platform Replay**: Capture files replayed at serial-link pace
//!   on any platform
//! - **Robust Decoding**: Garbage bytes and unknown addresses are diagnosed
//!   and skipped without corrupting prior topology state
//! - **Streaming API**: Topology snapshots and per-frame events as async
//!   streams
//!
//! # Quick Start
//!
//! ## Example (capture replay)
//!
//! ```rust,no_run
//! use meshdeck::{Meshdeck, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = Meshdeck::open("mesh-session.bin").await?;
//!     let mut snapshots = connection.snapshots(UpdateRate::Native);
//!
//!     while let Some(snapshot) = snapshots.next().await {
//!         println!("{} nodes, {} links", snapshot.nodes.len(), snapshot.edges.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod types;

// Decoding pipeline
pub mod decoder;
pub mod source;
pub mod sources;

// Topology state machine
pub mod topology;

// Stream-based monitoring architecture
pub mod connection;
pub mod driver;

// Core exports
pub use error::*;
pub use types::*;

// Decoder exports
pub use decoder::{DecodeOutcome, FrameDecoder};

// Topology exports
pub use topology::{NodeRecord, Topology, TopologyEvent, TopologyGraph, TopologySnapshot};

// Main API exports
pub use connection::live::LiveConnection;
pub use connection::replay::ReplayConnection;

/// Unified entry point for mesh monitoring connections.
///
/// This factory provides a consistent API for creating connections to both
/// a live gateway serial port and capture file replay.
///
/// # Examples
///
/// ## Live Monitoring (feature `serial`)
/// ```rust,no_run
/// use meshdeck::Meshdeck;
///
/// #[tokio::main]
/// async fn main() -> meshdeck::Result<()> {
///     let connection = Meshdeck::connect("/dev/ttyUSB0").await?;
///     // Use connection...
///     Ok(())
/// }
/// ```
///
/// ## Capture Replay (cross-platform)
/// ```rust,no_run
/// use meshdeck::Meshdeck;
///
/// #[tokio::main]
/// async fn main() -> meshdeck::Result<()> {
///     let connection = Meshdeck::open("mesh-session.bin").await?;
///     // Use connection...
///     Ok(())
/// }
/// ```
pub struct Meshdeck;

impl Meshdeck {
    /// Connect to a live mesh gateway.
    ///
    /// Opens the gateway's serial port and starts decoding immediately. The
    /// mesh may be silent for minutes at a time; the connection is
    /// established as soon as the port opens.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The crate was built without the `serial` feature
    /// - The port does not exist or cannot be opened
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use meshdeck::Meshdeck;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> meshdeck::Result<()> {
    /// let connection = Meshdeck::connect("/dev/ttyUSB0").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect<P: AsRef<std::path::Path>>(port: P) -> Result<LiveConnection> {
        LiveConnection::connect(port).await
    }

    /// Open a capture file for replay.
    ///
    /// Loads a raw capture of gateway output and provides a connection that
    /// behaves identically to live monitoring, with bytes released at the
    /// serial link's real-time pace.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the capture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not readable.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use meshdeck::Meshdeck;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> meshdeck::Result<()> {
    /// let connection = Meshdeck::open("mesh-session.bin").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open<P: AsRef<std::path::Path>>(path: P) -> Result<ReplayConnection> {
        ReplayConnection::open(path).await
    }
}
