//! Live connection to the gateway serial port

use crate::Result;

#[cfg(feature = "serial")]
use {
    crate::driver::Driver,
    crate::sources::SerialSource,
    crate::topology::{TopologyEvent, TopologySnapshot},
    crate::types::UpdateRate,
    futures::{Stream, StreamExt},
    std::path::Path,
    std::sync::Arc,
    tokio::sync::{broadcast, watch},
    tokio_stream::wrappers::{BroadcastStream, WatchStream},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info},
};

/// Live connection to a mesh gateway
#[cfg(feature = "serial")]
pub struct LiveConnection {
    /// Snapshot watch receiver
    snapshots: watch::Receiver<Option<Arc<TopologySnapshot>>>,

    /// Event channel handle
    events: broadcast::Sender<TopologyEvent>,

    /// Driver poll frequency, for throttle normalization
    poll_hz: f64,

    /// Cancellation token for stopping the driver task
    cancel: CancellationToken,
}

#[cfg(feature = "serial")]
impl LiveConnection {
    /// Connect to the gateway on the given serial port.
    ///
    /// The connection is established as soon as the port opens; the mesh may
    /// be silent for a long time before the first frame, so nothing waits
    /// for data here. The streams deliver frames whenever they arrive.
    pub async fn connect<P: AsRef<Path>>(port: P) -> Result<Self> {
        info!("Connecting to mesh gateway");

        let source = SerialSource::open(port)?;
        let channels = Driver::spawn(source);
        let poll_hz = 1.0 / Driver::DEFAULT_POLL_INTERVAL.as_secs_f64();

        info!("Live connection established - waiting for mesh traffic");

        Ok(Self {
            snapshots: channels.snapshots,
            events: channels.events,
            poll_hz,
            cancel: channels.cancel,
        })
    }

    /// Subscribe to topology snapshots
    pub fn snapshots(&self, rate: UpdateRate) -> impl Stream<Item = Arc<TopologySnapshot>> + 'static {
        let snapshots =
            WatchStream::new(self.snapshots.clone()).filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.poll_hz) {
            None => snapshots.boxed(),
            Some(interval) => tokio_stream::StreamExt::throttle(snapshots, interval).boxed(),
        }
    }

    /// Subscribe to decoded events, one per frame
    pub fn events(&self) -> impl Stream<Item = TopologyEvent> + 'static {
        BroadcastStream::new(self.events.subscribe())
            .filter_map(|result| async move { result.ok() })
            .boxed()
    }

    /// Get the current topology snapshot (if any frame has been applied)
    pub fn current_snapshot(&self) -> Option<Arc<TopologySnapshot>> {
        self.snapshots.borrow().clone()
    }
}

#[cfg(feature = "serial")]
impl Drop for LiveConnection {
    fn drop(&mut self) {
        debug!("Dropping live connection");
        // Cancel the driver task on drop for clean shutdown
        self.cancel.cancel();
    }
}

// Stub implementation without the serial feature
#[cfg(not(feature = "serial"))]
pub struct LiveConnection {
    _private: (),
}

#[cfg(not(feature = "serial"))]
impl LiveConnection {
    /// Attempt to create a live connection without the `serial` feature.
    ///
    /// This always returns an error; live monitoring needs tokio-serial.
    /// Consider `Meshdeck::open()` with a capture file for feature-independent
    /// testing.
    pub async fn connect<P: AsRef<std::path::Path>>(_port: P) -> Result<Self> {
        Err(crate::MonitorError::feature_disabled("Live gateway monitoring", "serial"))
    }
}
