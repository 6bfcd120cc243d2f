//! Replay connection for capture files

use futures::{Stream, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::driver::Driver;
use crate::sources::CaptureSource;
use crate::topology::{TopologyEvent, TopologySnapshot};
use crate::types::UpdateRate;
use crate::Result;

/// Replay connection from a capture file
pub struct ReplayConnection {
    /// Snapshot watch receiver
    snapshots: watch::Receiver<Option<Arc<TopologySnapshot>>>,

    /// Event channel handle
    events: broadcast::Sender<TopologyEvent>,

    /// Driver poll frequency, for throttle normalization
    poll_hz: f64,

    /// Cancellation token for stopping the driver task
    cancel: CancellationToken,
}

impl ReplayConnection {
    /// Open a capture file for replay at real-time pace.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_speed(path, 1.0).await
    }

    /// Open a capture file for replay at a speed multiple of real time.
    pub async fn open_with_speed<P: AsRef<Path>>(path: P, speed: f64) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening capture file: {}", path.display());

        let mut source = CaptureSource::open(path)?;
        source.set_speed(speed);

        let channels = Driver::spawn(source);
        let poll_hz = 1.0 / Driver::DEFAULT_POLL_INTERVAL.as_secs_f64();

        info!("Replay connection opened at {}x", speed);

        Ok(Self {
            snapshots: channels.snapshots,
            events: channels.events,
            poll_hz,
            cancel: channels.cancel,
        })
    }

    /// Subscribe to topology snapshots
    ///
    /// `UpdateRate::Native` yields one snapshot per applied frame;
    /// `UpdateRate::Max(hz)` samples the latest snapshot at most that often.
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

impl Drop for ReplayConnection {
    fn drop(&mut self) {
        debug!("Dropping replay connection");
        // Cancel the driver task on drop for clean shutdown
        self.cancel.cancel();
    }
}
