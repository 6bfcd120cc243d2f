//! Driver spawns and manages the monitoring task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::decoder::{DecodeOutcome, FrameDecoder};
use crate::source::ByteSource;
use crate::topology::{Topology, TopologyEvent, TopologySnapshot};

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for topology snapshots (one per applied frame; `None` until
    /// the first frame, and again after the stream ends)
    pub snapshots: watch::Receiver<Option<Arc<TopologySnapshot>>>,
    /// Event channel handle; subscribe for one event per decoded frame
    pub events: broadcast::Sender<TopologyEvent>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the monitoring task
///
/// Spawns a single reader task that owns the byte source, the decoder and
/// the topology, the one-writer model the state machine assumes. Consumers
/// only ever see snapshots and events through the returned channels.
pub struct Driver;

impl Driver {
    /// How often the idle stream is polled for a new frame.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Buffered events per subscriber before a slow one starts lagging.
    const EVENT_CAPACITY: usize = 256;

    /// Spawn the driver task for the given source with default settings.
    pub fn spawn<S>(source: S) -> DriverChannels
    where
        S: ByteSource,
    {
        Self::spawn_with(source, FrameDecoder::new(), Self::DEFAULT_POLL_INTERVAL)
    }

    /// Spawn the driver task with a custom decoder and poll interval.
    pub fn spawn_with<S>(source: S, decoder: FrameDecoder, poll_interval: Duration) -> DriverChannels
    where
        S: ByteSource,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (event_tx, _) = broadcast::channel(Self::EVENT_CAPACITY);

        // Cancellation token for coordinated shutdown
        let cancel = CancellationToken::new();

        let cancel_task = cancel.clone();
        let event_tx_task = event_tx.clone();
        tokio::spawn(async move {
            Self::monitor_task(
                source,
                decoder,
                snapshot_tx,
                event_tx_task,
                cancel_task,
                poll_interval,
            )
            .await;
        });

        DriverChannels { snapshots: snapshot_rx, events: event_tx, cancel }
    }

    /// Monitor task - polls the stream, decodes frames, folds them into the
    /// topology and publishes the results.
    async fn monitor_task<S>(
        mut source: S,
        decoder: FrameDecoder,
        snapshot_tx: watch::Sender<Option<Arc<TopologySnapshot>>>,
        event_tx: broadcast::Sender<TopologyEvent>,
        cancel: CancellationToken,
        poll_interval: Duration,
    ) where
        S: ByteSource,
    {
        info!("Monitor task started on {}", source.description());
        let mut topology = Topology::new();
        let mut frame_count = 0u64;
        let mut discard_count = 0u64;

        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        'run: loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Monitor cancelled");
                    break 'run;
                }
                _ = interval.tick() => {}
            }

            // Drain everything decodable on this tick before going back to sleep
            loop {
                match decoder.try_decode(&mut source).await {
                    Ok(DecodeOutcome::Pending) => break,
                    Ok(DecodeOutcome::Discarded { byte }) => {
                        // Diagnostic already logged by the decoder
                        discard_count += 1;
                        trace!("Discarded byte {:#04x} ({} total)", byte, discard_count);
                    }
                    Ok(DecodeOutcome::Frame(frame)) => {
                        frame_count += 1;
                        let event = topology.apply(&frame);
                        trace!("Frame {}: {}", frame_count, event.line);

                        // No subscribers is fine; events are fire-and-forget
                        let _ = event_tx.send(event);

                        if snapshot_tx.send(Some(Arc::new(topology.snapshot()))).is_err() {
                            debug!("Snapshot receiver dropped, shutting down");
                            break 'run;
                        }
                    }
                    Err(e) => {
                        // Stream-level failure terminates the loop; there is
                        // no recovery heuristic to guess at
                        error!("Stream error after {} frames: {}", frame_count, e);
                        let _ = snapshot_tx.send(None);
                        break 'run;
                    }
                }
            }
        }

        info!(
            "Monitor task ended (processed {} frames, discarded {} bytes)",
            frame_count, discard_count
        );
    }
}
