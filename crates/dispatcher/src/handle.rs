//! SinkHandle - isolates one telemetry consumer from the delivery cadence
//!
//! The deliverer only ever calls [`SinkHandle::try_send`]. A consumer that
//! stalls loses updates at its own queue; one that errors is counted. At a
//! 10 ms cadence either condition repeats every tick, so both are reported
//! once when they start and then only periodically.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace, warn};

use contracts::{TelemetrySink, TelemetryUpdate};

use crate::metrics::SinkMetrics;

/// Drops between two queue-full warnings
const DROP_REPORT_STRIDE: u64 = 100;

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<TelemetryUpdate>,
    metrics: Arc<SinkMetrics>,
    worker: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker task for `sink`.
    pub fn spawn<S: TelemetrySink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker = tokio::spawn(sink_worker(sink, rx, Arc::clone(&metrics), name.clone()));

        Self {
            name,
            tx,
            metrics,
            worker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue an update without waiting.
    ///
    /// Returns false when the update was not queued for this sink.
    pub fn try_send(&self, update: TelemetryUpdate) -> bool {
        let sequence = update.sequence;
        match self.tx.try_send(update) {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.metrics.inc_dropped_count();
                observability::record_update_dispatched(&self.name, false);
                if dropped == 1 || dropped % DROP_REPORT_STRIDE == 0 {
                    warn!(sink = %self.name, sequence, dropped, "sink lagging, updates dropped");
                } else {
                    trace!(sink = %self.name, sequence, "update dropped");
                }
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, sequence, "sink worker gone");
                false
            }
        }
    }

    /// Deliver what is already queued, then close the sink.
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            error!(error = ?e, "sink worker panicked");
        }
        debug!(
            delivered = self.metrics.delivered_count(),
            dropped = self.metrics.dropped_count(),
            "sink stopped"
        );
    }
}

#[instrument(name = "sink_worker", skip(sink, rx, metrics), fields(sink = %name))]
async fn sink_worker<S: TelemetrySink>(
    mut sink: S,
    mut rx: mpsc::Receiver<TelemetryUpdate>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!("sink worker started");
    // Length of the current run of rejected updates
    let mut failing: u64 = 0;

    while let Some(update) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.deliver(&update).await {
            Ok(()) => {
                metrics.inc_delivered_count();
                observability::record_update_dispatched(&name, true);
                if failing > 0 {
                    info!(rejected = failing, "sink recovered");
                    failing = 0;
                }
                trace!(sequence = update.sequence, "delivered");
            }
            Err(e) => {
                metrics.inc_failure_count();
                observability::record_update_dispatched(&name, false);
                failing += 1;
                if failing == 1 {
                    warn!(sequence = update.sequence, error = %e, "sink rejecting updates");
                } else {
                    debug!(sequence = update.sequence, error = %e, "update rejected");
                }
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(error = %e, "flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(error = %e, "close failed on shutdown");
    }
    debug!("sink worker stopped");
}
