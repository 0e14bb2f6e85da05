//! Delivery loop
//!
//! Wakes at the output cadence and emits one update per tick: the next
//! queued sample, or the last emitted one again when the queue is empty.
//! Nothing is emitted while the link is down or before the first sample.

use std::sync::Arc;
use std::time::Duration;

use contracts::{ChannelSet, LinkHealth, SampleOrigin, TelemetryUpdate};
use resampler::DeliveryQueue;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, trace};

use crate::dispatcher::Dispatcher;
use crate::last_emitted::LastEmitted;
use crate::metrics::DeliveryMetrics;

/// Timer-driven consumer of the delivery queue
pub struct Deliverer {
    queue: DeliveryQueue,
    health: Arc<LinkHealth>,
    dispatcher: Dispatcher,
    channels: ChannelSet,
    period: Duration,
    last: Arc<LastEmitted>,
    metrics: Arc<DeliveryMetrics>,
    sequence: u64,
}

impl Deliverer {
    pub fn new(
        queue: DeliveryQueue,
        health: Arc<LinkHealth>,
        dispatcher: Dispatcher,
        channels: ChannelSet,
        period: Duration,
    ) -> Self {
        Self {
            queue,
            health,
            dispatcher,
            channels,
            period,
            last: Arc::new(LastEmitted::new()),
            metrics: Arc::new(DeliveryMetrics::new()),
            sequence: 0,
        }
    }

    pub fn last_emitted(&self) -> Arc<LastEmitted> {
        Arc::clone(&self.last)
    }

    pub fn metrics(&self) -> Arc<DeliveryMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// One cadence tick. Returns the emitted update, if any.
    pub fn tick(&mut self) -> Option<TelemetryUpdate> {
        self.metrics.record_tick();

        if !self.health.is_connected() {
            self.metrics.record_suppressed();
            observability::record_emission_suppressed();
            trace!("link down, emission suppressed");
            return None;
        }

        let (current, previous, repeated) = match self.queue.try_dequeue() {
            Some(queued) => {
                let previous = self.last.swap(queued.sample).unwrap_or_default();
                self.metrics
                    .record_fresh(queued.origin == SampleOrigin::Synthetic);
                (queued.sample, previous, false)
            }
            None => {
                let Some(last) = self.last.get() else {
                    self.metrics.record_idle();
                    return None;
                };
                self.metrics.record_repeated();
                (last, last, true)
            }
        };

        self.sequence += 1;
        let update = TelemetryUpdate {
            sequence: self.sequence,
            current,
            previous,
            connected: true,
            running: self.health.is_running(),
            channels: self.channels,
            repeated,
        };

        self.dispatcher.dispatch(&update);
        observability::record_update_emitted(repeated);
        trace!(sequence = update.sequence, repeated, "update emitted");
        Some(update)
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Tick until `shutdown` flips, then drain the sinks.
    #[instrument(name = "deliverer", skip_all, fields(period_ms = self.period.as_millis() as u64))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(sinks = self.dispatcher.sink_count(), "deliverer started");

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            emitted = snapshot.emitted(),
            repeated = snapshot.repeated,
            suppressed = snapshot.suppressed,
            "deliverer stopped"
        );
        self.dispatcher.shutdown().await;
    }
}
