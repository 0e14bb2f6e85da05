//! Receiver loop
//!
//! Pulls frames from one transport, decodes them, tracks link health and
//! feeds the bridge. Every produced sample goes onto the shared delivery
//! queue. Outages and faults reset the bridge and clear the queue so no
//! interpolation spans a gap.

use std::sync::Arc;
use std::time::Duration;

use contracts::{ContractError, Frame, LinkHealth, Transport, WireLayout};
use resampler::{DeliveryQueue, Interpolator, SampleBridge};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::{IngestionMetrics, ReceiverConfig};
use crate::decoder::FrameDecoder;
use crate::health::HealthMonitor;

/// What the loop does after handling one receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Continue,
    Backoff(Duration),
    Stop,
}

/// Receiver bound to one transport
pub struct Receiver<T> {
    transport: T,
    transport_name: String,
    decoder: FrameDecoder,
    bridge: SampleBridge,
    queue: DeliveryQueue,
    monitor: HealthMonitor,
    config: ReceiverConfig,
    metrics: Arc<IngestionMetrics>,
}

impl<T: Transport> Receiver<T> {
    pub fn new(
        transport: T,
        layout: WireLayout,
        queue: DeliveryQueue,
        health: Arc<LinkHealth>,
        config: ReceiverConfig,
        metrics: Arc<IngestionMetrics>,
    ) -> Self {
        let transport_name = transport.name().to_string();
        let interpolator = Interpolator::new(config.output_period, layout.channels());
        Self {
            monitor: HealthMonitor::new(health, config.no_data_timeout, transport_name.clone()),
            transport,
            transport_name,
            decoder: FrameDecoder::new(layout),
            bridge: SampleBridge::new(interpolator),
            queue,
            config,
            metrics,
        }
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Spawn the loop on the current runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()>
    where
        T: 'static,
    {
        tokio::spawn(self.run(shutdown))
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    #[instrument(name = "receiver", skip_all, fields(transport = %self.transport_name))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("receiver started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let timeout = self.monitor.receive_timeout(Instant::now());
            let outcome = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                outcome = self.transport.receive_frame(timeout) => outcome,
            };

            match self.handle(outcome) {
                Next::Continue => {}
                Next::Stop => break,
                Next::Backoff(pause) => {
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(pause) => {}
                    }
                }
            }
        }

        self.monitor.mark_down("receiver stopped");
        if let Err(e) = self.transport.close().await {
            warn!(error = %e, "transport close failed");
        }

        let snapshot = self.metrics.snapshot();
        info!(
            frames = snapshot.frames_received,
            pairs = snapshot.pairs_bridged,
            decode_failures = snapshot.decode_failures,
            "receiver stopped"
        );
    }

    fn handle(&mut self, outcome: Result<Option<Frame>, ContractError>) -> Next {
        match outcome {
            Ok(Some(frame)) => self.on_frame(frame),
            Ok(None) => {
                if self.monitor.silence_exceeded(Instant::now()) {
                    self.link_lost("no data");
                    Next::Backoff(self.config.link_down_backoff)
                } else {
                    Next::Continue
                }
            }
            Err(e) => {
                warn!(error = %e, "transport fault");
                self.metrics.record_transport_fault();
                observability::record_transport_fault(&self.transport_name);
                self.link_lost("transport fault");
                Next::Backoff(self.config.fault_backoff)
            }
        }
    }

    fn on_frame(&mut self, frame: Frame) -> Next {
        self.metrics.record_frame();
        observability::record_frame_received(&self.transport_name, frame.payload.len());
        self.monitor.record_frame(Instant::now());

        let sample = match self.decoder.decode(&frame.payload) {
            Ok(sample) => sample,
            Err(e) => {
                self.metrics.record_decode_failure();
                observability::record_decode_failure(&self.transport_name, e.reason());
                debug!(error = %e, bytes = frame.payload.len(), "frame dropped");
                return Next::Continue;
            }
        };

        if !sample.populated {
            self.metrics.record_short_frame();
            debug!(bytes = frame.payload.len(), "short frame");
            return Next::Continue;
        }

        if sample.is_empty_telemetry() {
            self.metrics.record_empty_frame();
            observability::record_empty_frame(&self.transport_name);
            trace!("empty telemetry frame");
        }

        let Some(bridged) = self.bridge.push_at(sample, frame.received_at) else {
            return Next::Continue;
        };
        let elapsed = bridged.elapsed;

        match self.queue.enqueue_all(bridged.samples) {
            Ok(count) => {
                let depth = self.queue.len();
                self.metrics.record_bridge(count, elapsed, depth);
                observability::record_pair_bridged(count, elapsed.as_secs_f64() * 1000.0);
                observability::record_queue_depth(depth);
                Next::Continue
            }
            Err(_) => {
                debug!("delivery queue closed");
                Next::Stop
            }
        }
    }

    fn link_lost(&mut self, reason: &'static str) {
        if self.monitor.mark_down(reason) {
            self.metrics.record_link_down();
        }
        self.bridge.reset();
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!(dropped, "queue cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layouts;
    use crate::transport::MockTransport;
    use contracts::SampleOrigin;
    use std::sync::atomic::Ordering;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn v2_frame(pitch_mrad: f64) -> String {
        format!("{pitch_mrad};0;0;0;0;0;0;0;0;0;0")
    }

    struct Harness {
        queue: DeliveryQueue,
        health: Arc<LinkHealth>,
        metrics: Arc<IngestionMetrics>,
        stop: watch::Sender<bool>,
        handle: JoinHandle<()>,
    }

    fn start(transport: MockTransport) -> Harness {
        let queue = DeliveryQueue::new();
        let health = Arc::new(LinkHealth::new());
        let metrics = Arc::new(IngestionMetrics::new());
        let (stop, shutdown) = watch::channel(false);
        let receiver = Receiver::new(
            transport,
            layouts::aerofly_fs2_v2(),
            queue.clone(),
            Arc::clone(&health),
            ReceiverConfig::default(),
            Arc::clone(&metrics),
        );
        Harness {
            queue,
            health,
            metrics,
            stop,
            handle: receiver.spawn(shutdown),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_pair_is_bridged_into_queue() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .frame_after(ms(25), v2_frame(1000.0));
        let h = start(transport);

        tokio::time::sleep(ms(30)).await;
        assert!(h.health.is_connected());
        assert_eq!(h.queue.len(), 3);

        let origins: Vec<SampleOrigin> = std::iter::from_fn(|| h.queue.try_dequeue())
            .map(|q| q.origin)
            .collect();
        assert_eq!(
            origins,
            vec![SampleOrigin::Real, SampleOrigin::Synthetic, SampleOrigin::Real]
        );
        assert_eq!(h.metrics.pairs_bridged.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuation_does_not_requeue_previous_frame() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .frame_after(ms(20), v2_frame(0.0))
            .frame_after(ms(20), v2_frame(0.0));
        let h = start(transport);

        tokio::time::sleep(ms(45)).await;
        // 3 samples for the first pair, 2 for the continuation
        assert_eq!(h.queue.len(), 5);
        assert_eq!(h.metrics.samples_enqueued.load(Ordering::Relaxed), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decode_failure_keeps_link_up() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .frame_after(ms(10), "0;abc;0;0;0;0;0;0;0;0;0");
        let h = start(transport);

        tokio::time::sleep(ms(15)).await;
        assert!(h.health.is_connected());
        assert_eq!(h.metrics.frames_received.load(Ordering::Relaxed), 2);
        assert_eq!(h.metrics.decode_failures.load(Ordering::Relaxed), 1);
        assert!(h.queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_frame_is_not_bridged() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .frame_after(ms(10), "1;2;3")
            .frame_after(ms(10), v2_frame(0.0));
        let h = start(transport);

        tokio::time::sleep(ms(25)).await;
        assert_eq!(h.metrics.short_frames.load(Ordering::Relaxed), 1);
        assert_eq!(h.metrics.pairs_bridged.load(Ordering::Relaxed), 1);
        // 20 ms between the two valid frames
        assert_eq!(h.queue.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_telemetry_is_counted_and_processed() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .frame_after(ms(10), v2_frame(0.0));
        let h = start(transport);

        tokio::time::sleep(ms(15)).await;
        assert_eq!(h.metrics.empty_frames.load(Ordering::Relaxed), 2);
        assert_eq!(h.queue.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silence_marks_down_and_clears_queue() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .frame_after(ms(25), v2_frame(0.0));
        let h = start(transport);

        tokio::time::sleep(ms(30)).await;
        assert_eq!(h.queue.len(), 3);

        tokio::time::sleep(ms(250)).await;
        assert!(!h.health.is_connected());
        assert!(!h.health.is_running());
        assert!(h.queue.is_empty());
        assert_eq!(h.metrics.link_down_events.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_comes_back_after_outage() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .frame_after(ms(1300), v2_frame(0.0))
            .frame_after(ms(10), v2_frame(0.0));
        let h = start(transport);

        tokio::time::sleep(ms(500)).await;
        assert!(!h.health.is_connected());

        tokio::time::sleep(ms(900)).await;
        assert!(h.health.is_connected());
        // Fresh pair after the reset: no span across the outage
        assert_eq!(h.metrics.pairs_bridged.load(Ordering::Relaxed), 1);
        assert_eq!(h.queue.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_marks_down_and_backs_off() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .fault_after(ms(10), "socket reset");
        let h = start(transport);

        tokio::time::sleep(ms(20)).await;
        assert!(!h.health.is_connected());
        assert_eq!(h.metrics.transport_faults.load(Ordering::Relaxed), 1);
        assert_eq!(h.metrics.link_down_events.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_backoff_and_closes_transport() {
        let transport = MockTransport::new("mock").fault_after(ms(0), "boom");
        let closed = transport.closed_flag();
        let h = start(transport);

        tokio::time::sleep(ms(50)).await;
        h.stop.send(true).unwrap();

        tokio::time::timeout(ms(10), h.handle)
            .await
            .expect("receiver should stop promptly")
            .unwrap();
        assert!(closed.load(Ordering::SeqCst));
        assert!(!h.health.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_queue_stops_receiver() {
        let transport = MockTransport::new("mock")
            .frame_after(ms(0), v2_frame(0.0))
            .frame_after(ms(20), v2_frame(0.0));
        let h = start(transport);
        h.queue.close();

        tokio::time::timeout(ms(100), h.handle)
            .await
            .expect("receiver should stop on a closed queue")
            .unwrap();
        assert!(!h.health.is_connected());
    }
}
