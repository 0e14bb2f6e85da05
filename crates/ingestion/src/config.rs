//! Receiver configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use contracts::ProviderBlueprint;
use observability::{RunningStats, StatsSummary};

/// Receiver timing configuration
#[derive(Debug, Clone, Copy)]
pub struct ReceiverConfig {
    /// Output cadence (interpolation sub-interval)
    pub output_period: Duration,

    /// Silence longer than this marks the link down
    pub no_data_timeout: Duration,

    /// Pause after the link goes down
    pub link_down_backoff: Duration,

    /// Pause after a transient transport fault
    pub fault_backoff: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            output_period: Duration::from_millis(10),
            no_data_timeout: Duration::from_millis(200),
            link_down_backoff: Duration::from_secs(1),
            fault_backoff: Duration::from_secs(1),
        }
    }
}

impl ReceiverConfig {
    pub fn from_blueprint(blueprint: &ProviderBlueprint) -> Self {
        Self {
            output_period: blueprint.provider.output_period(),
            no_data_timeout: blueprint.transport.no_data_timeout(),
            link_down_backoff: blueprint.health.link_down_backoff(),
            fault_backoff: blueprint.health.fault_backoff(),
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Frames returned by the transport
    pub frames_received: AtomicU64,

    /// Frames dropped by the decoder
    pub decode_failures: AtomicU64,

    /// Frames with fewer fields than the layout needs
    pub short_frames: AtomicU64,

    /// All-zero "no data" frames (still processed)
    pub empty_frames: AtomicU64,

    pub pairs_bridged: AtomicU64,

    /// Real + synthetic samples put on the delivery queue
    pub samples_enqueued: AtomicU64,

    pub transport_faults: AtomicU64,

    pub link_down_events: AtomicU64,

    /// Queue depth after the last enqueue
    pub queue_depth: AtomicUsize,

    /// Inter-arrival interval of bridged pairs (ms)
    arrival_interval_ms: Mutex<RunningStats>,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_short_frame(&self) {
        self.short_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_frame(&self) {
        self.empty_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bridge(&self, samples: usize, elapsed: Duration, queue_depth: usize) {
        self.pairs_bridged.fetch_add(1, Ordering::Relaxed);
        self.samples_enqueued
            .fetch_add(samples as u64, Ordering::Relaxed);
        self.queue_depth.store(queue_depth, Ordering::Relaxed);
        if let Ok(mut stats) = self.arrival_interval_ms.lock() {
            stats.push(elapsed.as_secs_f64() * 1000.0);
        }
    }

    pub fn record_transport_fault(&self) {
        self.transport_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link_down(&self) {
        self.link_down_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            short_frames: self.short_frames.load(Ordering::Relaxed),
            empty_frames: self.empty_frames.load(Ordering::Relaxed),
            pairs_bridged: self.pairs_bridged.load(Ordering::Relaxed),
            samples_enqueued: self.samples_enqueued.load(Ordering::Relaxed),
            transport_faults: self.transport_faults.load(Ordering::Relaxed),
            link_down_events: self.link_down_events.load(Ordering::Relaxed),
            queue_depth: self.queue_depth.load(Ordering::Relaxed),
            arrival_interval_ms: self
                .arrival_interval_ms
                .lock()
                .map(|stats| StatsSummary::from(&*stats))
                .unwrap_or_default(),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub frames_received: u64,
    pub decode_failures: u64,
    pub short_frames: u64,
    pub empty_frames: u64,
    pub pairs_bridged: u64,
    pub samples_enqueued: u64,
    pub transport_faults: u64,
    pub link_down_events: u64,
    pub queue_depth: usize,
    pub arrival_interval_ms: StatsSummary,
}
