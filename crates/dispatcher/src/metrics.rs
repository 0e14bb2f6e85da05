//! Sink and delivery counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Current queue length
    queue_len: AtomicUsize,
    /// Updates the sink accepted
    delivered_count: AtomicU64,
    /// Updates the sink rejected
    failure_count: AtomicU64,
    /// Updates dropped on a full queue
    dropped_count: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    pub fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Returns the new total.
    pub fn inc_failure_count(&self) -> u64 {
        self.failure_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Returns the new total.
    pub fn inc_dropped_count(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> SinkSnapshot {
        SinkSnapshot {
            queue_len: self.queue_len(),
            delivered_count: self.delivered_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkSnapshot {
    pub queue_len: usize,
    pub delivered_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
}

/// Delivery loop counters
#[derive(Debug, Default)]
pub struct DeliveryMetrics {
    ticks: AtomicU64,
    /// Dequeued samples emitted
    fresh: AtomicU64,
    /// Of `fresh`, interpolated ones
    synthetic: AtomicU64,
    /// Last sample re-emitted on an empty queue
    repeated: AtomicU64,
    /// Ticks skipped while the link was down
    suppressed: AtomicU64,
    /// Ticks with nothing to emit yet
    idle: AtomicU64,
}

impl DeliveryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fresh(&self, synthetic: bool) {
        self.fresh.fetch_add(1, Ordering::Relaxed);
        if synthetic {
            self.synthetic.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_repeated(&self) {
        self.repeated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_idle(&self) {
        self.idle.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DeliverySnapshot {
        DeliverySnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            fresh: self.fresh.load(Ordering::Relaxed),
            synthetic: self.synthetic.load(Ordering::Relaxed),
            repeated: self.repeated.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            idle: self.idle.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliverySnapshot {
    pub ticks: u64,
    pub fresh: u64,
    pub synthetic: u64,
    pub repeated: u64,
    pub suppressed: u64,
    pub idle: u64,
}

impl DeliverySnapshot {
    /// Updates handed to the sinks
    pub fn emitted(&self) -> u64 {
        self.fresh + self.repeated
    }
}
