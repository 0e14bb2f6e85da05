//! Pipeline diagnostic hook
//!
//! Receiver and delivery loop call these at fixed points (frame received,
//! pair bridged, queue depth, health transition, ...). Without an installed
//! recorder every call is a no-op.

use metrics::{counter, gauge, histogram};

/// Frame received from a transport
pub fn record_frame_received(transport: &str, bytes: usize) {
    counter!(
        "simmotion_frames_received_total",
        "transport" => transport.to_string()
    )
    .increment(1);
    histogram!("simmotion_frame_bytes").record(bytes as f64);
}

/// Frame dropped by the decoder
pub fn record_decode_failure(transport: &str, reason: &'static str) {
    counter!(
        "simmotion_decode_failures_total",
        "transport" => transport.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// All-zero "no data" frame seen (still processed)
pub fn record_empty_frame(transport: &str) {
    counter!(
        "simmotion_empty_frames_total",
        "transport" => transport.to_string()
    )
    .increment(1);
}

/// Pair bridged: samples queued and the measured inter-arrival interval
pub fn record_pair_bridged(samples: usize, elapsed_ms: f64) {
    counter!("simmotion_pairs_bridged_total").increment(1);
    counter!("simmotion_samples_enqueued_total").increment(samples as u64);
    histogram!("simmotion_arrival_interval_ms").record(elapsed_ms);
}

/// Current delivery queue depth
pub fn record_queue_depth(depth: usize) {
    gauge!("simmotion_queue_depth").set(depth as f64);
}

/// One update emitted by the delivery loop
pub fn record_update_emitted(repeated: bool) {
    let kind = if repeated { "repeated" } else { "fresh" };
    counter!("simmotion_updates_emitted_total", "kind" => kind).increment(1);
}

/// Tick suppressed while the link is down
pub fn record_emission_suppressed() {
    counter!("simmotion_emissions_suppressed_total").increment(1);
}

/// Link health changed
pub fn record_health_transition(transport: &str, connected: bool) {
    let state = if connected { "up" } else { "down" };
    counter!(
        "simmotion_health_transitions_total",
        "transport" => transport.to_string(),
        "state" => state
    )
    .increment(1);
    gauge!(
        "simmotion_link_connected",
        "transport" => transport.to_string()
    )
    .set(if connected { 1.0 } else { 0.0 });
}

/// Transient transport fault caught by the receiver
pub fn record_transport_fault(transport: &str) {
    counter!(
        "simmotion_transport_faults_total",
        "transport" => transport.to_string()
    )
    .increment(1);
}

/// Update handed to a sink
pub fn record_update_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "simmotion_updates_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Point-in-time view of a [`RunningStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}
