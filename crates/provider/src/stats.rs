//! Provider statistics

use std::sync::Arc;
use std::time::Duration;

use dispatcher::{DeliveryMetrics, DeliverySnapshot, SinkMetrics, SinkSnapshot};
use ingestion::{IngestionMetrics, MetricsSnapshot};

/// Counters of the current (or last) run
#[derive(Debug, Clone, Default)]
pub struct ProviderStats {
    pub ingestion: MetricsSnapshot,
    pub delivery: DeliverySnapshot,
    pub sinks: Vec<(String, SinkSnapshot)>,
    /// Time since `start`, frozen at `stop`
    pub uptime: Duration,
}

impl ProviderStats {
    /// Emitted updates per second of uptime
    pub fn emission_rate(&self) -> f64 {
        let secs = self.uptime.as_secs_f64();
        if secs > 0.0 {
            self.delivery.emitted() as f64 / secs
        } else {
            0.0
        }
    }

    /// Share of emissions that repeated the last sample, in percent
    pub fn repeat_rate(&self) -> f64 {
        let emitted = self.delivery.emitted();
        if emitted > 0 {
            (self.delivery.repeated as f64 / emitted as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Live counter handles of one run
#[derive(Debug, Clone)]
pub(crate) struct Counters {
    pub ingestion: Arc<IngestionMetrics>,
    pub delivery: Arc<DeliveryMetrics>,
    pub sinks: Vec<(String, Arc<SinkMetrics>)>,
}

impl Counters {
    pub fn snapshot(&self, uptime: Duration) -> ProviderStats {
        ProviderStats {
            ingestion: self.ingestion.snapshot(),
            delivery: self.delivery.snapshot(),
            sinks: self
                .sinks
                .iter()
                .map(|(name, metrics)| (name.clone(), metrics.snapshot()))
                .collect(),
            uptime,
        }
    }
}
