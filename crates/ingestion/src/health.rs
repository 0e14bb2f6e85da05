//! Connection health monitor
//!
//! Stopwatch reset on every received frame, empty or malformed included.
//! Flips the shared [`LinkHealth`] flags and logs only on transitions.

use std::sync::Arc;
use std::time::Duration;

use contracts::LinkHealth;
use tokio::time::Instant;
use tracing::{info, warn};

const THRESHOLD_SLACK: Duration = Duration::from_millis(1);

/// Recency-based health tracking for one transport
#[derive(Debug)]
pub struct HealthMonitor {
    health: Arc<LinkHealth>,
    threshold: Duration,
    transport: String,
    /// Last frame, or monitor start before the first frame
    last_activity: Instant,
}

impl HealthMonitor {
    pub fn new(health: Arc<LinkHealth>, threshold: Duration, transport: impl Into<String>) -> Self {
        Self {
            health,
            threshold,
            transport: transport.into(),
            last_activity: Instant::now(),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn health(&self) -> &Arc<LinkHealth> {
        &self.health
    }

    /// A frame arrived: reset the stopwatch and mark the link up.
    ///
    /// Returns `true` on a down → up transition.
    pub fn record_frame(&mut self, now: Instant) -> bool {
        self.last_activity = now;
        let was_up = self.health.set(true);
        if !was_up {
            info!(transport = %self.transport, "link up");
            observability::record_health_transition(&self.transport, true);
        }
        !was_up
    }

    /// Time since the last frame
    pub fn silence(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Silence is strictly longer than the threshold.
    pub fn silence_exceeded(&self, now: Instant) -> bool {
        self.silence(now) > self.threshold
    }

    /// How long the next receive may wait.
    ///
    /// While up: until just past the threshold. While down: one full threshold.
    pub fn receive_timeout(&self, now: Instant) -> Duration {
        if self.health.is_connected() {
            self.threshold.saturating_sub(self.silence(now)) + THRESHOLD_SLACK
        } else {
            self.threshold
        }
    }

    /// Mark the link down.
    ///
    /// Returns `true` on an up → down transition.
    pub fn mark_down(&mut self, reason: &'static str) -> bool {
        let was_up = self.health.set(false);
        if was_up {
            warn!(transport = %self.transport, reason, "link down");
            observability::record_health_transition(&self.transport, false);
        }
        was_up
    }
}
