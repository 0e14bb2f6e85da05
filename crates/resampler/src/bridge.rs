//! Sample bridge (double buffer)
//!
//! Holds slot A and the time it was filled. Each new sample is bridged
//! against A, then becomes the new A as a retired continuation
//! (`populated = false`), so no frame is interpolated twice and at most two
//! samples are ever held.

use std::iter::Skip;
use std::time::{Duration, Instant};

use contracts::Sample;
use tracing::trace;

use crate::interpolate::{Interpolate, Interpolator};

/// Result of bridging one pair
#[derive(Debug)]
pub struct Bridged {
    /// Interval between the arrivals of A and B
    pub elapsed: Duration,

    /// Samples to enqueue, in order
    pub samples: Skip<Interpolate>,
}

/// Two-slot bridge feeding the interpolator
#[derive(Debug)]
pub struct SampleBridge {
    interpolator: Interpolator,
    slot_a: Sample,
    /// Arrival of the sample in slot A; `None` while empty
    a_arrived_at: Option<Instant>,
    /// Slot A holds the final sample of the previous pair, already queued
    a_queued: bool,
    pairs_bridged: u64,
}

impl SampleBridge {
    pub fn new(interpolator: Interpolator) -> Self {
        Self {
            interpolator,
            slot_a: Sample::default(),
            a_arrived_at: None,
            a_queued: false,
            pairs_bridged: 0,
        }
    }

    /// Push a decoded sample arriving now.
    pub fn push(&mut self, sample: Sample) -> Option<Bridged> {
        self.push_at(sample, Instant::now())
    }

    /// Push a decoded sample that arrived at `arrived_at`.
    ///
    /// Returns `None` when the sample only filled slot A. Unpopulated
    /// placeholders are ignored.
    pub fn push_at(&mut self, sample: Sample, arrived_at: Instant) -> Option<Bridged> {
        if !sample.populated {
            return None;
        }

        let Some(a_arrived_at) = self.a_arrived_at else {
            self.slot_a = sample;
            self.a_arrived_at = Some(arrived_at);
            self.a_queued = false;
            trace!("bridge slot A filled");
            return None;
        };

        let elapsed = arrived_at.saturating_duration_since(a_arrived_at);
        let samples = self.interpolator.between(self.slot_a, sample, elapsed);
        let steps = samples.steps();

        // A retired continuation equals the previous pair's last sample
        let skip = usize::from(!self.slot_a.populated && self.a_queued);

        self.slot_a = Sample {
            populated: false,
            ..sample
        };
        self.a_arrived_at = Some(arrived_at);
        self.a_queued = steps >= 1;
        self.pairs_bridged += 1;

        trace!(
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            steps,
            skip,
            "pair bridged"
        );

        Some(Bridged {
            elapsed,
            samples: samples.skip(skip),
        })
    }

    /// Back to EMPTY; the next sample starts a fresh pair.
    pub fn reset(&mut self) {
        self.slot_a = Sample::default();
        self.a_arrived_at = None;
        self.a_queued = false;
    }

    /// Slot A, populated only while it holds a fresh, un-bridged sample
    pub fn slot_a(&self) -> &Sample {
        &self.slot_a
    }

    pub fn is_empty(&self) -> bool {
        self.a_arrived_at.is_none()
    }

    pub fn pairs_bridged(&self) -> u64 {
        self.pairs_bridged
    }
}
