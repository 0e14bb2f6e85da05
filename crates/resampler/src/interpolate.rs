//! Two-sample linear interpolation
//!
//! Given A, B and the interval between their arrivals, produces the samples
//! the output cadence would have seen in between.

use std::time::Duration;

use contracts::{ChannelSet, QueuedSample, Sample};

/// Linear interpolation: `a + f·(b − a)`.
#[inline]
pub fn lerp(a: f64, b: f64, f: f64) -> f64 {
    a + f * (b - a)
}

/// `floor(elapsed / period)`; zero for a zero period.
#[inline]
pub fn step_count(elapsed: Duration, period: Duration) -> usize {
    if period.is_zero() {
        return 0;
    }
    (elapsed.as_nanos() / period.as_nanos()) as usize
}

/// Interpolator bound to an output cadence and a channel set
#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    period: Duration,
    channels: ChannelSet,
}

impl Interpolator {
    pub fn new(period: Duration, channels: ChannelSet) -> Self {
        Self { period, channels }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Lazy sequence of `steps + 1` samples from A towards B.
    pub fn between(&self, a: Sample, b: Sample, elapsed: Duration) -> Interpolate {
        Interpolate {
            a,
            b,
            channels: self.channels,
            steps: step_count(elapsed, self.period),
            next: 0,
        }
    }
}

/// Iterator returned by [`Interpolator::between`]
#[derive(Debug, Clone)]
pub struct Interpolate {
    a: Sample,
    b: Sample,
    channels: ChannelSet,
    steps: usize,
    next: usize,
}

impl Interpolate {
    /// `floor(elapsed / period)`
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn fraction(&self, i: usize) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            i as f64 / self.steps as f64
        }
    }
}

impl Iterator for Interpolate {
    type Item = QueuedSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.steps {
            return None;
        }
        let i = self.next;
        self.next += 1;

        let f = self.fraction(i);
        let mut sample = Sample::default();
        for channel in self.channels.iter() {
            sample.set(channel, lerp(self.a.get(channel), self.b.get(channel), f));
        }
        sample.populated = true;

        Some(if i == 0 || i == self.steps {
            QueuedSample::real(sample)
        } else {
            QueuedSample::synthetic(sample)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Interpolate {}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Channel, SampleOrigin};

    const PERIOD: Duration = Duration::from_millis(10);

    fn interpolator() -> Interpolator {
        Interpolator::new(PERIOD, ChannelSet::all())
    }

    fn pitch(value: f64) -> Sample {
        Sample::default().with(Channel::Pitch, value).populated()
    }

    #[test]
    fn test_lerp_endpoints_and_monotonic() {
        assert_eq!(lerp(2.0, 8.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 8.0, 1.0), 8.0);
        let mut prev = lerp(2.0, 8.0, 0.0);
        for i in 1..=10 {
            let v = lerp(2.0, 8.0, i as f64 / 10.0);
            assert!(v > prev);
            prev = v;
        }
    }

    #[test]
    fn test_step_count_floors() {
        assert_eq!(step_count(Duration::from_millis(35), PERIOD), 3);
        assert_eq!(step_count(Duration::from_millis(9), PERIOD), 0);
        assert_eq!(step_count(Duration::from_millis(10), PERIOD), 1);
        assert_eq!(step_count(Duration::from_millis(10), Duration::ZERO), 0);
    }

    #[test]
    fn test_35ms_yields_four_samples() {
        let samples: Vec<_> = interpolator()
            .between(pitch(0.0), pitch(30.0), Duration::from_millis(35))
            .collect();

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].sample.pitch, 0.0);
        let last = samples[3].sample.pitch;
        assert!((30.0 - last).abs() < (last - 0.0).abs());
        for (s, expected) in samples.iter().zip([0.0, 10.0, 20.0, 30.0]) {
            assert!((s.sample.pitch - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_steps_yields_a_only() {
        let a = pitch(5.0);
        let samples: Vec<_> = interpolator()
            .between(a, pitch(9.0), Duration::from_millis(4))
            .collect();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].sample, a);
        assert_eq!(samples[0].origin, SampleOrigin::Real);
    }

    #[test]
    fn test_every_sample_populated_and_origins_tagged() {
        let samples: Vec<_> = interpolator()
            .between(pitch(0.0), pitch(1.0), Duration::from_millis(30))
            .collect();
        assert!(samples.iter().all(|s| s.sample.populated));
        let origins: Vec<_> = samples.iter().map(|s| s.origin).collect();
        assert_eq!(
            origins,
            vec![
                SampleOrigin::Real,
                SampleOrigin::Synthetic,
                SampleOrigin::Synthetic,
                SampleOrigin::Real
            ]
        );
    }

    #[test]
    fn test_channels_outside_set_pass_through_as_zero() {
        let channels: ChannelSet = [Channel::Pitch].into_iter().collect();
        let a = pitch(0.0).with(Channel::Roll, 4.0);
        let b = pitch(10.0).with(Channel::Roll, 8.0);
        let samples: Vec<_> = Interpolator::new(PERIOD, channels)
            .between(a, b, Duration::from_millis(20))
            .collect();
        assert!(samples.iter().all(|s| s.sample.roll == 0.0));
        assert_eq!(samples[1].sample.pitch, 5.0);
    }

    #[test]
    fn test_exact_size() {
        let iter = interpolator().between(pitch(0.0), pitch(1.0), Duration::from_millis(57));
        assert_eq!(iter.len(), 6);
        assert_eq!(iter.steps(), 5);
    }
}
