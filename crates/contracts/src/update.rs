//! TelemetryUpdate - Delivery loop output
//!
//! One emission to the host: the current sample, its predecessor and the
//! ambient health flags. Consumers read channels by name through
//! [`TelemetryInfo`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Channel, ChannelSet, Sample, UnknownTelemetryValue};

/// One "telemetry updated" notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryUpdate {
    /// Emission counter, +1 per update
    pub sequence: u64,

    /// Sample being emitted
    pub current: Sample,

    /// Previously emitted sample (equal to `current` on a repeat)
    pub previous: Sample,

    pub connected: bool,
    pub running: bool,

    /// Channels the active transport exposes
    pub channels: ChannelSet,

    /// `true` when the queue was empty and the last sample was re-emitted
    pub repeated: bool,
}

/// A single channel value resolved by name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryValue {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl TelemetryValue {
    pub fn new(channel: Channel, value: f64) -> Self {
        Self {
            name: channel.name(),
            value,
            unit: channel.unit(),
        }
    }
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

/// Named-value access over a telemetry source.
pub trait TelemetryInfo {
    /// Channels available through [`TelemetryInfo::value_by_name`].
    fn channels(&self) -> ChannelSet;

    /// Sample values are read from.
    fn sample(&self) -> &Sample;

    /// Resolve one channel by its consumer-facing name.
    ///
    /// # Errors
    /// [`UnknownTelemetryValue`] if the name is not a channel, or the channel
    /// is not exposed by the active transport.
    fn value_by_name(&self, name: &str) -> Result<TelemetryValue, UnknownTelemetryValue> {
        let channel: Channel = name.parse()?;
        if !self.channels().contains(channel) {
            return Err(UnknownTelemetryValue::new(name));
        }
        Ok(TelemetryValue::new(channel, self.sample().get(channel)))
    }

    /// Capability listing: exposed channel names.
    fn channel_names(&self) -> Vec<&'static str> {
        self.channels().names()
    }
}

impl TelemetryInfo for TelemetryUpdate {
    fn channels(&self) -> ChannelSet {
        self.channels
    }

    fn sample(&self) -> &Sample {
        &self.current
    }
}
