//! Sample - decoded telemetry at one instant
//!
//! Value object produced by the frame decoder and the interpolator, consumed
//! by the delivery loop. Always fully allocated: absent channels are zero.

use serde::{Deserialize, Serialize};

use crate::Channel;

/// Converted telemetry channels at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Pitch (deg)
    pub pitch: f64,
    /// Roll (deg)
    pub roll: f64,
    /// Yaw / heading (deg)
    pub yaw: f64,
    pub sway: f64,
    pub surge: f64,
    pub heave: f64,
    /// Indicated airspeed (m/s), unscaled from the wire
    pub airspeed: f64,
    /// Ground speed (m/s)
    pub groundspeed: f64,
    /// Angular velocities (deg/s)
    pub angular_velocity_pitch: f64,
    pub angular_velocity_roll: f64,
    pub angular_velocity_heading: f64,
    /// Accelerometer axes (g)
    pub acceleration_x: f64,
    pub acceleration_y: f64,
    pub acceleration_z: f64,

    /// `true` for decoded or interpolated data, `false` for a placeholder.
    pub populated: bool,
}

impl Sample {
    /// Read one channel.
    #[inline]
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Pitch => self.pitch,
            Channel::Roll => self.roll,
            Channel::Yaw => self.yaw,
            Channel::Sway => self.sway,
            Channel::Surge => self.surge,
            Channel::Heave => self.heave,
            Channel::AirSpeed => self.airspeed,
            Channel::GroundSpeed => self.groundspeed,
            Channel::AngularVelocityPitch => self.angular_velocity_pitch,
            Channel::AngularVelocityRoll => self.angular_velocity_roll,
            Channel::AngularVelocityHeading => self.angular_velocity_heading,
            Channel::AccelerationX => self.acceleration_x,
            Channel::AccelerationY => self.acceleration_y,
            Channel::AccelerationZ => self.acceleration_z,
        }
    }

    /// Write one channel.
    #[inline]
    pub fn set(&mut self, channel: Channel, value: f64) {
        let slot = match channel {
            Channel::Pitch => &mut self.pitch,
            Channel::Roll => &mut self.roll,
            Channel::Yaw => &mut self.yaw,
            Channel::Sway => &mut self.sway,
            Channel::Surge => &mut self.surge,
            Channel::Heave => &mut self.heave,
            Channel::AirSpeed => &mut self.airspeed,
            Channel::GroundSpeed => &mut self.groundspeed,
            Channel::AngularVelocityPitch => &mut self.angular_velocity_pitch,
            Channel::AngularVelocityRoll => &mut self.angular_velocity_roll,
            Channel::AngularVelocityHeading => &mut self.angular_velocity_heading,
            Channel::AccelerationX => &mut self.acceleration_x,
            Channel::AccelerationY => &mut self.acceleration_y,
            Channel::AccelerationZ => &mut self.acceleration_z,
        };
        *slot = value;
    }

    /// Builder-style [`Sample::set`].
    pub fn with(mut self, channel: Channel, value: f64) -> Self {
        self.set(channel, value);
        self
    }

    /// Mark as populated.
    pub fn populated(mut self) -> Self {
        self.populated = true;
        self
    }

    /// Sentinel "no data" test: every motion channel is exactly zero.
    ///
    /// A motionless aircraft on the ground is indistinguishable from this.
    pub fn is_empty_telemetry(&self) -> bool {
        Channel::MOTION.iter().all(|c| self.get(*c) == 0.0)
    }
}

/// Provenance of a queued sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrigin {
    /// Decoded directly from a frame
    Real,
    /// Produced by interpolation between two real samples
    Synthetic,
}

/// Delivery queue entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedSample {
    pub sample: Sample,
    pub origin: SampleOrigin,
}

impl QueuedSample {
    pub fn real(sample: Sample) -> Self {
        Self {
            sample,
            origin: SampleOrigin::Real,
        }
    }

    pub fn synthetic(sample: Sample) -> Self {
        Self {
            sample,
            origin: SampleOrigin::Synthetic,
        }
    }
}
