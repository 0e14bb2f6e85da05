//! Telemetry channels
//!
//! The fixed set of named motion channels a [`Sample`](crate::Sample) carries,
//! and the static name table consumers use to discover and look them up.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownTelemetryValue;

/// A single named motion channel.
///
/// The serialized form and [`Channel::name`] are the consumer-facing names
/// (`"Pitch"`, `"AirSpeed"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    Pitch,
    Roll,
    Yaw,
    Sway,
    Surge,
    Heave,
    AirSpeed,
    GroundSpeed,
    AngularVelocityPitch,
    AngularVelocityRoll,
    AngularVelocityHeading,
    AccelerationX,
    AccelerationY,
    AccelerationZ,
}

impl Channel {
    /// Every channel, in declaration order.
    pub const ALL: [Channel; 14] = [
        Channel::Pitch,
        Channel::Roll,
        Channel::Yaw,
        Channel::Sway,
        Channel::Surge,
        Channel::Heave,
        Channel::AirSpeed,
        Channel::GroundSpeed,
        Channel::AngularVelocityPitch,
        Channel::AngularVelocityRoll,
        Channel::AngularVelocityHeading,
        Channel::AccelerationX,
        Channel::AccelerationY,
        Channel::AccelerationZ,
    ];

    /// Channels checked by the "no data" sentinel test.
    pub const MOTION: [Channel; 8] = [
        Channel::Surge,
        Channel::Heave,
        Channel::Roll,
        Channel::Yaw,
        Channel::Pitch,
        Channel::AirSpeed,
        Channel::GroundSpeed,
        Channel::Sway,
    ];

    /// Consumer-facing channel name.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Pitch => "Pitch",
            Channel::Roll => "Roll",
            Channel::Yaw => "Yaw",
            Channel::Sway => "Sway",
            Channel::Surge => "Surge",
            Channel::Heave => "Heave",
            Channel::AirSpeed => "AirSpeed",
            Channel::GroundSpeed => "GroundSpeed",
            Channel::AngularVelocityPitch => "AngularVelocityPitch",
            Channel::AngularVelocityRoll => "AngularVelocityRoll",
            Channel::AngularVelocityHeading => "AngularVelocityHeading",
            Channel::AccelerationX => "AccelerationX",
            Channel::AccelerationY => "AccelerationY",
            Channel::AccelerationZ => "AccelerationZ",
        }
    }

    /// Unit of the converted value.
    pub const fn unit(self) -> &'static str {
        match self {
            Channel::Pitch | Channel::Roll | Channel::Yaw => "deg",
            Channel::AngularVelocityPitch
            | Channel::AngularVelocityRoll
            | Channel::AngularVelocityHeading => "deg/s",
            Channel::AirSpeed | Channel::GroundSpeed => "m/s",
            Channel::AccelerationX | Channel::AccelerationY | Channel::AccelerationZ => "g",
            // Linear motion cues are normalized, unit depends on the wire format
            Channel::Sway | Channel::Surge | Channel::Heave => "",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = UnknownTelemetryValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownTelemetryValue::new(s))
    }
}

/// Set of channels exposed by one transport variant.
///
/// Stored as a bit mask so it is `Copy` and can ride along with every update.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Channel>", into = "Vec<Channel>")]
pub struct ChannelSet(u16);

impl ChannelSet {
    /// Empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set containing every channel.
    pub fn all() -> Self {
        Channel::ALL.iter().copied().collect()
    }

    /// Add a channel.
    pub fn insert(&mut self, channel: Channel) {
        self.0 |= channel.bit();
    }

    /// Check membership.
    pub const fn contains(&self, channel: Channel) -> bool {
        self.0 & channel.bit() != 0
    }

    /// Number of channels in the set.
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check if the set is empty.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate channels in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.iter().copied().filter(|c| self.contains(*c))
    }

    /// Channel names in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(Channel::name).collect()
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        let mut set = ChannelSet::empty();
        for channel in iter {
            set.insert(channel);
        }
        set
    }
}

impl From<Vec<Channel>> for ChannelSet {
    fn from(channels: Vec<Channel>) -> Self {
        channels.into_iter().collect()
    }
}

impl From<ChannelSet> for Vec<Channel> {
    fn from(set: ChannelSet) -> Self {
        set.iter().collect()
    }
}
