//! Wire layout descriptors
//!
//! A [`WireLayout`] is an explicit, versioned field-index → channel table.
//! The pinned tables for supported simulator builds live in
//! `ingestion::layouts`; `custom` configurations carry their own table.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Channel, ChannelSet};

/// Supported wire formats (config key `wire_format`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Legacy 10-field text build (heave/surge swapped)
    AeroflyFs2V1,
    /// Current 11-field text build
    #[default]
    AeroflyFs2V2,
    /// 9 little-endian doubles in a shared-memory block
    SharedMemoryV1,
    /// Table supplied through `custom_layout`
    Custom,
}

impl WireFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::AeroflyFs2V1 => "aerofly_fs2_v1",
            WireFormat::AeroflyFs2V2 => "aerofly_fs2_v2",
            WireFormat::SharedMemoryV1 => "shared_memory_v1",
            WireFormat::Custom => "custom",
        }
    }
}

/// How one frame is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameEncoding {
    /// Text line split on a single delimiter character
    DelimitedText { delimiter: char },
    /// Packed little-endian `f64` values, one per field index
    PackedF64,
}

/// Raw angle unit on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleScaling {
    /// Radians × 1000
    #[default]
    Milliradians,
    /// Plain radians, pre-scaled upstream
    Radians,
}

/// Raw → physical conversion applied to one field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conversion {
    /// Angle to degrees using the layout's [`AngleScaling`], optionally
    /// wrapped at a rig limit.
    Angle {
        #[serde(default)]
        wrap_limit_deg: Option<f64>,
    },
    /// Multiply by a constant factor.
    Scale { factor: f64 },
    /// Divide by standard gravity.
    Acceleration,
    /// Pass through.
    Identity,
}

impl Conversion {
    pub const fn angle() -> Self {
        Conversion::Angle {
            wrap_limit_deg: None,
        }
    }

    pub const fn wrapped_angle(limit_deg: f64) -> Self {
        Conversion::Angle {
            wrap_limit_deg: Some(limit_deg),
        }
    }

    pub const fn scale(factor: f64) -> Self {
        Conversion::Scale { factor }
    }
}

/// One entry of the field table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field index (text) or double offset (binary)
    pub index: usize,
    pub channel: Channel,
    pub conversion: Conversion,
}

impl FieldSpec {
    pub const fn new(index: usize, channel: Channel, conversion: Conversion) -> Self {
        Self {
            index,
            channel,
            conversion,
        }
    }
}

/// Complete description of one wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WireLayout {
    pub encoding: FrameEncoding,

    #[serde(default)]
    pub angle_scaling: AngleScaling,

    /// Field table; an index may feed several channels
    #[validate(length(min = 1))]
    pub fields: Vec<FieldSpec>,
}

impl WireLayout {
    /// Number of fields a frame must carry to decode fully.
    pub fn required_fields(&self) -> usize {
        self.fields.iter().map(|f| f.index + 1).max().unwrap_or(0)
    }

    /// Channels this layout exposes.
    pub fn channels(&self) -> ChannelSet {
        self.fields.iter().map(|f| f.channel).collect()
    }

    /// Same table with a different angle unit.
    pub fn with_angle_scaling(mut self, scaling: AngleScaling) -> Self {
        self.angle_scaling = scaling;
        self
    }
}
