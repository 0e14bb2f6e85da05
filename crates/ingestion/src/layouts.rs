//! Pinned wire layouts per supported simulator build
//!
//! Index assignment differs between builds; each table is versioned and
//! never inferred.

use contracts::{
    AngleScaling, Channel, ContractError, Conversion, FieldSpec, FrameEncoding, TransportConfig,
    WireFormat, WireLayout,
};

/// Rig limit for pitch and roll.
pub const RIG_WRAP_LIMIT_DEG: f64 = 90.0;

/// Field delimiter used by the Aerofly FS 2 text builds.
pub const AEROFLY_DELIMITER: char = ';';

/// Current external-DLL build: 11 fields. Angles and the sway/heave cues
/// arrive × 1000; surge and the speeds pass through unscaled.
///
/// Fields 6..=8 are carried on the wire but not mapped.
pub fn aerofly_fs2_v2() -> WireLayout {
    WireLayout {
        encoding: FrameEncoding::DelimitedText {
            delimiter: AEROFLY_DELIMITER,
        },
        angle_scaling: AngleScaling::Milliradians,
        fields: vec![
            FieldSpec::new(0, Channel::Pitch, Conversion::wrapped_angle(RIG_WRAP_LIMIT_DEG)),
            FieldSpec::new(1, Channel::Roll, Conversion::wrapped_angle(RIG_WRAP_LIMIT_DEG)),
            FieldSpec::new(2, Channel::Yaw, Conversion::angle()),
            FieldSpec::new(3, Channel::Sway, Conversion::scale(0.001)),
            FieldSpec::new(4, Channel::Heave, Conversion::scale(-0.001)),
            FieldSpec::new(5, Channel::Surge, Conversion::Identity),
            FieldSpec::new(9, Channel::AirSpeed, Conversion::Identity),
            FieldSpec::new(10, Channel::GroundSpeed, Conversion::Identity),
        ],
    }
}

/// Legacy 10-field build with heave and surge swapped.
pub fn aerofly_fs2_v1() -> WireLayout {
    WireLayout {
        encoding: FrameEncoding::DelimitedText {
            delimiter: AEROFLY_DELIMITER,
        },
        angle_scaling: AngleScaling::Milliradians,
        fields: vec![
            FieldSpec::new(0, Channel::Pitch, Conversion::wrapped_angle(RIG_WRAP_LIMIT_DEG)),
            FieldSpec::new(1, Channel::Roll, Conversion::wrapped_angle(RIG_WRAP_LIMIT_DEG)),
            FieldSpec::new(2, Channel::Yaw, Conversion::angle()),
            FieldSpec::new(3, Channel::Sway, Conversion::scale(0.001)),
            FieldSpec::new(4, Channel::Surge, Conversion::Identity),
            FieldSpec::new(5, Channel::Heave, Conversion::scale(-0.001)),
            FieldSpec::new(8, Channel::AirSpeed, Conversion::Identity),
            FieldSpec::new(9, Channel::GroundSpeed, Conversion::Identity),
        ],
    }
}

/// Shared-memory block: 9 little-endian doubles, angles in radians.
///
/// `pitch, roll, yaw, ang_vel_pitch, ang_vel_roll, ang_vel_heading, acc_x, acc_y, acc_z`
pub fn shared_memory_v1() -> WireLayout {
    WireLayout {
        encoding: FrameEncoding::PackedF64,
        angle_scaling: AngleScaling::Radians,
        fields: vec![
            FieldSpec::new(0, Channel::Pitch, Conversion::wrapped_angle(RIG_WRAP_LIMIT_DEG)),
            FieldSpec::new(1, Channel::Roll, Conversion::wrapped_angle(RIG_WRAP_LIMIT_DEG)),
            FieldSpec::new(2, Channel::Yaw, Conversion::angle()),
            FieldSpec::new(3, Channel::AngularVelocityPitch, Conversion::angle()),
            FieldSpec::new(4, Channel::AngularVelocityRoll, Conversion::angle()),
            FieldSpec::new(5, Channel::AngularVelocityHeading, Conversion::angle()),
            FieldSpec::new(6, Channel::AccelerationX, Conversion::Acceleration),
            FieldSpec::new(6, Channel::Sway, Conversion::Acceleration),
            FieldSpec::new(7, Channel::AccelerationY, Conversion::Acceleration),
            FieldSpec::new(7, Channel::Surge, Conversion::Acceleration),
            FieldSpec::new(8, Channel::AccelerationZ, Conversion::Acceleration),
            FieldSpec::new(8, Channel::Heave, Conversion::Acceleration),
        ],
    }
}

/// Pinned table for a built-in format; `None` for [`WireFormat::Custom`].
pub fn builtin(format: WireFormat) -> Option<WireLayout> {
    match format {
        WireFormat::AeroflyFs2V1 => Some(aerofly_fs2_v1()),
        WireFormat::AeroflyFs2V2 => Some(aerofly_fs2_v2()),
        WireFormat::SharedMemoryV1 => Some(shared_memory_v1()),
        WireFormat::Custom => None,
    }
}

/// Resolve the effective layout for a transport, applying the
/// `angle_scaling` override.
///
/// # Errors
/// `custom` wire format without a `custom_layout` table.
pub fn resolve(transport: &TransportConfig) -> Result<WireLayout, ContractError> {
    let layout = match transport.wire_format() {
        WireFormat::Custom => transport.custom_layout().cloned().ok_or_else(|| {
            ContractError::config_validation(
                "transport.custom_layout",
                "wire_format 'custom' requires a custom_layout table",
            )
        })?,
        format => builtin(format).ok_or_else(|| {
            ContractError::config_validation("transport.wire_format", "unknown wire format")
        })?,
    };

    Ok(match transport.angle_scaling() {
        Some(scaling) => layout.with_angle_scaling(scaling),
        None => layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SharedMemoryTransportConfig, UdpTransportConfig};

    #[test]
    fn test_required_field_counts() {
        assert_eq!(aerofly_fs2_v2().required_fields(), 11);
        assert_eq!(aerofly_fs2_v1().required_fields(), 10);
        assert_eq!(shared_memory_v1().required_fields(), 9);
    }

    #[test]
    fn test_text_builds_expose_core_channels() {
        for layout in [aerofly_fs2_v1(), aerofly_fs2_v2()] {
            let names = layout.channels().names();
            assert_eq!(
                names,
                vec!["Pitch", "Roll", "Yaw", "Sway", "Surge", "Heave", "AirSpeed", "GroundSpeed"]
            );
        }
    }

    #[test]
    fn test_shared_memory_exposes_auxiliary_channels() {
        let channels = shared_memory_v1().channels();
        assert!(channels.contains(Channel::AccelerationZ));
        assert!(channels.contains(Channel::AngularVelocityHeading));
        assert!(!channels.contains(Channel::AirSpeed));
    }

    #[test]
    fn test_v1_v2_swap_heave_and_surge() {
        let index_of = |layout: &WireLayout, channel: Channel| {
            layout
                .fields
                .iter()
                .find(|f| f.channel == channel)
                .map(|f| f.index)
        };
        let (v1, v2) = (aerofly_fs2_v1(), aerofly_fs2_v2());
        assert_eq!(index_of(&v1, Channel::Heave), index_of(&v2, Channel::Surge));
        assert_eq!(index_of(&v1, Channel::Surge), index_of(&v2, Channel::Heave));
    }

    #[test]
    fn test_speeds_pass_through_unscaled() {
        for layout in [aerofly_fs2_v1(), aerofly_fs2_v2()] {
            for field in &layout.fields {
                if matches!(field.channel, Channel::AirSpeed | Channel::GroundSpeed) {
                    assert_eq!(field.conversion, Conversion::Identity);
                }
            }
        }
    }

    #[test]
    fn test_resolve_applies_angle_override() {
        let transport = TransportConfig::Udp(UdpTransportConfig {
            angle_scaling: Some(AngleScaling::Radians),
            ..UdpTransportConfig::default()
        });
        let layout = resolve(&transport).unwrap();
        assert_eq!(layout.angle_scaling, AngleScaling::Radians);
        assert_eq!(layout.fields, aerofly_fs2_v2().fields);
    }

    #[test]
    fn test_resolve_custom_without_table_fails() {
        let transport = TransportConfig::SharedMemory(SharedMemoryTransportConfig {
            name: "motion".into(),
            root: "/dev/shm".into(),
            no_data_timeout_ms: 500,
            poll_period_ms: None,
            wire_format: WireFormat::Custom,
            custom_layout: None,
            angle_scaling: None,
        });
        assert!(resolve(&transport).is_err());
    }
}
