//! Raw simulator units → physical units
//!
//! Pure, stateless conversions applied by the frame decoder.

use contracts::{AngleScaling, Conversion};

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Milliradians (radians × 1000) to degrees.
#[inline]
pub fn radians_scaled_to_degrees(raw: f64) -> f64 {
    (raw / 1000.0).to_degrees()
}

/// Plain radians to degrees, for transports that pre-scale upstream.
#[inline]
pub fn radians_to_degrees(raw: f64) -> f64 {
    raw.to_degrees()
}

/// Rig angular wrap at a rotational limit.
///
/// Within `[-limit, limit]` (inclusive) the angle is returned unchanged,
/// beyond it the platform re-enters from the opposite side: `180·sign(a) − a`.
#[inline]
pub fn wrap_angle(angle_deg: f64, limit_deg: f64) -> f64 {
    if angle_deg.abs() <= limit_deg {
        angle_deg
    } else {
        180.0 * angle_deg.signum() - angle_deg
    }
}

/// Acceleration (m/s²) to g.
#[inline]
pub fn acceleration_to_g(raw: f64) -> f64 {
    raw / STANDARD_GRAVITY
}

/// Angle in the given wire unit to degrees.
#[inline]
pub fn angle_to_degrees(raw: f64, scaling: AngleScaling) -> f64 {
    match scaling {
        AngleScaling::Milliradians => radians_scaled_to_degrees(raw),
        AngleScaling::Radians => radians_to_degrees(raw),
    }
}

/// Apply one field conversion.
pub fn convert(raw: f64, conversion: Conversion, scaling: AngleScaling) -> f64 {
    match conversion {
        Conversion::Angle { wrap_limit_deg } => {
            let degrees = angle_to_degrees(raw, scaling);
            match wrap_limit_deg {
                Some(limit) => wrap_angle(degrees, limit),
                None => degrees,
            }
        }
        Conversion::Scale { factor } => raw * factor,
        Conversion::Acceleration => acceleration_to_g(raw),
        Conversion::Identity => raw,
    }
}
