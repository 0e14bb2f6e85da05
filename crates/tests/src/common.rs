//! Shared fixtures.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{ProviderBlueprint, TelemetryUpdate};
use provider::TelemetryProvider;

/// 0.9 rad in degrees
pub const PITCH_900_MRAD_DEG: f64 = 51.566_201_561_7;

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Current-build text frame with the given raw pitch and 61 m/s airspeed
pub fn v2_frame(pitch_mrad: f64) -> String {
    format!("{pitch_mrad};0;0;0;0;0;0;0;0;61;0")
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

pub type Recorded = Arc<Mutex<Vec<TelemetryUpdate>>>;

/// Provider with a subscriber that records every update
pub fn recording_provider(blueprint: ProviderBlueprint) -> (TelemetryProvider, Recorded) {
    let mut provider = TelemetryProvider::new(blueprint).unwrap();
    let seen: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    provider.subscribe(move |u: &TelemetryUpdate| sink_seen.lock().unwrap().push(*u));
    (provider, seen)
}

/// Pitch values of the non-repeated updates
pub fn fresh_pitches(seen: &Recorded) -> Vec<f64> {
    seen.lock()
        .unwrap()
        .iter()
        .filter(|u| !u.repeated)
        .map(|u| u.current.pitch)
        .collect()
}

pub fn assert_consecutive(seen: &Recorded) {
    let seen = seen.lock().unwrap();
    assert!(
        seen.windows(2).all(|w| w[1].sequence == w[0].sequence + 1),
        "sequence numbers must be consecutive"
    );
}
