//! Configuration → provider contracts and the update wire shape.

use config_loader::{ConfigFormat, ConfigLoader};
use contracts::{Channel, ChannelSet, Sample, TelemetryInfo, TelemetryUpdate};
use provider::TelemetryProvider;

const REFERENCE_TOML: &str = r#"
[provider]
name = "aeroflyfs2"
output_period_ms = 10

[transport]
kind = "udp"
bind_address = "0.0.0.0"
port = 4123
no_data_timeout_ms = 200
wire_format = "aerofly_fs2_v2"

[health]
link_down_backoff_ms = 1000
fault_backoff_ms = 1000

[[sinks]]
name = "log"
sink_type = "log"
"#;

#[test]
fn test_reference_config_builds_provider() {
    let blueprint = ConfigLoader::load_from_str(REFERENCE_TOML, ConfigFormat::Toml).unwrap();
    let provider = TelemetryProvider::new(blueprint).unwrap();
    assert_eq!(provider.name(), "aeroflyfs2");
    assert_eq!(
        provider.value_list(),
        vec!["Pitch", "Roll", "Yaw", "Sway", "Surge", "Heave", "AirSpeed", "GroundSpeed"]
    );
    assert_eq!(provider.layout().required_fields(), 11);
}

#[test]
fn test_custom_layout_defines_value_list() {
    let content = r#"
[transport]
kind = "udp"
wire_format = "custom"

[transport.custom_layout]
encoding = { type = "delimited_text", delimiter = "," }

[[transport.custom_layout.fields]]
index = 2
channel = "AirSpeed"
conversion = { kind = "identity" }

[[transport.custom_layout.fields]]
index = 0
channel = "Pitch"
conversion = { kind = "angle" }
"#;
    let blueprint = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
    let provider = TelemetryProvider::new(blueprint).unwrap();
    assert_eq!(provider.value_list(), vec!["Pitch", "AirSpeed"]);
    assert_eq!(provider.layout().required_fields(), 3);
}

#[test]
fn test_legacy_build_is_selectable() {
    let content = "[transport]\nkind = \"udp\"\nwire_format = \"aerofly_fs2_v1\"\n";
    let blueprint = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
    let provider = TelemetryProvider::new(blueprint).unwrap();
    assert_eq!(provider.layout().required_fields(), 10);
}

#[test]
fn test_update_json_shape() {
    let current = Sample::default()
        .with(Channel::Pitch, 1.5)
        .with(Channel::AirSpeed, 61.0)
        .populated();
    let update = TelemetryUpdate {
        sequence: 3,
        current,
        previous: Sample::default(),
        connected: true,
        running: true,
        channels: ChannelSet::all(),
        repeated: false,
    };

    let json = serde_json::to_value(update).unwrap();
    for key in [
        "sequence", "current", "previous", "connected", "running", "channels", "repeated",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["current"]["pitch"], 1.5);

    let parsed: TelemetryUpdate = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.value_by_name("AirSpeed").unwrap().value, 61.0);
}
