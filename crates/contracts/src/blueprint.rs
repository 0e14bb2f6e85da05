//! ProviderBlueprint - Config Loader output
//!
//! Describes one telemetry provider: output cadence, transport, health
//! back-off and output routing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::{AngleScaling, WireFormat, WireLayout};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProviderBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    #[serde(default)]
    #[validate(nested)]
    pub provider: ProviderConfig,

    #[serde(default)]
    #[validate(nested)]
    pub transport: TransportConfig,

    #[serde(default)]
    #[validate(nested)]
    pub health: HealthConfig,

    /// Output routing
    #[serde(default)]
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

/// Provider identity and output cadence
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProviderConfig {
    /// Provider name reported to the host
    #[serde(default = "default_provider_name")]
    #[validate(length(min = 1))]
    pub name: String,

    /// Delivery loop period and interpolation sub-interval
    #[serde(default = "default_output_period_ms")]
    #[validate(range(min = 1, max = 1000))]
    pub output_period_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            output_period_ms: default_output_period_ms(),
        }
    }
}

impl ProviderConfig {
    pub fn output_period(&self) -> Duration {
        Duration::from_millis(self.output_period_ms)
    }
}

fn default_provider_name() -> String {
    "aeroflyfs2".to_string()
}

fn default_output_period_ms() -> u64 {
    10
}

/// Transport selection, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    Udp(UdpTransportConfig),
    SharedMemory(SharedMemoryTransportConfig),
    Replay(ReplayTransportConfig),
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Udp(UdpTransportConfig::default())
    }
}

impl Validate for TransportConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            TransportConfig::Udp(c) => c.validate(),
            TransportConfig::SharedMemory(c) => c.validate(),
            TransportConfig::Replay(c) => c.validate(),
        }
    }
}

impl TransportConfig {
    /// Short transport kind for logs
    pub fn kind(&self) -> &'static str {
        match self {
            TransportConfig::Udp(_) => "udp",
            TransportConfig::SharedMemory(_) => "shared_memory",
            TransportConfig::Replay(_) => "replay",
        }
    }

    pub fn wire_format(&self) -> WireFormat {
        match self {
            TransportConfig::Udp(c) => c.wire_format,
            TransportConfig::SharedMemory(c) => c.wire_format,
            TransportConfig::Replay(c) => c.wire_format,
        }
    }

    pub fn custom_layout(&self) -> Option<&WireLayout> {
        match self {
            TransportConfig::Udp(c) => c.custom_layout.as_ref(),
            TransportConfig::SharedMemory(c) => c.custom_layout.as_ref(),
            TransportConfig::Replay(c) => c.custom_layout.as_ref(),
        }
    }

    /// Per-transport angle unit override
    pub fn angle_scaling(&self) -> Option<AngleScaling> {
        match self {
            TransportConfig::Udp(c) => c.angle_scaling,
            TransportConfig::SharedMemory(c) => c.angle_scaling,
            TransportConfig::Replay(c) => c.angle_scaling,
        }
    }

    /// Silence longer than this marks the link down
    pub fn no_data_timeout(&self) -> Duration {
        let ms = match self {
            TransportConfig::Udp(c) => c.no_data_timeout_ms,
            TransportConfig::SharedMemory(c) => c.no_data_timeout_ms,
            TransportConfig::Replay(c) => c.no_data_timeout_ms,
        };
        Duration::from_millis(ms)
    }
}

/// UDP datagram transport
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UdpTransportConfig {
    #[serde(default = "default_bind_address")]
    #[validate(length(min = 1))]
    pub bind_address: String,

    #[serde(default = "default_udp_port")]
    pub port: u16,

    #[serde(default = "default_udp_no_data_timeout_ms")]
    #[validate(range(min = 1))]
    pub no_data_timeout_ms: u64,

    #[serde(default)]
    pub wire_format: WireFormat,

    #[serde(default)]
    #[validate(nested)]
    pub custom_layout: Option<WireLayout>,

    #[serde(default)]
    pub angle_scaling: Option<AngleScaling>,

    /// Receive buffer size
    #[serde(default = "default_max_datagram_size")]
    #[validate(range(min = 16, max = 65507))]
    pub max_datagram_size: usize,
}

impl Default for UdpTransportConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_udp_port(),
            no_data_timeout_ms: default_udp_no_data_timeout_ms(),
            wire_format: WireFormat::default(),
            custom_layout: None,
            angle_scaling: None,
            max_datagram_size: default_max_datagram_size(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_udp_port() -> u16 {
    4123
}

fn default_udp_no_data_timeout_ms() -> u64 {
    200
}

fn default_max_datagram_size() -> usize {
    1024
}

/// Polled shared-memory snapshot transport
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SharedMemoryTransportConfig {
    /// OS-level shared-memory name
    #[validate(length(min = 1))]
    pub name: String,

    /// Directory the name resolves under
    #[serde(default = "default_shm_root")]
    pub root: PathBuf,

    #[serde(default = "default_shm_no_data_timeout_ms")]
    #[validate(range(min = 1))]
    pub no_data_timeout_ms: u64,

    /// Poll period; defaults to the output period
    #[serde(default)]
    #[validate(range(min = 1))]
    pub poll_period_ms: Option<u64>,

    #[serde(default = "default_shm_wire_format")]
    pub wire_format: WireFormat,

    #[serde(default)]
    #[validate(nested)]
    pub custom_layout: Option<WireLayout>,

    #[serde(default)]
    pub angle_scaling: Option<AngleScaling>,
}

impl SharedMemoryTransportConfig {
    /// Path of the snapshot block
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.name)
    }
}

fn default_shm_root() -> PathBuf {
    PathBuf::from("/dev/shm")
}

fn default_shm_no_data_timeout_ms() -> u64 {
    500
}

fn default_shm_wire_format() -> WireFormat {
    WireFormat::SharedMemoryV1
}

/// Capture file playback
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplayTransportConfig {
    /// Capture of `<offset_ms>\t<payload>` lines
    pub path: PathBuf,

    /// Playback speed multiplier
    #[serde(default = "default_replay_speed")]
    #[validate(range(min = 0.01, max = 100.0))]
    pub speed: f64,

    /// Restart from the top at end of file
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,

    #[serde(default = "default_udp_no_data_timeout_ms")]
    #[validate(range(min = 1))]
    pub no_data_timeout_ms: u64,

    #[serde(default)]
    pub wire_format: WireFormat,

    #[serde(default)]
    #[validate(nested)]
    pub custom_layout: Option<WireLayout>,

    #[serde(default)]
    pub angle_scaling: Option<AngleScaling>,
}

fn default_replay_speed() -> f64 {
    1.0
}

/// Link-down and fault back-off
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HealthConfig {
    /// Pause after the no-data threshold is exceeded
    #[serde(default = "default_backoff_ms")]
    #[validate(range(max = 60000))]
    pub link_down_backoff_ms: u64,

    /// Pause after a transient transport fault
    #[serde(default = "default_backoff_ms")]
    #[validate(range(max = 60000))]
    pub fault_backoff_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            link_down_backoff_ms: default_backoff_ms(),
            fault_backoff_ms: default_backoff_ms(),
        }
    }
}

impl HealthConfig {
    pub fn link_down_backoff(&self) -> Duration {
        Duration::from_millis(self.link_down_backoff_ms)
    }

    pub fn fault_backoff(&self) -> Duration {
        Duration::from_millis(self.fault_backoff_ms)
    }
}

fn default_backoff_ms() -> u64 {
    1000
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink name
    #[validate(length(min = 1))]
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Per-sink worker queue capacity
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// tracing output
    Log,
    /// JSON lines file
    File,
    /// UDP
    Network,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_provider() {
        let blueprint = ProviderBlueprint::default();
        assert_eq!(blueprint.provider.name, "aeroflyfs2");
        assert_eq!(blueprint.provider.output_period(), Duration::from_millis(10));
        assert_eq!(blueprint.health.link_down_backoff(), Duration::from_secs(1));
        assert_eq!(blueprint.health.fault_backoff(), Duration::from_secs(1));

        let TransportConfig::Udp(udp) = &blueprint.transport else {
            panic!("default transport should be udp");
        };
        assert_eq!(udp.bind_address, "0.0.0.0");
        assert_eq!(udp.port, 4123);
        assert_eq!(udp.max_datagram_size, 1024);
        assert_eq!(blueprint.transport.no_data_timeout(), Duration::from_millis(200));
        assert_eq!(blueprint.transport.wire_format(), WireFormat::AeroflyFs2V2);
        assert!(blueprint.validate().is_ok());
    }

    #[test]
    fn test_shared_memory_defaults() {
        let json = r#"{ "transport": { "kind": "shared_memory", "name": "aerofly_motion" } }"#;
        let blueprint: ProviderBlueprint = serde_json::from_str(json).unwrap();
        let TransportConfig::SharedMemory(shm) = &blueprint.transport else {
            panic!("expected shared memory transport");
        };
        assert_eq!(shm.path(), PathBuf::from("/dev/shm/aerofly_motion"));
        assert_eq!(blueprint.transport.no_data_timeout(), Duration::from_millis(500));
        assert_eq!(blueprint.transport.wire_format(), WireFormat::SharedMemoryV1);
    }

    #[test]
    fn test_replay_loop_key() {
        let json = r#"{ "transport": { "kind": "replay", "path": "capture.tsv", "loop": true } }"#;
        let blueprint: ProviderBlueprint = serde_json::from_str(json).unwrap();
        let TransportConfig::Replay(replay) = &blueprint.transport else {
            panic!("expected replay transport");
        };
        assert!(replay.loop_playback);
        assert_eq!(replay.speed, 1.0);
    }

    #[test]
    fn test_zero_output_period_fails_field_validation() {
        let mut blueprint = ProviderBlueprint::default();
        blueprint.provider.output_period_ms = 0;
        assert!(blueprint.validate().is_err());
    }

    #[test]
    fn test_nested_transport_validation() {
        let mut blueprint = ProviderBlueprint::default();
        if let TransportConfig::Udp(udp) = &mut blueprint.transport {
            udp.max_datagram_size = 4;
        }
        assert!(blueprint.validate().is_err());
    }
}
