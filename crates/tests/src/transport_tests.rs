//! Real transports feeding the provider.

use std::path::Path;

use contracts::{
    ProviderBlueprint, ReplayTransportConfig, SharedMemoryTransportConfig, TelemetryInfo,
    TransportConfig, UdpTransportConfig, WireFormat,
};
use ingestion::UdpTransport;
use provider::{ProviderError, TelemetryProvider};
use tokio::net::UdpSocket;

use crate::common::*;

fn loopback_udp() -> UdpTransportConfig {
    UdpTransportConfig {
        bind_address: "127.0.0.1".into(),
        port: 0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_udp_datagrams_reach_subscribers() {
    let transport = UdpTransport::bind(&loopback_udp()).await.unwrap();
    let target = transport.local_addr().unwrap();

    let (mut provider, seen) = recording_provider(ProviderBlueprint::default());
    provider.start_with(transport, Vec::new()).await.unwrap();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(v2_frame(0.0).as_bytes(), target).await.unwrap();
    tokio::time::sleep(ms(25)).await;
    sender.send_to(v2_frame(900.0).as_bytes(), target).await.unwrap();
    tokio::time::sleep(ms(150)).await;

    assert!(provider.is_connected());
    let airspeed = provider.value_by_name("AirSpeed").unwrap();
    assert!(approx(airspeed.value, 61.0));
    provider.stop().await;

    let fresh = fresh_pitches(&seen);
    assert!(fresh.len() >= 3, "got {fresh:?}");
    assert!(approx(fresh[0], 0.0));
    assert!(approx(*fresh.last().unwrap(), PITCH_900_MRAD_DEG));
    assert!(fresh.windows(2).all(|w| w[1] >= w[0]));
    assert_consecutive(&seen);
}

#[tokio::test]
async fn test_udp_bind_failure_is_reported_by_start() {
    let occupied = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let blueprint = ProviderBlueprint {
        transport: TransportConfig::Udp(UdpTransportConfig {
            port,
            ..loopback_udp()
        }),
        ..Default::default()
    };
    let mut provider = TelemetryProvider::new(blueprint).unwrap();
    let err = provider.start().await.unwrap_err();
    assert!(matches!(err, ProviderError::Ingestion(_)), "got {err}");
    assert!(!provider.is_started());
}

fn replay_blueprint(path: &Path) -> ProviderBlueprint {
    ProviderBlueprint {
        transport: TransportConfig::Replay(ReplayTransportConfig {
            path: path.to_path_buf(),
            speed: 1.0,
            loop_playback: false,
            no_data_timeout_ms: 200,
            wire_format: WireFormat::AeroflyFs2V2,
            custom_layout: None,
            angle_scaling: None,
        }),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_replay_capture_plays_at_recorded_pace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.tsv");
    let capture = format!(
        "# recorded session\n0\t{}\n25\t{}\n\n",
        v2_frame(0.0),
        v2_frame(900.0)
    );
    std::fs::write(&path, capture).unwrap();

    let (mut provider, seen) = recording_provider(replay_blueprint(&path));
    provider.start().await.unwrap();
    tokio::time::sleep(ms(80)).await;
    provider.stop().await;

    let fresh = fresh_pitches(&seen);
    assert_eq!(fresh.len(), 3);
    assert!(approx(fresh[1], PITCH_900_MRAD_DEG / 2.0));
    assert!(approx(fresh[2], PITCH_900_MRAD_DEG));
}

#[tokio::test]
async fn test_missing_capture_fails_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut provider =
        TelemetryProvider::new(replay_blueprint(&dir.path().join("absent.tsv"))).unwrap();
    assert!(provider.start().await.is_err());
}

fn write_block(dir: &Path, name: &str, values: [f64; 9]) {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let staging = dir.join(format!(".{name}.tmp"));
    std::fs::write(&staging, bytes).unwrap();
    std::fs::rename(staging, dir.join(name)).unwrap();
}

#[tokio::test]
async fn test_shared_memory_snapshots_reach_subscribers() {
    let dir = tempfile::tempdir().unwrap();
    write_block(dir.path(), "motion", [0.0; 9]);

    let blueprint = ProviderBlueprint {
        transport: TransportConfig::SharedMemory(SharedMemoryTransportConfig {
            name: "motion".into(),
            root: dir.path().to_path_buf(),
            no_data_timeout_ms: 500,
            poll_period_ms: Some(10),
            wire_format: WireFormat::SharedMemoryV1,
            custom_layout: None,
            angle_scaling: None,
        }),
        ..Default::default()
    };
    let (mut provider, seen) = recording_provider(blueprint);
    assert_eq!(provider.value_list().len(), 12);
    provider.start().await.unwrap();

    tokio::time::sleep(ms(50)).await;
    write_block(
        dir.path(),
        "motion",
        [0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 9.80665],
    );
    tokio::time::sleep(ms(150)).await;

    assert!(provider.is_connected());
    let latest = seen.lock().unwrap().last().copied().unwrap();
    assert!(approx(latest.current.pitch, 0.5_f64.to_degrees()));
    assert!(approx(latest.value_by_name("AccelerationZ").unwrap().value, 1.0));
    provider.stop().await;

    // Every poll is a frame, including the unchanged snapshots
    assert!(provider.stats().ingestion.frames_received > 2);
}

#[tokio::test]
async fn test_static_shared_memory_block_keeps_link_up() {
    let dir = tempfile::tempdir().unwrap();
    write_block(dir.path(), "parked", [0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 9.80665]);

    let blueprint = ProviderBlueprint {
        transport: TransportConfig::SharedMemory(SharedMemoryTransportConfig {
            name: "parked".into(),
            root: dir.path().to_path_buf(),
            no_data_timeout_ms: 200,
            poll_period_ms: Some(10),
            wire_format: WireFormat::SharedMemoryV1,
            custom_layout: None,
            angle_scaling: None,
        }),
        ..Default::default()
    };
    let (mut provider, seen) = recording_provider(blueprint);
    provider.start().await.unwrap();

    // Three silence thresholds of an unchanged block
    tokio::time::sleep(ms(600)).await;

    assert!(provider.is_connected());
    assert!(provider.is_running());
    provider.stop().await;

    let stats = provider.stats();
    assert_eq!(stats.ingestion.link_down_events, 0);
    assert!(stats.ingestion.frames_received > 10);
    let latest = seen.lock().unwrap().last().copied().unwrap();
    assert!(approx(latest.current.pitch, 0.1_f64.to_degrees()));
}
