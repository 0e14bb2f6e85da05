//! Configured sinks receiving provider output.

use std::collections::HashMap;

use contracts::{ProviderBlueprint, SinkConfig, SinkType, TelemetryUpdate};
use dispatcher::create_sink_handle;
use ingestion::MockTransport;
use tokio::net::UdpSocket;

use crate::common::*;

fn sink_config(name: &str, sink_type: SinkType, params: &[(&str, &str)]) -> SinkConfig {
    SinkConfig {
        name: name.into(),
        sink_type,
        queue_capacity: 1_000,
        params: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_file_sink_writes_every_update() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("telemetry.jsonl");
    let config = sink_config(
        "file",
        SinkType::File,
        &[("path", path.to_str().unwrap()), ("flush_every", "1")],
    );
    let file_sink = create_sink_handle(&config).await.unwrap();

    let (mut provider, seen) = recording_provider(ProviderBlueprint::default());
    let transport = MockTransport::new("mock")
        .frame_after(ms(0), v2_frame(0.0))
        .frame_after(ms(25), v2_frame(900.0));
    provider
        .start_with(transport, vec![file_sink])
        .await
        .unwrap();
    tokio::time::sleep(ms(100)).await;
    provider.stop().await;

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let seen = seen.lock().unwrap();
    assert_eq!(lines.len(), seen.len());
    for (line, update) in lines.iter().zip(seen.iter()) {
        assert!(line["written_at"].is_string());
        assert_eq!(line["sequence"], update.sequence);
        assert_eq!(line["repeated"], update.repeated);
    }

    let stats = provider.stats();
    let (_, file_stats) = stats.sinks.iter().find(|(name, _)| name == "file").unwrap();
    assert_eq!(file_stats.delivered_count, lines.len() as u64);
    assert_eq!(file_stats.failure_count, 0);
}

#[tokio::test]
async fn test_network_sink_forwards_json_datagrams() {
    let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let config = sink_config(
        "net",
        SinkType::Network,
        &[("addr", addr.as_str()), ("format", "json")],
    );
    let net_sink = create_sink_handle(&config).await.unwrap();

    let (mut provider, _seen) = recording_provider(ProviderBlueprint::default());
    let transport = MockTransport::new("mock")
        .frame_after(ms(0), v2_frame(0.0))
        .frame_after(ms(20), v2_frame(300.0));
    provider.start_with(transport, vec![net_sink]).await.unwrap();

    let mut buf = vec![0u8; 4096];
    let len = tokio::time::timeout(ms(1_000), listener.recv(&mut buf))
        .await
        .expect("no datagram within a second")
        .unwrap();
    provider.stop().await;

    let update: TelemetryUpdate = serde_json::from_slice(&buf[..len]).unwrap();
    assert_eq!(update.sequence, 1);
    assert!(update.connected);
    assert!(approx(update.current.pitch, 0.0));
    assert!(approx(update.current.airspeed, 61.0));
}
