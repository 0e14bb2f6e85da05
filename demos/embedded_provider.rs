//! Embedded Provider Example
//!
//! Runs the provider in-process the way a motion-platform host would:
//! subscribe, start, read channels by name, stop.
//!
//! Run with: cargo run --bin embedded_provider [config.toml] [seconds]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ProviderBlueprint, TelemetryInfo, TelemetryUpdate};
use observability::{LogFormat, ObservabilityConfig};
use provider::TelemetryProvider;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        ..Default::default()
    })?;

    let blueprint = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "Loading provider config");
            ConfigLoader::load_from_path(Path::new(&path))?
        }
        None => ProviderBlueprint::default(),
    };
    let seconds: u64 = std::env::args()
        .nth(2)
        .map(|v| v.parse())
        .transpose()
        .context("seconds must be an integer")?
        .unwrap_or(10);

    let mut provider = TelemetryProvider::new(blueprint)?;
    tracing::info!(provider = provider.name(), values = ?provider.value_list(), "Provider ready");

    let updates = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&updates);
    provider.subscribe(move |update: &TelemetryUpdate| {
        let n = counter.fetch_add(1, Ordering::Relaxed);
        if n % 100 == 0 {
            if let (Ok(pitch), Ok(roll)) =
                (update.value_by_name("Pitch"), update.value_by_name("Roll"))
            {
                tracing::info!(sequence = update.sequence, %pitch, %roll, "update");
            }
        }
    });

    provider.start().await?;
    for _ in 0..seconds {
        tokio::time::sleep(Duration::from_secs(1)).await;
        tracing::info!(
            connected = provider.is_connected(),
            updates = updates.load(Ordering::Relaxed),
            "tick"
        );
    }
    provider.stop().await;

    let stats = provider.stats();
    tracing::info!(
        emitted = stats.delivery.emitted(),
        repeated = stats.delivery.repeated,
        frames = stats.ingestion.frames_received,
        rate = format!("{:.1}/s", stats.emission_rate()),
        "Provider stopped"
    );
    Ok(())
}
