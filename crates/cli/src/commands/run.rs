//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use config_loader::ConfigLoader;
use contracts::{ProviderBlueprint, ReplayTransportConfig, TransportConfig};
use provider::TelemetryProvider;

use super::summary::{print_config_summary, print_stats_summary};
use crate::cli::RunArgs;
use crate::error::{ensure_config_exists, CliError};

/// Execute the `run` command
pub async fn run_provider(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");
    ensure_config_exists(&args.config)?;

    let mut blueprint = ConfigLoader::load_from_path(&args.config)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    ConfigLoader::validate(&blueprint)
        .map_err(CliError::from)
        .context("Configuration invalid after CLI overrides")?;

    info!(
        provider = %blueprint.provider.name,
        transport = blueprint.transport.kind(),
        wire_format = blueprint.transport.wire_format().as_str(),
        output_period_ms = blueprint.provider.output_period_ms,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let mut provider = TelemetryProvider::new(blueprint).map_err(CliError::from)?;
    provider
        .start()
        .await
        .map_err(CliError::from)
        .context("Failed to start provider")?;

    info!(channels = ?provider.value_list(), "Provider started");

    let reason = wait_for_exit(&provider, args).await;
    warn!(reason, "Stopping provider...");

    provider.stop().await;
    print_stats_summary(&provider.stats());

    info!("simmotion finished");
    Ok(())
}

fn apply_overrides(blueprint: &mut ProviderBlueprint, args: &RunArgs) {
    if let Some(period) = args.output_period_ms {
        info!(output_period_ms = period, "Overriding output period from CLI");
        blueprint.provider.output_period_ms = period;
    }

    if let Some(path) = &args.replay {
        info!(path = %path.display(), speed = args.replay_speed, "Replaying capture instead of live transport");
        let transport = &blueprint.transport;
        blueprint.transport = TransportConfig::Replay(ReplayTransportConfig {
            path: path.clone(),
            speed: args.replay_speed,
            loop_playback: args.replay_loop,
            no_data_timeout_ms: transport.no_data_timeout().as_millis() as u64,
            wire_format: transport.wire_format(),
            custom_layout: transport.custom_layout().cloned(),
            angle_scaling: transport.angle_scaling(),
        });
    }

    if let Some(port) = args.port {
        match &mut blueprint.transport {
            TransportConfig::Udp(udp) => {
                info!(port, "Overriding UDP port from CLI");
                udp.port = port;
            }
            other => warn!(
                transport = other.kind(),
                "--port only applies to the udp transport, ignored"
            ),
        }
    }
}

/// Block until a signal, the run duration, and log status meanwhile
async fn wait_for_exit(provider: &TelemetryProvider, args: &RunArgs) -> &'static str {
    let deadline = async {
        if args.duration_secs == 0 {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(Duration::from_secs(args.duration_secs)).await;
    };
    tokio::pin!(deadline);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut status = (args.status_interval_secs > 0)
        .then(|| tokio::time::interval(Duration::from_secs(args.status_interval_secs)));

    loop {
        tokio::select! {
            _ = &mut shutdown => return "signal",
            _ = &mut deadline => return "duration elapsed",
            _ = async {
                match status.as_mut() {
                    Some(ticker) => { ticker.tick().await; }
                    None => std::future::pending::<()>().await,
                }
            } => {
                let stats = provider.stats();
                info!(
                    connected = provider.is_connected(),
                    frames = stats.ingestion.frames_received,
                    emitted = stats.delivery.emitted(),
                    repeated = stats.delivery.repeated,
                    queue_depth = stats.ingestion.queue_depth,
                    "status"
                );
            }
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
