//! Dispatcher - fan-out of telemetry updates to sinks

use std::sync::Arc;

use tracing::{debug, info, instrument};

use contracts::{SinkConfig, SinkType, TelemetryUpdate};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::{SinkMetrics, SinkSnapshot};
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Builder for creating a Dispatcher
#[derive(Default)]
pub struct DispatcherBuilder {
    sinks: Vec<SinkConfig>,
    extra: Vec<SinkHandle>,
}

impl DispatcherBuilder {
    pub fn new(sinks: Vec<SinkConfig>) -> Self {
        Self {
            sinks,
            extra: Vec::new(),
        }
    }

    /// Add an already running sink (e.g. an in-process callback).
    pub fn with_handle(mut self, handle: SinkHandle) -> Self {
        self.extra.push(handle);
        self
    }

    /// Build the configured sinks and start their workers.
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink_count = self.sinks.len() + self.extra.len())
    )]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let mut handles = Vec::with_capacity(self.sinks.len() + self.extra.len());
        for sink_config in &self.sinks {
            match create_sink_handle(sink_config).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    Dispatcher::shutdown_handles(handles).await;
                    Dispatcher::shutdown_handles(self.extra).await;
                    return Err(e);
                }
            }
        }
        handles.extend(self.extra);
        Ok(Dispatcher { handles })
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub async fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::from_params(&config.name, &config.params)?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Fans each update out to every sink without waiting on any of them
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
}

impl Dispatcher {
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self { handles }
    }

    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Per-sink metrics
    pub fn metrics(&self) -> Vec<(String, SinkSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Live per-sink counters, still readable after the dispatcher moves
    pub fn shared_metrics(&self) -> Vec<(String, Arc<SinkMetrics>)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), Arc::clone(h.metrics())))
            .collect()
    }

    /// Queue `update` on every sink; returns how many accepted it.
    pub fn dispatch(&self, update: &TelemetryUpdate) -> usize {
        self.handles
            .iter()
            .filter(|handle| handle.try_send(*update))
            .count()
    }

    /// Drain every sink queue and stop the workers.
    #[instrument(name = "dispatcher_shutdown", skip(self), fields(sinks = self.handles.len()))]
    pub async fn shutdown(self) {
        Self::shutdown_handles(self.handles).await;
        info!("Dispatcher shutdown complete");
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            debug!(sink = %handle.name(), "stopping sink");
            handle.shutdown().await;
        }
    }
}

/// Create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs))]
pub async fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
) -> Result<Dispatcher, DispatcherError> {
    DispatcherBuilder::new(sink_configs).build().await
}
