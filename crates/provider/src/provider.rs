//! TelemetryProvider - start/stop lifecycle of one telemetry link
//!
//! Wires a transport, the receiver, the delivery queue, the deliverer and
//! the sinks. `start` and `stop` are idempotent; once `stop` returns no
//! sink sees another update.

use std::sync::Arc;
use std::time::Instant;

use config_loader::ConfigLoader;
use contracts::{
    ChannelSet, LinkHealth, ProviderBlueprint, Sample, TelemetryInfo, TelemetryUpdate,
    TelemetryValue, Transport, UnknownTelemetryValue, WireLayout,
};
use dispatcher::{
    CallbackSink, Deliverer, Dispatcher, DispatcherBuilder, LastEmitted, SinkHandle,
};
use ingestion::{layouts, open_transport, IngestionMetrics, Receiver, ReceiverConfig};
use resampler::DeliveryQueue;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::error::Result;
use crate::stats::{Counters, ProviderStats};

/// Queue capacity of subscriber callback sinks
const CALLBACK_QUEUE_CAPACITY: usize = 256;

type Subscriber = Arc<dyn Fn(&TelemetryUpdate) + Send + Sync>;

/// Tasks and shared state of one run
struct Running {
    stop_tx: watch::Sender<bool>,
    receiver: JoinHandle<()>,
    deliverer: JoinHandle<()>,
    queue: DeliveryQueue,
}

/// Flight-sim telemetry provider
pub struct TelemetryProvider {
    blueprint: ProviderBlueprint,
    layout: WireLayout,
    health: Arc<LinkHealth>,
    subscribers: Vec<Subscriber>,
    running: Option<Running>,
    counters: Option<Counters>,
    last: Option<Arc<LastEmitted>>,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
}

impl TelemetryProvider {
    /// Create a stopped provider.
    ///
    /// # Errors
    /// The blueprint fails validation (e.g. a zero output period) or the
    /// wire layout cannot be resolved.
    pub fn new(blueprint: ProviderBlueprint) -> Result<Self> {
        ConfigLoader::validate(&blueprint)?;
        let layout = layouts::resolve(&blueprint.transport)?;
        Ok(Self {
            blueprint,
            layout,
            health: Arc::new(LinkHealth::new()),
            subscribers: Vec::new(),
            running: None,
            counters: None,
            last: None,
            started_at: None,
            stopped_at: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.blueprint.provider.name
    }

    pub fn blueprint(&self) -> &ProviderBlueprint {
        &self.blueprint
    }

    pub fn layout(&self) -> &WireLayout {
        &self.layout
    }

    /// Channels the configured wire format exposes
    pub fn channels(&self) -> ChannelSet {
        self.layout.channels()
    }

    /// Names of the exposed channels
    pub fn value_list(&self) -> Vec<&'static str> {
        self.channels().names()
    }

    /// Register a callback for every emitted update.
    ///
    /// Takes effect at the next `start`.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&TelemetryUpdate) + Send + Sync + 'static,
    {
        self.subscribers.push(Arc::new(callback));
    }

    pub fn is_started(&self) -> bool {
        self.running.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.health.is_connected()
    }

    pub fn is_running(&self) -> bool {
        self.health.is_running()
    }

    pub fn health(&self) -> Arc<LinkHealth> {
        Arc::clone(&self.health)
    }

    /// Last emitted sample, if any
    pub fn latest(&self) -> Option<Sample> {
        self.last.as_ref().and_then(|last| last.get())
    }

    /// Resolve a channel of the last emitted sample by name.
    ///
    /// Reads zero before the first emission.
    ///
    /// # Errors
    /// Unknown name, or a channel the wire format does not expose.
    pub fn value_by_name(&self, name: &str) -> Result<TelemetryValue, UnknownTelemetryValue> {
        Latest {
            sample: self.latest().unwrap_or_default(),
            channels: self.channels(),
        }
        .value_by_name(name)
    }

    /// Counters of the current run, or of the last one after `stop`
    pub fn stats(&self) -> ProviderStats {
        let Some(counters) = &self.counters else {
            return ProviderStats::default();
        };
        let uptime = match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => stop.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Default::default(),
        };
        counters.snapshot(uptime)
    }

    /// Open the configured transport and sinks, then start.
    ///
    /// No-op while already started.
    ///
    /// # Errors
    /// Transport bind/load failure or sink creation failure.
    #[instrument(
        name = "provider_start",
        skip(self),
        fields(provider = %self.blueprint.provider.name)
    )]
    pub async fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            debug!("already started");
            return Ok(());
        }

        let transport = open_transport(
            &self.blueprint.transport,
            &self.layout,
            self.blueprint.provider.output_period(),
        )
        .await?;

        let mut builder = DispatcherBuilder::new(self.blueprint.sinks.clone());
        for handle in self.subscriber_handles() {
            builder = builder.with_handle(handle);
        }
        let dispatcher = builder.build().await?;

        self.launch(transport, dispatcher);
        Ok(())
    }

    /// Start with an injected transport and sinks instead of the configured ones.
    ///
    /// Subscribers are still attached. No-op while already started.
    #[instrument(
        name = "provider_start_with",
        skip_all,
        fields(provider = %self.blueprint.provider.name)
    )]
    pub async fn start_with<T>(&mut self, transport: T, sinks: Vec<SinkHandle>) -> Result<()>
    where
        T: Transport + 'static,
    {
        if self.running.is_some() {
            debug!("already started");
            return Ok(());
        }

        let mut handles = sinks;
        handles.extend(self.subscriber_handles());
        self.launch(transport, Dispatcher::with_handles(handles));
        Ok(())
    }

    fn subscriber_handles(&self) -> Vec<SinkHandle> {
        self.subscribers
            .iter()
            .enumerate()
            .map(|(i, subscriber)| {
                let subscriber = Arc::clone(subscriber);
                let sink = CallbackSink::new(
                    format!("subscriber-{i}"),
                    move |u: &TelemetryUpdate| subscriber(u),
                );
                SinkHandle::spawn(sink, CALLBACK_QUEUE_CAPACITY)
            })
            .collect()
    }

    fn launch<T>(&mut self, transport: T, dispatcher: Dispatcher)
    where
        T: Transport + 'static,
    {
        let config = ReceiverConfig::from_blueprint(&self.blueprint);
        let queue = DeliveryQueue::new();
        let (stop_tx, stop_rx) = watch::channel(false);
        let transport_name = transport.name().to_string();

        let ingestion_metrics = Arc::new(IngestionMetrics::new());
        let sink_metrics = dispatcher.shared_metrics();
        let sink_count = dispatcher.sink_count();

        let receiver = Receiver::new(
            transport,
            self.layout.clone(),
            queue.clone(),
            Arc::clone(&self.health),
            config,
            Arc::clone(&ingestion_metrics),
        );
        let deliverer = Deliverer::new(
            queue.clone(),
            Arc::clone(&self.health),
            dispatcher,
            self.layout.channels(),
            config.output_period,
        );

        self.counters = Some(Counters {
            ingestion: ingestion_metrics,
            delivery: deliverer.metrics(),
            sinks: sink_metrics,
        });
        self.last = Some(deliverer.last_emitted());
        self.started_at = Some(Instant::now());
        self.stopped_at = None;

        self.running = Some(Running {
            receiver: receiver.spawn(stop_rx.clone()),
            deliverer: deliverer.spawn(stop_rx),
            stop_tx,
            queue,
        });

        info!(
            transport = %transport_name,
            wire_format = self.blueprint.transport.wire_format().as_str(),
            output_period_ms = config.output_period.as_millis() as u64,
            sinks = sink_count,
            "provider started"
        );
    }

    /// Stop both loops and drain the sinks.
    ///
    /// No-op while stopped. After return no further update is delivered.
    #[instrument(
        name = "provider_stop",
        skip(self),
        fields(provider = %self.blueprint.provider.name)
    )]
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            debug!("already stopped");
            return;
        };

        let _ = running.stop_tx.send(true);

        if let Err(e) = running.receiver.await {
            error!(error = ?e, "receiver task failed");
        }
        if let Err(e) = running.deliverer.await {
            error!(error = ?e, "deliverer task failed");
        }

        running.queue.close();
        let dropped = running.queue.clear();
        self.health.set(false);
        self.stopped_at = Some(Instant::now());

        let stats = self.stats();
        info!(
            frames = stats.ingestion.frames_received,
            emitted = stats.delivery.emitted(),
            dropped,
            "provider stopped"
        );
    }
}

/// Last emitted sample viewed through the named-value accessor
struct Latest {
    sample: Sample,
    channels: ChannelSet,
}

impl TelemetryInfo for Latest {
    fn channels(&self) -> ChannelSet {
        self.channels
    }

    fn sample(&self) -> &Sample {
        &self.sample
    }
}
