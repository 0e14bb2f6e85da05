//! # Dispatcher
//!
//! Output side of the pipeline.
//!
//! Responsibilities:
//! - Drain the delivery queue at the output cadence
//! - Keep the last-emitted slot and repeat it on starvation
//! - Fan out to multiple sinks
//! - Isolate slow sinks so they never stall the cadence

pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod last_emitted;
pub mod metrics;
pub mod sinks;

pub use contracts::{TelemetrySink, TelemetryUpdate};
pub use delivery::Deliverer;
pub use dispatcher::{create_dispatcher, create_sink_handle, Dispatcher, DispatcherBuilder};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use last_emitted::LastEmitted;
pub use metrics::{DeliveryMetrics, DeliverySnapshot, SinkMetrics, SinkSnapshot};
pub use sinks::{CallbackSink, FileSink, LogSink, NetworkSink};
