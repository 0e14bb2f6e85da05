//! # Ingestion
//!
//! Telemetry ingestion for one simulator link.
//!
//! Responsibilities:
//! - Open the configured transport (UDP, shared memory, capture replay)
//! - Decode raw frames into samples through a pinned wire layout
//! - Track link health from frame recency
//! - Bridge consecutive samples and feed the delivery queue
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{layouts, open_transport, IngestionMetrics, Receiver, ReceiverConfig};
//!
//! let layout = layouts::resolve(&blueprint.transport)?;
//! let config = ReceiverConfig::from_blueprint(&blueprint);
//! let transport = open_transport(&blueprint.transport, &layout, config.output_period).await?;
//!
//! let receiver = Receiver::new(transport, layout, queue.clone(), health, config, metrics);
//! let handle = receiver.spawn(shutdown_rx);
//! ```

mod config;
mod decoder;
mod error;
mod health;
pub mod layouts;
mod receiver;
mod transport;
pub mod units;

// Re-exports
pub use config::{IngestionMetrics, MetricsSnapshot, ReceiverConfig};
pub use decoder::{DecodeError, FrameDecoder};
pub use error::{IngestionError, Result};
pub use health::HealthMonitor;
pub use receiver::Receiver;
pub use transport::{
    open_transport, parse_capture, AnyTransport, MockTransport, ReplayRecord, ReplayTransport,
    SharedMemoryTransport, UdpTransport,
};
