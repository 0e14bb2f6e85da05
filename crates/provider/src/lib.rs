//! # Provider
//!
//! Telemetry provider for one simulator link.
//!
//! Owns the start/stop lifecycle: a receiver task fed by the configured
//! transport and a deliverer task emitting at the output cadence, sharing
//! only the delivery queue and the last-emitted slot.
//!
//! ## Usage Example
//!
//! ```ignore
//! use provider::TelemetryProvider;
//!
//! let mut provider = TelemetryProvider::new(blueprint)?;
//! provider.subscribe(|update| println!("{}", update.current.pitch));
//! provider.start().await?;
//! // ...
//! provider.stop().await;
//! println!("{:?}", provider.stats());
//! ```

mod error;
mod provider;
mod stats;

pub use error::{ProviderError, Result};
pub use provider::TelemetryProvider;
pub use stats::ProviderStats;
