//! TelemetrySink trait - Dispatcher output interface
//!
//! Defines the abstract interface for host-side consumers.

use crate::{ContractError, TelemetryUpdate};

/// Data output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(TelemetrySink: Send)]
pub trait LocalTelemetrySink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one telemetry update
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn deliver(&mut self, update: &TelemetryUpdate) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
