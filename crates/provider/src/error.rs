//! Provider error types

use contracts::ContractError;
use dispatcher::DispatcherError;
use ingestion::IngestionError;
use thiserror::Error;

/// Errors surfaced by `TelemetryProvider`
///
/// Only construction and startup fail; faults while running are absorbed
/// by the receiver and the sink workers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Invalid provider configuration
    #[error("configuration error: {0}")]
    Config(#[from] ContractError),

    /// Transport could not be opened
    #[error("ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    /// A configured sink could not be created
    #[error("dispatcher error: {0}")]
    Dispatcher(#[from] DispatcherError),
}

pub type Result<T, E = ProviderError> = std::result::Result<T, E>;
