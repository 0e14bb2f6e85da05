//! Ingestion error types

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Ingestion errors
///
/// Only startup misconfiguration surfaces here; faults after start are
/// absorbed by the receiver loop.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Failed to bind the UDP socket
    #[error("failed to bind UDP socket on {address}: {source}")]
    SocketBind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a capture file
    #[error("failed to read capture '{}': {source}", path.display())]
    CaptureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed capture line
    #[error("capture '{}' line {line}: {message}", path.display())]
    CaptureFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Contract-level error (layout resolution, transport)
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Ingestion Result alias
pub type Result<T, E = IngestionError> = std::result::Result<T, E>;
