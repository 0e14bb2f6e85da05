//! Layered error definitions
//!
//! Categorized by source: config / transport / sink / accessor

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Transport could not be opened (bind failure, bad address)
    #[error("transport '{transport}' open error: {message}")]
    TransportOpen { transport: String, message: String },

    /// Transient transport fault while receiving
    #[error("transport '{transport}' receive error: {message}")]
    TransportReceive { transport: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport open error
    pub fn transport_open(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportOpen {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create transient transport receive error
    pub fn transport_receive(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportReceive {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink connection error
    pub fn sink_connection(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConnection {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

/// A consumer asked for a channel the active transport does not expose.
///
/// Contract violation by the caller, not a transient failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown telemetry value '{name}'")]
pub struct UnknownTelemetryValue {
    pub name: String,
}

impl UnknownTelemetryValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
