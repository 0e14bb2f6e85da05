//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Loading or validating the configuration failed
    #[error("Invalid configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Provider failed to build or start
    #[error("Provider failed: {0}")]
    Provider(#[from] provider::ProviderError),

    /// Validation reported the file as invalid
    #[error("Configuration validation failed: {path}")]
    ValidationFailed { path: String },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn validation_failed(path: &Path) -> Self {
        Self::ValidationFailed {
            path: path.display().to_string(),
        }
    }
}

/// Fail early with a readable message when the config path is missing
pub fn ensure_config_exists(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::config_not_found(path))
    }
}
