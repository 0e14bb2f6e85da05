//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{ProviderBlueprint, TransportConfig, WireFormat};

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    provider: String,
    transport: &'static str,
    wire_format: &'static str,
    output_period_ms: u64,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::validation_failed(&args.config).into())
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(CliError::config_not_found(&args.config).to_string()),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    provider: blueprint.provider.name.clone(),
                    transport: blueprint.transport.kind(),
                    wire_format: blueprint.transport.wire_format().as_str(),
                    output_period_ms: blueprint.provider.output_period_ms,
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &ProviderBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - updates reach in-process subscribers only".to_string());
    }

    let timeout = blueprint.transport.no_data_timeout();
    if timeout < blueprint.provider.output_period() * 2 {
        warnings.push(format!(
            "no_data_timeout_ms ({}) is under two output periods - the link may flap",
            timeout.as_millis()
        ));
    }

    if blueprint.transport.wire_format() != WireFormat::Custom
        && blueprint.transport.custom_layout().is_some()
    {
        warnings.push(format!(
            "custom_layout is ignored for wire_format '{}'",
            blueprint.transport.wire_format().as_str()
        ));
    }

    if let TransportConfig::Replay(replay) = &blueprint.transport {
        if !replay.path.exists() {
            warnings.push(format!(
                "replay capture {} does not exist yet",
                replay.path.display()
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Provider: {}", summary.provider);
            println!("  Transport: {}", summary.transport);
            println!("  Wire format: {}", summary.wire_format);
            println!("  Output period: {} ms", summary.output_period_ms);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn args(path: PathBuf) -> ValidateArgs {
        ValidateArgs {
            config: path,
            json: true,
        }
    }

    #[test]
    fn test_valid_config_with_warning() {
        let file = config_file("[provider]\noutput_period_ms = 10\n");
        let result = validate_config(&args(file.path().to_path_buf()));
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("No sinks configured")));
        assert_eq!(result.summary.unwrap().wire_format, "aerofly_fs2_v2");
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let file = config_file("[provider]\noutput_period_ms = 0\n");
        let result = validate_config(&args(file.path().to_path_buf()));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("output_period_ms"));
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&args(PathBuf::from("/nonexistent/simmotion.toml")));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
        assert!(run_validate(&args(PathBuf::from("/nonexistent/simmotion.toml"))).is_err());
    }

    #[test]
    fn test_flapping_timeout_warning() {
        let mut blueprint = ProviderBlueprint::default();
        blueprint.provider.output_period_ms = 150;
        let warnings = collect_warnings(&blueprint);
        assert!(warnings.iter().any(|w| w.contains("may flap")));
    }
}
