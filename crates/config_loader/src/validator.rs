//! Configuration validation
//!
//! Field-level rules come from the `validator` derives on the blueprint.
//! Cross-field rules checked here:
//! - `custom` wire format carries a `custom_layout` table
//! - custom field tables are non-empty with positive, finite wrap limits
//! - sink names are unique
//! - network sinks name a destination `addr`
//! - shared-memory polling is faster than its no-data timeout

use std::collections::HashSet;

use contracts::{
    ContractError, Conversion, FrameEncoding, ProviderBlueprint, SinkType, TransportConfig,
    WireFormat, WireLayout,
};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Validate a ProviderBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ProviderBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_wire_format(&blueprint.transport)?;
    validate_shared_memory_poll(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// Run the derived field rules and report the first violation by path
fn validate_fields(blueprint: &ProviderBlueprint) -> Result<(), ContractError> {
    let Err(errors) = blueprint.validate() else {
        return Ok(());
    };

    let mut violations = Vec::new();
    flatten(&errors, "", &mut violations);
    violations.sort();
    let (field, message) = violations
        .into_iter()
        .next()
        .unwrap_or_else(|| ("blueprint".to_string(), errors.to_string()));
    Err(ContractError::config_validation(field, message))
}

fn flatten(errors: &ValidationErrors, prefix: &str, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| (path.clone(), describe(e))));
            }
            ValidationErrorsKind::Struct(inner) => flatten(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten(inner, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.params.get("value") {
        Some(value) => format!("failed '{}' check (value: {value})", error.code),
        None => format!("failed '{}' check", error.code),
    }
}

/// `custom` needs its own table; any supplied table must be usable
fn validate_wire_format(transport: &TransportConfig) -> Result<(), ContractError> {
    match (transport.wire_format(), transport.custom_layout()) {
        (WireFormat::Custom, None) => Err(ContractError::config_validation(
            "transport.custom_layout",
            "wire_format 'custom' requires a custom_layout table",
        )),
        (_, Some(layout)) => validate_layout(layout),
        _ => Ok(()),
    }
}

fn validate_layout(layout: &WireLayout) -> Result<(), ContractError> {
    if layout.fields.is_empty() {
        return Err(ContractError::config_validation(
            "transport.custom_layout.fields",
            "field table cannot be empty",
        ));
    }

    if let FrameEncoding::DelimitedText { delimiter } = layout.encoding {
        if delimiter.is_ascii_digit() || matches!(delimiter, '-' | '+' | '.' | 'e' | 'E') {
            return Err(ContractError::config_validation(
                "transport.custom_layout.encoding.delimiter",
                format!("delimiter '{delimiter}' collides with numeric text"),
            ));
        }
    }

    for (idx, field) in layout.fields.iter().enumerate() {
        let path = format!("transport.custom_layout.fields[{idx}].conversion");
        match field.conversion {
            Conversion::Angle {
                wrap_limit_deg: Some(limit),
            } if !(limit.is_finite() && limit > 0.0) => {
                return Err(ContractError::config_validation(
                    path,
                    format!("wrap_limit_deg must be > 0, got {limit}"),
                ));
            }
            Conversion::Scale { factor } if !factor.is_finite() => {
                return Err(ContractError::config_validation(
                    path,
                    format!("scale factor must be finite, got {factor}"),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// A poll period at or above the timeout would flap the link
fn validate_shared_memory_poll(blueprint: &ProviderBlueprint) -> Result<(), ContractError> {
    let TransportConfig::SharedMemory(shm) = &blueprint.transport else {
        return Ok(());
    };
    let poll_ms = shm
        .poll_period_ms
        .unwrap_or(blueprint.provider.output_period_ms);
    if poll_ms >= shm.no_data_timeout_ms {
        return Err(ContractError::config_validation(
            "transport.poll_period_ms",
            format!(
                "poll period ({poll_ms} ms) must be below no_data_timeout_ms ({} ms)",
                shm.no_data_timeout_ms
            ),
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &ProviderBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.sink_type == SinkType::Network && !sink.params.contains_key("addr") {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].params.addr"),
                "network sink requires 'addr'",
            ));
        }
    }
    Ok(())
}
