//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{AngleScaling, Conversion, FrameEncoding, ProviderBlueprint, WireLayout};

use super::summary::transport_endpoint;
use crate::cli::InfoArgs;
use crate::error::{ensure_config_exists, CliError};

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    provider: ProviderInfo,
    transport: TransportInfo,
    channels: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ProviderInfo {
    name: String,
    output_period_ms: u64,
}

#[derive(Serialize)]
struct TransportInfo {
    kind: &'static str,
    endpoint: String,
    wire_format: &'static str,
    encoding: String,
    angle_scaling: AngleScaling,
    no_data_timeout_ms: u64,
    required_fields: usize,
}

#[derive(Serialize)]
struct FieldInfo {
    index: usize,
    channel: &'static str,
    unit: &'static str,
    conversion: String,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");
    ensure_config_exists(&args.config)?;

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let layout = ingestion::layouts::resolve(&blueprint.transport).map_err(CliError::from)?;

    if args.json {
        let info = build_config_info(&blueprint, &layout, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, &layout, args);
    }

    Ok(())
}

fn describe_encoding(encoding: &FrameEncoding) -> String {
    match encoding {
        FrameEncoding::DelimitedText { delimiter } => format!("text, '{delimiter}' delimited"),
        FrameEncoding::PackedF64 => "packed little-endian f64".to_string(),
    }
}

fn describe_conversion(conversion: &Conversion) -> String {
    match conversion {
        Conversion::Angle {
            wrap_limit_deg: Some(limit),
        } => format!("angle → deg, wrap at ±{limit}"),
        Conversion::Angle {
            wrap_limit_deg: None,
        } => "angle → deg".to_string(),
        Conversion::Scale { factor } => format!("× {factor}"),
        Conversion::Acceleration => "÷ g".to_string(),
        Conversion::Identity => "as is".to_string(),
    }
}

fn build_config_info(
    blueprint: &ProviderBlueprint,
    layout: &WireLayout,
    args: &InfoArgs,
) -> ConfigInfo {
    let fields = if args.fields {
        layout
            .fields
            .iter()
            .map(|f| FieldInfo {
                index: f.index,
                channel: f.channel.name(),
                unit: f.channel.unit(),
                conversion: describe_conversion(&f.conversion),
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        provider: ProviderInfo {
            name: blueprint.provider.name.clone(),
            output_period_ms: blueprint.provider.output_period_ms,
        },
        transport: TransportInfo {
            kind: blueprint.transport.kind(),
            endpoint: transport_endpoint(&blueprint.transport),
            wire_format: blueprint.transport.wire_format().as_str(),
            encoding: describe_encoding(&layout.encoding),
            angle_scaling: layout.angle_scaling,
            no_data_timeout_ms: blueprint.transport.no_data_timeout().as_millis() as u64,
            required_fields: layout.required_fields(),
        },
        channels: layout.channels().names(),
        fields,
        sinks,
    }
}

fn print_config_info(blueprint: &ProviderBlueprint, layout: &WireLayout, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               simmotion Configuration                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🛩  Provider");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Name: {}", blueprint.provider.name);
    println!(
        "   └─ Output period: {} ms",
        blueprint.provider.output_period_ms
    );

    println!("\n📡 Transport");
    println!("   ├─ {}", transport_endpoint(&blueprint.transport));
    println!(
        "   ├─ Wire format: {}",
        blueprint.transport.wire_format().as_str()
    );
    println!("   ├─ Encoding: {}", describe_encoding(&layout.encoding));
    println!("   ├─ Angle scaling: {:?}", layout.angle_scaling);
    println!("   ├─ Required fields: {}", layout.required_fields());
    println!(
        "   └─ No-data timeout: {} ms",
        blueprint.transport.no_data_timeout().as_millis()
    );

    let channels = layout.channels();
    println!("\n📈 Channels ({})", channels.len());
    println!("   └─ {}", channels.names().join(", "));

    if args.fields {
        println!("\n🗂  Field table ({})", layout.fields.len());
        for (i, field) in layout.fields.iter().enumerate() {
            let prefix = if i == layout.fields.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} [{:>2}] {:<24} {:<6} {}",
                prefix,
                field.index,
                field.channel.name(),
                field.channel.unit(),
                describe_conversion(&field.conversion)
            );
        }
    }

    if args.sinks && !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let prefix = if i == blueprint.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_info_lists_layout_channels_and_fields() {
        let blueprint = ProviderBlueprint::default();
        let layout = ingestion::layouts::resolve(&blueprint.transport).unwrap();
        let args = InfoArgs {
            config: PathBuf::from("unused.toml"),
            json: true,
            fields: true,
            sinks: false,
        };

        let info = build_config_info(&blueprint, &layout, &args);
        assert_eq!(info.transport.wire_format, "aerofly_fs2_v2");
        assert_eq!(info.transport.required_fields, 11);
        assert_eq!(info.channels, layout.channels().names());
        assert_eq!(info.fields.len(), layout.fields.len());
        assert!(info.sinks.is_empty());

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["transport"]["kind"], "udp");
        assert!(json.get("sinks").is_none());
    }
}
