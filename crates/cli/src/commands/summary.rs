//! Console summaries for `run`.

use contracts::{ProviderBlueprint, TransportConfig};
use provider::ProviderStats;

/// Describe where frames come from, e.g. `udp 0.0.0.0:4123`
pub fn transport_endpoint(transport: &TransportConfig) -> String {
    match transport {
        TransportConfig::Udp(udp) => format!("udp {}:{}", udp.bind_address, udp.port),
        TransportConfig::SharedMemory(shm) => {
            format!("shared_memory {}", shm.path().display())
        }
        TransportConfig::Replay(replay) => format!(
            "replay {} (x{}{})",
            replay.path.display(),
            replay.speed,
            if replay.loop_playback { ", loop" } else { "" }
        ),
    }
}

/// Print configuration summary for dry-run mode
pub fn print_config_summary(blueprint: &ProviderBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Provider:");
    println!("  Name: {}", blueprint.provider.name);
    println!("  Output period: {} ms", blueprint.provider.output_period_ms);
    println!("\nTransport:");
    println!("  {}", transport_endpoint(&blueprint.transport));
    println!("  Wire format: {}", blueprint.transport.wire_format().as_str());
    println!(
        "  No-data timeout: {} ms",
        blueprint.transport.no_data_timeout().as_millis()
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}

/// Print the counters of a finished run
pub fn print_stats_summary(stats: &ProviderStats) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Provider Statistics                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📊 Overview");
    println!("   ├─ Uptime: {:.2}s", stats.uptime.as_secs_f64());
    println!("   ├─ Updates emitted: {}", stats.delivery.emitted());
    println!("   ├─ Emission rate: {:.2}/s", stats.emission_rate());
    println!("   └─ Repeat rate: {:.2}%", stats.repeat_rate());

    let ingestion = &stats.ingestion;
    println!("\n📥 Ingestion");
    println!("   ├─ Frames received: {}", ingestion.frames_received);
    println!("   ├─ Decode failures: {}", ingestion.decode_failures);
    println!("   ├─ Short frames: {}", ingestion.short_frames);
    println!("   ├─ Empty frames: {}", ingestion.empty_frames);
    println!("   ├─ Pairs bridged: {}", ingestion.pairs_bridged);
    println!("   ├─ Samples enqueued: {}", ingestion.samples_enqueued);
    println!("   ├─ Transport faults: {}", ingestion.transport_faults);
    println!("   ├─ Link-down events: {}", ingestion.link_down_events);
    println!("   └─ Arrival interval (ms): {}", ingestion.arrival_interval_ms);

    let delivery = &stats.delivery;
    println!("\n📤 Delivery");
    println!("   ├─ Ticks: {}", delivery.ticks);
    println!(
        "   ├─ Fresh: {} ({} synthetic)",
        delivery.fresh, delivery.synthetic
    );
    println!("   ├─ Repeated: {}", delivery.repeated);
    println!("   ├─ Suppressed (link down): {}", delivery.suppressed);
    println!("   └─ Idle: {}", delivery.idle);

    if !stats.sinks.is_empty() {
        println!("\n🔌 Sinks");
        for (i, (name, sink)) in stats.sinks.iter().enumerate() {
            let prefix = if i == stats.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {}: delivered={}, failed={}, dropped={}",
                prefix, name, sink.delivered_count, sink.failure_count, sink.dropped_count
            );
        }
    }

    println!();
}
