//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// simmotion - motion telemetry provider for flight simulators
#[derive(Parser, Debug)]
#[command(
    name = "simmotion",
    author,
    version,
    about = "Flight simulator motion telemetry provider",
    long_about = "Receives motion telemetry from a flight simulator, resamples it to a \n\
                  fixed output cadence and hands every update to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SIMMOTION_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SIMMOTION_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the provider until interrupted
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display transport, wire format and channel information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "simmotion.toml",
        env = "SIMMOTION_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the UDP listen port
    #[arg(long, env = "SIMMOTION_PORT")]
    pub port: Option<u16>,

    /// Override the output cadence in milliseconds
    #[arg(long, env = "SIMMOTION_OUTPUT_PERIOD_MS")]
    pub output_period_ms: Option<u64>,

    /// Play a capture file instead of the configured transport
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier
    #[arg(long, default_value = "1.0", requires = "replay")]
    pub replay_speed: f64,

    /// Restart the capture at end of file
    #[arg(long, requires = "replay")]
    pub replay_loop: bool,

    /// Stop after this many seconds (0 = until Ctrl-C)
    #[arg(long, default_value = "0", env = "SIMMOTION_DURATION_SECS")]
    pub duration_secs: u64,

    /// Seconds between status log lines (0 = disabled)
    #[arg(long, default_value = "5")]
    pub status_interval_secs: u64,

    /// Validate configuration and exit without starting the provider
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SIMMOTION_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "simmotion.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "simmotion.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the field table
    #[arg(long)]
    pub fields: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
