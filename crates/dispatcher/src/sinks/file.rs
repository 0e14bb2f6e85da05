//! FileSink - appends updates as JSON lines

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use contracts::{ContractError, TelemetrySink, TelemetryUpdate};
use serde::Serialize;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file (JSON lines)
    pub path: PathBuf,
    /// Flush after this many lines
    pub flush_every: usize,
}

impl FileSinkConfig {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output/telemetry.jsonl"));
        let flush_every = params
            .get("flush_every")
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Self { path, flush_every }
    }
}

/// One written line
#[derive(Serialize)]
struct FileRecord<'a> {
    /// Wall-clock write time, RFC 3339
    written_at: String,
    #[serde(flatten)]
    update: &'a TelemetryUpdate,
}

/// Sink that appends updates to a JSON-lines file
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: Option<BufWriter<File>>,
    pending: usize,
}

impl FileSink {
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            config,
            writer: Some(BufWriter::new(file)),
            pending: 0,
        })
    }

    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    fn write_line(&mut self, update: &TelemetryUpdate) -> std::io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("file sink closed"))?;

        let record = FileRecord {
            written_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            update,
        };
        serde_json::to_writer(&mut *writer, &record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;

        self.pending += 1;
        if self.pending >= self.config.flush_every {
            writer.flush()?;
            self.pending = 0;
        }
        Ok(())
    }

    fn flush_writer(&mut self) -> std::io::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        self.pending = 0;
        Ok(())
    }
}

impl TelemetrySink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_deliver",
        skip(self, update),
        fields(sink = %self.name, sequence = update.sequence)
    )]
    async fn deliver(&mut self, update: &TelemetryUpdate) -> Result<(), ContractError> {
        self.write_line(update).map_err(|e| {
            error!(sink = %self.name, sequence = update.sequence, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.flush_writer()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        let result = self.flush_writer();
        self.writer = None;
        debug!(sink = %self.name, path = %self.config.path.display(), "FileSink closed");
        result.map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}
