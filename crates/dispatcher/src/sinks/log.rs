//! LogSink - logs update summaries via tracing

use std::collections::HashMap;

use contracts::{ContractError, TelemetrySink, TelemetryUpdate};
use tracing::{info, instrument, trace};

/// Sink that logs one update out of every `stride`
pub struct LogSink {
    name: String,
    stride: u64,
    seen: u64,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stride: 1,
            seen: 0,
        }
    }

    /// Log every `stride`-th update at info; the rest at trace.
    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Reads the optional `every` parameter.
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let stride = match params.get("every") {
            Some(raw) => raw.parse().map_err(|_| {
                ContractError::sink_connection(&name, format!("invalid 'every' value '{raw}'"))
            })?,
            None => 1,
        };
        Ok(Self::new(name).with_stride(stride))
    }

    fn log_update_summary(&self, update: &TelemetryUpdate) {
        let current = &update.current;
        if self.seen % self.stride == 0 {
            info!(
                sink = %self.name,
                sequence = update.sequence,
                pitch = current.pitch,
                roll = current.roll,
                yaw = current.yaw,
                heave = current.heave,
                repeated = update.repeated,
                "TelemetryUpdate"
            );
        } else {
            trace!(sink = %self.name, sequence = update.sequence, "TelemetryUpdate");
        }
    }
}

impl TelemetrySink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_deliver",
        skip(self, update),
        fields(sink = %self.name, sequence = update.sequence)
    )]
    async fn deliver(&mut self, update: &TelemetryUpdate) -> Result<(), ContractError> {
        self.log_update_summary(update);
        self.seen += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, updates = self.seen, "LogSink closed");
        Ok(())
    }
}
