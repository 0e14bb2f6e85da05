//! CallbackSink - hands updates to an in-process closure

use contracts::{ContractError, TelemetrySink, TelemetryUpdate};
use tracing::debug;

type Callback = Box<dyn Fn(&TelemetryUpdate) + Send + Sync>;

/// Sink for embedding hosts
pub struct CallbackSink {
    name: String,
    callback: Callback,
}

impl CallbackSink {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&TelemetryUpdate) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callback: Box::new(callback),
        }
    }
}

impl std::fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSink")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl TelemetrySink for CallbackSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&mut self, update: &TelemetryUpdate) -> Result<(), ContractError> {
        (self.callback)(update);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "CallbackSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ChannelSet, Sample};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_callback_receives_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let mut sink = CallbackSink::new("host", move |u: &TelemetryUpdate| {
            sink_seen.lock().unwrap().push(u.sequence);
        });

        for sequence in 1..=3 {
            let update = TelemetryUpdate {
                sequence,
                current: Sample::default(),
                previous: Sample::default(),
                connected: true,
                running: true,
                channels: ChannelSet::all(),
                repeated: false,
            };
            sink.deliver(&update).await.unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }
}
