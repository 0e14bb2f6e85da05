//! NetworkSink - streams updates to a remote motion platform or dashboard
//!
//! One update per UDP datagram, sent to a connected peer. An update that
//! does not fit in one datagram is rejected rather than fragmented. A peer
//! that is not listening surfaces as a rejected update on the next send,
//! which the sink worker counts.

use contracts::{ContractError, TelemetrySink, TelemetryUpdate};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, trace};

/// Largest UDP payload over IPv4
pub const MAX_DATAGRAM: usize = 65_507;

/// Encoding of each datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    #[default]
    Json,
    Bincode,
}

impl NetworkFormat {
    fn encode(self, update: &TelemetryUpdate) -> Result<Vec<u8>, String> {
        match self {
            NetworkFormat::Json => serde_json::to_vec(update).map_err(|e| e.to_string()),
            NetworkFormat::Bincode => bincode::serialize(update).map_err(|e| e.to_string()),
        }
    }
}

/// Sink parameters: `addr` (required), `format`, `max_datagram`
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    pub addr: SocketAddr,
    pub format: NetworkFormat,
    pub max_datagram: usize,
}

impl NetworkSinkConfig {
    pub fn new(addr: SocketAddr, format: NetworkFormat) -> Self {
        Self {
            addr,
            format,
            max_datagram: MAX_DATAGRAM,
        }
    }

    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| format!("invalid address '{addr}': {e}"))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{other}'")),
        };

        let max_datagram = match params.get("max_datagram") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|e| format!("invalid max_datagram '{v}': {e}"))?
                .min(MAX_DATAGRAM),
            None => MAX_DATAGRAM,
        };

        Ok(Self {
            addr,
            format,
            max_datagram,
        })
    }
}

/// Sink that sends each update as one datagram
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    #[instrument(name = "network_sink_new", skip(name, config), fields(peer = %config.addr))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let local = if config.addr.is_ipv6() {
            "[::]:0"
        } else {
            "0.0.0.0:0"
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(config.addr).await?;
        debug!(sink = %name, peer = %config.addr, format = ?config.format, "network sink ready");

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_connection(&name, e))?;
        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))
    }
}

impl TelemetrySink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&mut self, update: &TelemetryUpdate) -> Result<(), ContractError> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(ContractError::sink_write(&self.name, "sink closed"));
        };
        let datagram = self
            .config
            .format
            .encode(update)
            .map_err(|e| ContractError::sink_write(&self.name, e))?;
        if datagram.len() > self.config.max_datagram {
            return Err(ContractError::sink_write(
                &self.name,
                format!(
                    "update of {} bytes exceeds datagram limit {}",
                    datagram.len(),
                    self.config.max_datagram
                ),
            ));
        }

        let sent = socket
            .send(&datagram)
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        trace!(sink = %self.name, sequence = update.sequence, bytes = sent, "datagram sent");
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        if self.socket.take().is_some() {
            debug!(sink = %self.name, "network sink closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Channel, ChannelSet, Sample};
    use std::time::Duration;

    fn update() -> TelemetryUpdate {
        TelemetryUpdate {
            sequence: 9,
            current: Sample::default().with(Channel::Roll, -4.0).populated(),
            previous: Sample::default(),
            connected: true,
            running: true,
            channels: ChannelSet::all(),
            repeated: false,
        }
    }

    #[test]
    fn test_network_sink_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "bincode".to_string());

        let config = NetworkSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, NetworkFormat::Bincode);
        assert_eq!(config.max_datagram, MAX_DATAGRAM);

        params.insert("max_datagram".to_string(), "100000".to_string());
        assert_eq!(
            NetworkSinkConfig::from_params(&params).unwrap().max_datagram,
            MAX_DATAGRAM
        );
        params.insert("max_datagram".to_string(), "lots".to_string());
        assert!(NetworkSinkConfig::from_params(&params).is_err());
        params.remove("max_datagram");

        params.insert("format".to_string(), "xml".to_string());
        assert!(NetworkSinkConfig::from_params(&params).is_err());
        assert!(NetworkSinkConfig::from_params(&HashMap::new()).is_err());
    }

    #[tokio::test]
    async fn test_network_sink_sends_json() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = NetworkSinkConfig::new(receiver.local_addr().unwrap(), NetworkFormat::Json);

        let mut sink = NetworkSink::new("test_net", config).await.unwrap();
        sink.deliver(&update()).await.unwrap();

        let mut buf = [0u8; 4096];
        let len = tokio::time::timeout(Duration::from_secs(1), receiver.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let decoded: TelemetryUpdate = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(decoded, update());
    }

    #[tokio::test]
    async fn test_network_sink_sends_bincode() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config =
            NetworkSinkConfig::new(receiver.local_addr().unwrap(), NetworkFormat::Bincode);

        let mut sink = NetworkSink::new("test_net", config).await.unwrap();
        sink.deliver(&update()).await.unwrap();

        let mut buf = [0u8; 4096];
        let len = tokio::time::timeout(Duration::from_secs(1), receiver.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let decoded: TelemetryUpdate = bincode::deserialize(&buf[..len]).unwrap();
        assert_eq!(decoded.sequence, 9);
        assert_eq!(decoded.current.roll, -4.0);
    }

    #[tokio::test]
    async fn test_network_sink_closed() {
        let config = NetworkSinkConfig::new("127.0.0.1:19998".parse().unwrap(), NetworkFormat::Json);
        let mut sink = NetworkSink::new("test_net", config).await.unwrap();
        sink.close().await.unwrap();
        assert!(sink.deliver(&update()).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_update_rejected() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = NetworkSinkConfig {
            max_datagram: 64,
            ..NetworkSinkConfig::new(receiver.local_addr().unwrap(), NetworkFormat::Json)
        };
        let mut sink = NetworkSink::new("tiny", config).await.unwrap();
        let err = sink.deliver(&update()).await.unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }), "got {err}");
    }
}
