//! UDP datagram transport
//!
//! One datagram = one frame.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, Frame, Transport, UdpTransportConfig};
use tokio::net::UdpSocket;
use tracing::{debug, info};

use super::arrival_now;
use crate::error::{IngestionError, Result};

/// Listens on a local UDP port
#[derive(Debug)]
pub struct UdpTransport {
    name: String,
    socket: Option<UdpSocket>,
    local_addr: Option<SocketAddr>,
    buffer: Vec<u8>,
    packets_received: u64,
}

impl UdpTransport {
    /// Bind the configured address and port.
    ///
    /// # Errors
    /// [`IngestionError::SocketBind`] if the address is unavailable.
    pub async fn bind(config: &UdpTransportConfig) -> Result<Self> {
        let address = format!("{}:{}", config.bind_address, config.port);
        let socket = UdpSocket::bind(&address)
            .await
            .map_err(|source| IngestionError::SocketBind {
                address: address.clone(),
                source,
            })?;

        let local_addr = socket.local_addr().ok();
        info!(address = %address, local_addr = ?local_addr, "UDP transport bound");

        Ok(Self {
            name: format!("udp:{}", config.port),
            socket: Some(socket),
            local_addr,
            buffer: vec![0u8; config.max_datagram_size],
            packets_received: 0,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    fn log_first_packet(&self, data: &[u8]) {
        if self.packets_received == 1 {
            let preview = String::from_utf8_lossy(&data[..data.len().min(48)]);
            info!(
                transport = %self.name,
                len = data.len(),
                preview = %preview,
                "Received first telemetry datagram"
            );
        }
    }
}

impl Transport for UdpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, ContractError> {
        let Some(socket) = &self.socket else {
            return Err(ContractError::transport_receive(&self.name, "socket closed"));
        };

        match tokio::time::timeout(timeout, socket.recv(&mut self.buffer)).await {
            Ok(Ok(len)) => {
                self.packets_received += 1;
                let payload = Bytes::copy_from_slice(&self.buffer[..len]);
                self.log_first_packet(&payload);
                Ok(Some(Frame::new(payload, arrival_now())))
            }
            Ok(Err(e)) => Err(ContractError::transport_receive(&self.name, e.to_string())),
            Err(_) => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        if self.socket.take().is_some() {
            debug!(
                transport = %self.name,
                packets = self.packets_received,
                "UDP transport closed"
            );
        }
        Ok(())
    }
}
