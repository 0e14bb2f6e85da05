//! Transport trait - Receiver input interface
//!
//! One abstraction over every frame source (UDP datagrams, shared-memory
//! snapshots, capture replay, scripted mocks) so decoding, bridging and
//! health tracking are written once.

use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::ContractError;

/// One discrete unit of raw transport data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Datagram payload or snapshot bytes
    pub payload: Bytes,

    /// Monotonic arrival time
    pub received_at: Instant,
}

impl Frame {
    pub fn new(payload: impl Into<Bytes>, received_at: Instant) -> Self {
        Self {
            payload: payload.into(),
            received_at,
        }
    }
}

/// Frame source trait
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Wait up to `timeout` for the next frame.
    ///
    /// `Ok(None)` means nothing arrived in time.
    ///
    /// # Errors
    /// Transient receive fault; the caller backs off and retries.
    async fn receive_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, ContractError>;

    /// Release the underlying handle
    async fn close(&mut self) -> Result<(), ContractError>;
}
