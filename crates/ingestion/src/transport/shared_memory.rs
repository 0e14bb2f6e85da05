//! Shared-memory snapshot transport
//!
//! The block is read as a whole once per poll period. Every successful read
//! is a frame, changed or not, so link health follows the reads themselves.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, Frame, Transport};
use tokio::time::Instant;
use tracing::debug;

/// Polls a fixed-size block under an OS shared-memory name
#[derive(Debug)]
pub struct SharedMemoryTransport {
    name: String,
    path: PathBuf,
    poll_period: Duration,
    /// Bytes of the block the layout reads
    block_len: usize,
    /// Earliest time the next read may happen
    next_read: Option<Instant>,
    closed: bool,
}

impl SharedMemoryTransport {
    pub fn new(path: impl Into<PathBuf>, poll_period: Duration, block_len: usize) -> Self {
        let path = path.into();
        Self {
            name: format!("shm:{}", path.display()),
            path,
            poll_period,
            block_len,
            next_read: None,
            closed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_snapshot(&self) -> Result<Bytes, ContractError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ContractError::transport_receive(&self.name, e.to_string()))?;
        let mut snapshot = Bytes::from(data);
        snapshot.truncate(self.block_len);
        Ok(snapshot)
    }
}

impl Transport for SharedMemoryTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, ContractError> {
        if self.closed {
            return Err(ContractError::transport_receive(&self.name, "transport closed"));
        }

        if let Some(next_read) = self.next_read {
            let deadline = Instant::now() + timeout;
            if next_read > deadline {
                tokio::time::sleep_until(deadline).await;
                return Ok(None);
            }
            tokio::time::sleep_until(next_read).await;
        }

        let snapshot = self.read_snapshot().await?;
        let read_at = Instant::now();
        self.next_read = Some(read_at + self.poll_period);
        Ok(Some(Frame::new(snapshot, read_at.into_std())))
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        if !self.closed {
            self.closed = true;
            debug!(transport = %self.name, "shared memory transport closed");
        }
        Ok(())
    }
}
