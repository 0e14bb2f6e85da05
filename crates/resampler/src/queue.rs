//! Delivery queue
//!
//! Unbounded FIFO between the receiver and the delivery loop. Enqueue never
//! blocks, dequeue is try-only. Closing it stops producers.

use async_channel::{Receiver, Sender, TryRecvError, TrySendError};
use contracts::QueuedSample;
use thiserror::Error;

/// The queue was closed by `stop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("delivery queue is closed")]
pub struct QueueClosed;

/// Thread-safe FIFO of real and synthetic samples
///
/// Clones share the same queue.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    tx: Sender<QueuedSample>,
    rx: Receiver<QueuedSample>,
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryQueue {
    pub fn new() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { tx, rx }
    }

    /// Append one sample.
    ///
    /// # Errors
    /// [`QueueClosed`] once the queue has been closed.
    pub fn enqueue(&self, sample: QueuedSample) -> Result<(), QueueClosed> {
        match self.tx.try_send(sample) {
            Ok(()) => Ok(()),
            // Unbounded: Full cannot happen
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => Err(QueueClosed),
        }
    }

    /// Append every sample of one bridging event, in order.
    ///
    /// Returns how many were enqueued.
    pub fn enqueue_all<I>(&self, samples: I) -> Result<usize, QueueClosed>
    where
        I: IntoIterator<Item = QueuedSample>,
    {
        let mut count = 0;
        for sample in samples {
            self.enqueue(sample)?;
            count += 1;
        }
        Ok(count)
    }

    /// Non-blocking dequeue.
    ///
    /// Still drains remaining entries after `close`.
    pub fn try_dequeue(&self) -> Option<QueuedSample> {
        match self.rx.try_recv() {
            Ok(sample) => Some(sample),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Drop every queued entry; returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Stop accepting new samples.
    pub fn close(&self) {
        self.tx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
