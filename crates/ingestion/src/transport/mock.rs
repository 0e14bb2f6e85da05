//! Mock transport - scripted frames and faults for tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, Frame, Transport};
use tokio::time::Instant;

use super::arrival_now;

/// One scripted event, due `delay` after the previous one
#[derive(Debug, Clone)]
enum MockStep {
    Frame { delay: Duration, payload: Bytes },
    Fault { delay: Duration, message: String },
}

impl MockStep {
    fn delay(&self) -> Duration {
        match self {
            MockStep::Frame { delay, .. } | MockStep::Fault { delay, .. } => *delay,
        }
    }
}

/// Scripted transport; silent once the script is exhausted
#[derive(Debug)]
pub struct MockTransport {
    name: String,
    steps: VecDeque<MockStep>,
    /// When the current head step became current
    step_started: Option<Instant>,
    closed: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: VecDeque::new(),
            step_started: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Deliver `payload` `delay` after the previous step.
    pub fn frame_after(mut self, delay: Duration, payload: impl Into<Bytes>) -> Self {
        self.steps.push_back(MockStep::Frame {
            delay,
            payload: payload.into(),
        });
        self
    }

    /// Fail a receive `delay` after the previous step.
    pub fn fault_after(mut self, delay: Duration, message: impl Into<String>) -> Self {
        self.steps.push_back(MockStep::Fault {
            delay,
            message: message.into(),
        });
        self
    }

    /// Set once `close` has been called
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, ContractError> {
        let now = Instant::now();
        let deadline = now + timeout;

        let Some(step) = self.steps.front() else {
            tokio::time::sleep(timeout).await;
            return Ok(None);
        };

        let started = *self.step_started.get_or_insert(now);
        let due = started + step.delay();
        if due > deadline {
            tokio::time::sleep_until(deadline).await;
            return Ok(None);
        }
        tokio::time::sleep_until(due).await;

        self.step_started = Some(due);
        match self.steps.pop_front() {
            Some(MockStep::Frame { payload, .. }) => Ok(Some(Frame::new(payload, arrival_now()))),
            Some(MockStep::Fault { message, .. }) => {
                Err(ContractError::transport_receive(&self.name, message))
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_scripted_frames_arrive_on_schedule() {
        let mut transport = MockTransport::new("mock")
            .frame_after(Duration::from_millis(10), "a")
            .frame_after(Duration::from_millis(25), "b");

        let start = Instant::now();
        let a = transport.receive_frame(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(&a.payload[..], b"a");
        assert_eq!(start.elapsed(), Duration::from_millis(10));

        let b = transport.receive_frame(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(&b.payload[..], b"b");
        assert_eq!(start.elapsed(), Duration::from_millis(35));
        assert_eq!(
            b.received_at.duration_since(a.received_at),
            Duration::from_millis(25)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_step_pending() {
        let mut transport = MockTransport::new("mock").frame_after(Duration::from_millis(300), "late");
        assert!(transport
            .receive_frame(Duration::from_millis(200))
            .await
            .unwrap()
            .is_none());
        assert_eq!(transport.remaining(), 1);
        assert!(transport
            .receive_frame(Duration::from_millis(200))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_step() {
        let mut transport = MockTransport::new("mock").fault_after(Duration::ZERO, "boom");
        assert!(transport.receive_frame(Duration::from_millis(10)).await.is_err());
        assert!(transport
            .receive_frame(Duration::from_millis(10))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_close_sets_flag() {
        let mut transport = MockTransport::new("mock");
        let flag = transport.closed_flag();
        transport.close().await.unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }
}
