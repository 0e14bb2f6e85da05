//! LinkHealth - shared connected/running flags
//!
//! Written by the receiver, read by the delivery loop and the host.

use std::sync::atomic::{AtomicBool, Ordering};

/// Connected/running status derived from transport activity.
///
/// Both flags start `false` and only flip on the first received frame.
#[derive(Debug, Default)]
pub struct LinkHealth {
    connected: AtomicBool,
    running: AtomicBool,
}

impl LinkHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Set both flags; returns the previous connected state.
    pub fn set(&self, up: bool) -> bool {
        self.running.store(up, Ordering::Release);
        self.connected.swap(up, Ordering::AcqRel)
    }
}
