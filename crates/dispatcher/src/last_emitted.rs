//! Last-emitted slot
//!
//! Single guarded slot written right after each emission. Read for the
//! `previous` field, for the starvation repeat and by the host.

use std::sync::Mutex;

use contracts::Sample;

#[derive(Debug, Default)]
pub struct LastEmitted {
    slot: Mutex<Option<Sample>>,
}

impl LastEmitted {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last emitted sample; `None` before the first emission.
    pub fn get(&self) -> Option<Sample> {
        match self.slot.lock() {
            Ok(slot) => *slot,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Store `sample`, returning what it replaced.
    pub fn swap(&self, sample: Sample) -> Option<Sample> {
        match self.slot.lock() {
            Ok(mut slot) => slot.replace(sample),
            Err(poisoned) => poisoned.into_inner().replace(sample),
        }
    }

    pub fn clear(&self) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
