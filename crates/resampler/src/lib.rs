//! # Resampler
//!
//! Re-samples jittery input onto the fixed output cadence.
//!
//! Responsible for:
//! - Two-sample linear interpolation
//! - Sample bridge (double buffer, strict alternation)
//! - Delivery queue between receiver and delivery loop
//!
//! ## Usage
//!
//! ```ignore
//! use resampler::{DeliveryQueue, Interpolator, SampleBridge};
//!
//! let mut bridge = SampleBridge::new(Interpolator::new(period, channels));
//! let queue = DeliveryQueue::new();
//!
//! if let Some(bridged) = bridge.push_at(sample, frame.received_at) {
//!     queue.enqueue_all(bridged.samples)?;
//! }
//! ```

mod bridge;
mod interpolate;
mod queue;

pub use bridge::{Bridged, SampleBridge};
pub use interpolate::{lerp, step_count, Interpolate, Interpolator};
pub use queue::{DeliveryQueue, QueueClosed};
