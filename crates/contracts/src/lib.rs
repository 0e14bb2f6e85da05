//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Frame arrival uses a monotonic clock (`Instant`); wall-clock time never
//!   drives interpolation
//! - `TelemetryUpdate::sequence` is the only ordering consumers see

mod blueprint;
mod channel;
mod error;
mod health;
mod sample;
mod sink;
mod transport;
mod update;
mod wire_format;

pub use blueprint::*;
pub use channel::{Channel, ChannelSet};
pub use error::*;
pub use health::LinkHealth;
pub use sample::*;
pub use sink::*;
pub use transport::*;
pub use update::*;
pub use wire_format::*;
