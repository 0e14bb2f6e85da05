//! Sink implementations
//!
//! Contains LogSink, FileSink, NetworkSink and CallbackSink.

mod callback;
mod file;
mod log;
mod network;

pub use self::callback::CallbackSink;
pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::network::{NetworkFormat, NetworkSink, NetworkSinkConfig};
