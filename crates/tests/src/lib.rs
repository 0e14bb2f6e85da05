//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - contract snapshots (wire shape of updates, name lookup)
//! - resampling through the full provider with scripted transports
//! - real UDP, shared-memory and replay transports
//! - file and network sink output

#[cfg(test)]
mod common;

#[cfg(test)]
mod contract_tests;

#[cfg(test)]
mod resampling_tests;

#[cfg(test)]
mod transport_tests;

#[cfg(test)]
mod sink_tests;
