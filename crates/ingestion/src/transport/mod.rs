//! Transport implementations
//!
//! Contains UdpTransport, SharedMemoryTransport, ReplayTransport and
//! MockTransport, plus [`AnyTransport`] for configuration-driven selection.

mod mock;
mod replay;
mod shared_memory;
mod udp;

use std::time::Duration;

use contracts::{ContractError, Frame, Transport, TransportConfig, WireLayout};
use tracing::instrument;

use crate::error::Result;

pub use self::mock::MockTransport;
pub use self::replay::{parse_capture, ReplayRecord, ReplayTransport};
pub use self::shared_memory::SharedMemoryTransport;
pub use self::udp::UdpTransport;

const F64_SIZE: usize = std::mem::size_of::<f64>();

/// Monotonic arrival stamp that follows tokio's (possibly paused) clock
pub(crate) fn arrival_now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

/// Transport chosen from configuration
#[derive(Debug)]
pub enum AnyTransport {
    Udp(UdpTransport),
    SharedMemory(SharedMemoryTransport),
    Replay(ReplayTransport),
}

/// Open the configured transport.
///
/// # Errors
/// Bind failure or unreadable capture; later faults are transient.
#[instrument(name = "open_transport", skip(config, layout), fields(kind = config.kind()))]
pub async fn open_transport(
    config: &TransportConfig,
    layout: &WireLayout,
    output_period: Duration,
) -> Result<AnyTransport> {
    Ok(match config {
        TransportConfig::Udp(udp) => AnyTransport::Udp(UdpTransport::bind(udp).await?),
        TransportConfig::SharedMemory(shm) => {
            let poll_period = shm
                .poll_period_ms
                .map(Duration::from_millis)
                .unwrap_or(output_period);
            AnyTransport::SharedMemory(SharedMemoryTransport::new(
                shm.path(),
                poll_period,
                layout.required_fields() * F64_SIZE,
            ))
        }
        TransportConfig::Replay(replay) => AnyTransport::Replay(ReplayTransport::load(
            &replay.path,
            replay.speed,
            replay.loop_playback,
        )?),
    })
}

impl Transport for AnyTransport {
    fn name(&self) -> &str {
        match self {
            AnyTransport::Udp(t) => t.name(),
            AnyTransport::SharedMemory(t) => t.name(),
            AnyTransport::Replay(t) => t.name(),
        }
    }

    async fn receive_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, ContractError> {
        match self {
            AnyTransport::Udp(t) => t.receive_frame(timeout).await,
            AnyTransport::SharedMemory(t) => t.receive_frame(timeout).await,
            AnyTransport::Replay(t) => t.receive_frame(timeout).await,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        match self {
            AnyTransport::Udp(t) => t.close().await,
            AnyTransport::SharedMemory(t) => t.close().await,
            AnyTransport::Replay(t) => t.close().await,
        }
    }
}
