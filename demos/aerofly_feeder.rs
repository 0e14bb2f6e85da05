//! Aerofly FS 2 Feeder
//!
//! Emits synthetic motion telemetry the way the simulator does, for trying
//! out `simmotion` without a running simulator.
//!
//! Run with:
//!   cargo run --bin aerofly_feeder -- udp 127.0.0.1:4123 [rate_hz] [seconds]
//!   cargo run --bin aerofly_feeder -- shm /dev/shm/aerofly_motion [rate_hz] [seconds]
//!   cargo run --bin aerofly_feeder -- capture session.tsv [rate_hz] [seconds]

use std::f64::consts::TAU;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::net::UdpSocket;
use tokio::time::{Instant, MissedTickBehavior};

/// One synthetic attitude/motion state at time `t` seconds
struct Motion {
    pitch: f64,
    roll: f64,
    yaw: f64,
    sway: f64,
    heave: f64,
    surge: f64,
    airspeed: f64,
}

impl Motion {
    fn at(t: f64) -> Self {
        Self {
            pitch: 0.15 * (TAU * 0.2 * t).sin(),
            roll: 0.30 * (TAU * 0.1 * t).sin(),
            yaw: (0.05 * t) % TAU,
            sway: 0.8 * (TAU * 0.5 * t).sin(),
            heave: 1.2 * (TAU * 0.7 * t).cos(),
            surge: 0.4 * (TAU * 0.3 * t).sin(),
            airspeed: 60.0 + 5.0 * (TAU * 0.05 * t).sin(),
        }
    }

    /// Current-build text datagram: 11 fields, angles and sway/heave × 1000
    fn datagram(&self) -> String {
        let fields = [
            self.pitch * 1000.0,
            self.roll * 1000.0,
            self.yaw * 1000.0,
            self.sway * 1000.0,
            self.heave * 1000.0,
            self.surge,
            0.0,
            0.0,
            0.0,
            self.airspeed,
            self.airspeed,
        ];
        let mut out = String::new();
        for (i, value) in fields.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            let _ = write!(out, "{value:.3}");
        }
        out
    }

    /// Shared-memory block: 9 little-endian doubles, angles in radians
    fn block(&self, t: f64) -> Vec<u8> {
        let g = 9.80665;
        [
            self.pitch,
            self.roll,
            self.yaw,
            0.15 * TAU * 0.2 * (TAU * 0.2 * t).cos(),
            0.30 * TAU * 0.1 * (TAU * 0.1 * t).cos(),
            0.05,
            self.sway * g,
            self.surge * g,
            (1.0 + 0.1 * self.heave) * g,
        ]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect()
    }
}

enum Target {
    Udp(String),
    SharedMemory(PathBuf),
    Capture(PathBuf),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let target = match (args.first().map(String::as_str), args.get(1)) {
        (Some("udp"), Some(addr)) => Target::Udp(addr.clone()),
        (Some("shm"), Some(path)) => Target::SharedMemory(PathBuf::from(path)),
        (Some("capture"), Some(path)) => Target::Capture(PathBuf::from(path)),
        _ => bail!("usage: aerofly_feeder <udp ADDR | shm PATH | capture PATH> [rate_hz] [seconds]"),
    };
    let rate_hz: f64 = match args.get(2) {
        Some(v) => v.parse().context("rate_hz must be a number")?,
        None => 40.0,
    };
    let seconds: u64 = match args.get(3) {
        Some(v) => v.parse().context("seconds must be an integer")?,
        None => 30,
    };
    if rate_hz <= 0.0 {
        bail!("rate_hz must be > 0");
    }

    let period = Duration::from_secs_f64(1.0 / rate_hz);
    let frames = (seconds as f64 * rate_hz) as u64;
    tracing::info!(rate_hz, seconds, frames, "Starting feeder");

    match target {
        Target::Udp(addr) => feed_udp(&addr, period, frames).await,
        Target::SharedMemory(path) => feed_shared_memory(&path, period, frames).await,
        Target::Capture(path) => write_capture(&path, period, frames),
    }
}

async fn feed_udp(addr: &str, period: Duration, frames: u64) -> Result<()> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket
        .connect(addr)
        .await
        .with_context(|| format!("cannot reach {addr}"))?;

    let start = Instant::now();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for n in 0..frames {
        ticker.tick().await;
        let t = start.elapsed().as_secs_f64();
        if let Err(e) = socket.send(Motion::at(t).datagram().as_bytes()).await {
            tracing::warn!(error = %e, "send failed");
        }
        if n % 100 == 0 {
            tracing::info!(sent = n, "feeding {addr}");
        }
    }
    tracing::info!(frames, "Feeder finished");
    Ok(())
}

async fn feed_shared_memory(path: &PathBuf, period: Duration, frames: u64) -> Result<()> {
    let staging = path.with_extension("tmp");
    let start = Instant::now();
    let mut ticker = tokio::time::interval(period);

    for n in 0..frames {
        ticker.tick().await;
        let t = start.elapsed().as_secs_f64();
        tokio::fs::write(&staging, Motion::at(t).block(t))
            .await
            .with_context(|| format!("cannot write {}", staging.display()))?;
        tokio::fs::rename(&staging, path).await?;
        if n % 100 == 0 {
            tracing::info!(written = n, path = %path.display(), "snapshot updated");
        }
    }
    tracing::info!(frames, "Feeder finished");
    Ok(())
}

fn write_capture(path: &PathBuf, period: Duration, frames: u64) -> Result<()> {
    let mut text = String::from("# aerofly_feeder synthetic session\n");
    for n in 0..frames {
        let offset = period * n as u32;
        let t = offset.as_secs_f64();
        let _ = writeln!(text, "{}\t{}", offset.as_millis(), Motion::at(t).datagram());
    }
    std::fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
    tracing::info!(frames, path = %path.display(), "Capture written");
    Ok(())
}
