//! Capture replay transport
//!
//! Plays back a capture of `<offset_ms>\t<payload>` lines at the recorded
//! pace, scaled by a speed multiplier, optionally looping. Blank lines and
//! `#` comments are skipped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, Frame, Transport};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::arrival_now;
use crate::error::{IngestionError, Result};

/// Minimum accepted speed multiplier
const MIN_SPEED: f64 = 0.01;

/// One captured frame
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayRecord {
    /// Offset from the start of the capture
    pub offset: Duration,
    pub payload: Bytes,
}

/// Replays a capture file
#[derive(Debug)]
pub struct ReplayTransport {
    name: String,
    records: Vec<ReplayRecord>,
    speed: f64,
    loop_playback: bool,
    cursor: usize,
    started_at: Option<Instant>,
    finished: bool,
}

impl ReplayTransport {
    /// Load a capture file.
    ///
    /// # Errors
    /// Unreadable file or malformed line.
    pub fn load(path: &Path, speed: f64, loop_playback: bool) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestionError::CaptureRead {
            path: path.to_path_buf(),
            source,
        })?;
        let records = parse_capture(&text, path)?;

        info!(
            path = %path.display(),
            records = records.len(),
            speed,
            loop_playback,
            "Loaded replay capture"
        );

        Ok(Self::from_records(
            format!("replay:{}", path.display()),
            records,
            speed,
            loop_playback,
        ))
    }

    /// Build from in-memory records.
    pub fn from_records(
        name: impl Into<String>,
        mut records: Vec<ReplayRecord>,
        speed: f64,
        loop_playback: bool,
    ) -> Self {
        records.sort_by_key(|r| r.offset);
        Self {
            name: name.into(),
            records,
            speed: speed.max(MIN_SPEED),
            loop_playback,
            cursor: 0,
            started_at: None,
            finished: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn due(&self, started_at: Instant, record: &ReplayRecord) -> Instant {
        started_at + record.offset.div_f64(self.speed)
    }

    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor < self.records.len() {
            return;
        }
        if self.loop_playback {
            debug!(transport = %self.name, "Looping replay");
            self.cursor = 0;
            self.started_at = Some(Instant::now());
        } else {
            info!(transport = %self.name, "Replay completed");
            self.finished = true;
        }
    }
}

impl Transport for ReplayTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, ContractError> {
        if self.finished || self.records.is_empty() {
            // End of capture behaves like a silent link
            tokio::time::sleep(timeout).await;
            return Ok(None);
        }

        let started_at = *self.started_at.get_or_insert_with(Instant::now);
        let record = &self.records[self.cursor];
        let due = self.due(started_at, record);
        let deadline = Instant::now() + timeout;

        if due > deadline {
            tokio::time::sleep_until(deadline).await;
            return Ok(None);
        }

        tokio::time::sleep_until(due).await;
        let payload = record.payload.clone();
        self.advance();
        Ok(Some(Frame::new(payload, arrival_now())))
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.finished = true;
        Ok(())
    }
}

/// Parse capture text.
pub fn parse_capture(text: &str, path: &Path) -> Result<Vec<ReplayRecord>> {
    let format_error = |line: usize, message: String| IngestionError::CaptureFormat {
        path: PathBuf::from(path),
        line,
        message,
    };

    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (offset, payload) = trimmed
            .split_once('\t')
            .ok_or_else(|| format_error(line_no, "expected '<offset_ms>\\t<payload>'".into()))?;

        let offset_ms: f64 = offset
            .trim()
            .parse()
            .map_err(|_| format_error(line_no, format!("invalid offset '{offset}'")))?;
        if !offset_ms.is_finite() || offset_ms < 0.0 {
            return Err(format_error(line_no, format!("negative offset {offset_ms}")));
        }

        records.push(ReplayRecord {
            offset: Duration::from_secs_f64(offset_ms / 1000.0),
            payload: Bytes::copy_from_slice(payload.as_bytes()),
        });
    }

    if records.is_empty() {
        warn!(path = %path.display(), "capture contains no records");
    }
    Ok(records)
}
