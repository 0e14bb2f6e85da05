//! Frame decoder
//!
//! Turns one raw frame into a [`Sample`] through a pinned [`WireLayout`].
//! Short frames decode to an unpopulated zero sample; a mapped field that
//! is not a finite number fails the whole frame.

use contracts::{FrameEncoding, Sample, WireLayout};
use thiserror::Error;

use crate::units;

const F64_SIZE: usize = std::mem::size_of::<f64>();

/// Frame-level decode failure. Fatal to that frame only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Text frame is not UTF-8
    #[error("frame is not valid utf-8")]
    InvalidUtf8,

    /// Mapped field is not a finite number
    #[error("field {index} is not a finite number: '{value}'")]
    InvalidField { index: usize, value: String },
}

impl DecodeError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::InvalidUtf8 => "invalid_utf8",
            DecodeError::InvalidField { .. } => "invalid_field",
        }
    }
}

/// Decoder bound to one wire layout
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    layout: WireLayout,
    required: usize,
}

impl FrameDecoder {
    pub fn new(layout: WireLayout) -> Self {
        let required = layout.required_fields();
        Self { layout, required }
    }

    pub fn layout(&self) -> &WireLayout {
        &self.layout
    }

    /// Decode one frame.
    ///
    /// Returns `Sample::default()` (unpopulated) when the frame carries
    /// fewer fields than the layout needs.
    ///
    /// # Errors
    /// [`DecodeError`] for non-UTF-8 text or a non-numeric mapped field.
    pub fn decode(&self, payload: &[u8]) -> Result<Sample, DecodeError> {
        match self.layout.encoding {
            FrameEncoding::DelimitedText { delimiter } => self.decode_text(payload, delimiter),
            FrameEncoding::PackedF64 => self.decode_packed(payload),
        }
    }

    fn decode_text(&self, payload: &[u8], delimiter: char) -> Result<Sample, DecodeError> {
        let text = std::str::from_utf8(payload).map_err(|_| DecodeError::InvalidUtf8)?;
        let fields: Vec<&str> = trim_field(text).split(delimiter).map(trim_field).collect();

        if fields.len() < self.required {
            return Ok(Sample::default());
        }

        self.build(|index| {
            let field = fields[index];
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DecodeError::InvalidField {
                    index,
                    value: field.to_string(),
                })
        })
    }

    fn decode_packed(&self, payload: &[u8]) -> Result<Sample, DecodeError> {
        if payload.len() < self.required * F64_SIZE {
            return Ok(Sample::default());
        }

        self.build(|index| {
            let offset = index * F64_SIZE;
            let bits: u64 = bytemuck::pod_read_unaligned(&payload[offset..offset + F64_SIZE]);
            let value = f64::from_bits(u64::from_le(bits));
            if value.is_finite() {
                Ok(value)
            } else {
                Err(DecodeError::InvalidField {
                    index,
                    value: value.to_string(),
                })
            }
        })
    }

    fn build<F>(&self, mut raw: F) -> Result<Sample, DecodeError>
    where
        F: FnMut(usize) -> Result<f64, DecodeError>,
    {
        let mut sample = Sample::default();
        for field in &self.layout.fields {
            let value = units::convert(raw(field.index)?, field.conversion, self.layout.angle_scaling);
            sample.set(field.channel, value);
        }
        sample.populated = true;
        Ok(sample)
    }
}

fn trim_field(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}
