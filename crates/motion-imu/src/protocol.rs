use crate::types::{AttitudeAngles, MotionSample, SensorEvent};
use glam::DVec3;
use serde::Deserialize;
use std::collections::VecDeque;
use thiserror::Error;

/// Longest line accepted before the partial line is discarded.
pub const MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Line is not valid UTF-8")]
    InvalidUtf8,
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Line exceeded {} bytes without a newline", MAX_LINE_LEN)]
    LineTooLong,
}

/// Wire representation: one JSON object per line, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireEvent {
    Orientation {
        #[serde(default)]
        alpha: Option<f64>,
        #[serde(default)]
        beta: Option<f64>,
        #[serde(default)]
        gamma: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Motion {
        #[serde(default)]
        acceleration: WireVector,
        #[serde(default)]
        acceleration_including_gravity: WireVector,
    },
}

#[derive(Debug, Default, Deserialize)]
struct WireVector {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    z: Option<f64>,
}

impl From<WireVector> for DVec3 {
    fn from(v: WireVector) -> Self {
        DVec3::new(
            v.x.unwrap_or(0.0),
            v.y.unwrap_or(0.0),
            v.z.unwrap_or(0.0),
        )
    }
}

impl From<WireEvent> for SensorEvent {
    fn from(event: WireEvent) -> Self {
        match event {
            WireEvent::Orientation { alpha, beta, gamma } => {
                SensorEvent::Orientation(AttitudeAngles { alpha, beta, gamma })
            }
            WireEvent::Motion {
                acceleration,
                acceleration_including_gravity,
            } => SensorEvent::Motion(MotionSample {
                acceleration: acceleration.into(),
                acceleration_including_gravity: acceleration_including_gravity.into(),
            }),
        }
    }
}

/// Decode a single line (without its newline).
pub fn parse_line(line: &[u8]) -> Result<SensorEvent, ProtocolError> {
    let text = std::str::from_utf8(line).map_err(|_| ProtocolError::InvalidUtf8)?;
    let event: WireEvent = serde_json::from_str(text)?;
    Ok(event.into())
}

/// Streaming parser for newline-delimited JSON sensor events.
///
/// Feed raw bytes via `push_data`, then drain parsed events via `next_event`.
pub struct ProtocolParser {
    buffer: VecDeque<u8>,
}

impl ProtocolParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_LINE_LEN),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Bytes waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Try to extract the next complete event from the buffer.
    /// Returns `None` if no complete line is available yet.
    pub fn next_event(&mut self) -> Option<Result<SensorEvent, ProtocolError>> {
        loop {
            let newline = self.buffer.iter().position(|&b| b == b'\n');

            let Some(end) = newline else {
                if self.buffer.len() > MAX_LINE_LEN {
                    self.buffer.clear();
                    return Some(Err(ProtocolError::LineTooLong));
                }
                return None;
            };

            let line: Vec<u8> = self.buffer.drain(..=end).take(end).collect();
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            return Some(parse_line(line));
        }
    }
}

impl Default for ProtocolParser {
    fn default() -> Self {
        Self::new()
    }
}
