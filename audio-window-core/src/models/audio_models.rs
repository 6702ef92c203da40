use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AudioError;

/// Channel count and sample rate of an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    pub channels: u16,
    pub sample_rate: u32,
}

impl AudioFormat {
    pub const fn new(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    pub const fn mono(sample_rate: u32) -> Self {
        Self::new(1, sample_rate)
    }

    pub fn validate(&self) -> Result<(), AudioError> {
        if self.channels == 0 {
            return Err(AudioError::Config("channel count must be positive".into()));
        }
        if self.sample_rate == 0 {
            return Err(AudioError::Config("sample rate must be positive".into()));
        }
        Ok(())
    }

    /// Number of samples in one frame.
    pub fn frame_width(&self) -> usize {
        self.channels as usize
    }

    /// Duration of `frames` frames in seconds.
    pub fn duration_secs(&self, frames: usize) -> f64 {
        frames as f64 / self.sample_rate as f64
    }

    /// Number of whole frames covering `secs` seconds.
    pub fn frames_for_secs(&self, secs: f64) -> usize {
        (secs * self.sample_rate as f64).round() as usize
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz, {} ch", self.sample_rate, self.channels)
    }
}

/// An audio input device available for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    /// Format the device prefers, if it could be queried.
    pub default_format: Option<AudioFormat>,
}

/// A capture-callback failure, kept for the consumer to poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackError {
    pub error: AudioError,
    pub at: DateTime<Utc>,
}

impl CallbackError {
    pub fn now(error: AudioError) -> Self {
        Self {
            error,
            at: Utc::now(),
        }
    }
}

/// Counters for debugging a capture session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordDiagnostics {
    pub callback_count: u64,
    pub frames_written: u64,
    pub chunks_dropped: u64,
    pub last_error: Option<CallbackError>,
}
