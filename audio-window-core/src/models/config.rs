use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::audio_models::AudioFormat;
use super::error::AudioError;

/// Configuration for an audio record.
///
/// Loaded from JSON; missing fields fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Sample rate in Hz the window is tagged with (default: 16000).
    pub sample_rate: u32,

    /// Number of channels per frame (default: 1).
    pub channels: u16,

    /// Window capacity in frames (default: 15600, just under one second at 16 kHz).
    pub window_frames: usize,

    /// Input device name, or None for the system default.
    pub device_name: Option<String>,
}

impl RecordConfig {
    pub fn validate(&self) -> Result<(), AudioError> {
        self.format().validate()?;
        if self.window_frames == 0 {
            return Err(AudioError::Config("window must hold at least one frame".into()));
        }
        Ok(())
    }

    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.channels, self.sample_rate)
    }

    pub fn from_json_str(json: &str) -> Result<Self, AudioError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AudioError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, AudioError> {
        let json = fs::read_to_string(path).map_err(|e| {
            AudioError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            window_frames: 15600,
            device_name: None,
        }
    }
}
