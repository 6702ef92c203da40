use serde::Serialize;
use thiserror::Error;

/// Errors produced by the audio window, capture coordination, and sources.
///
/// Every failing buffer operation leaves the buffer exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AudioError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("channel mismatch: expected {expected} channels per frame, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("write of {frames} frames exceeds buffer capacity of {capacity}")]
    BufferOverflow { frames: usize, capacity: usize },

    #[error("requested {requested} frames but only {available} are available")]
    RequestTooLarge { requested: usize, available: usize },

    #[error("capture device error: {0}")]
    CaptureDevice(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("sample rate mismatch: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error("decode failed: {0}")]
    Decode(String),
}
