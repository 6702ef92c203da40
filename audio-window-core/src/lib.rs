//! # audio-window-core
//!
//! Platform-agnostic rolling audio window.
//!
//! Keeps the most recent frames of a capture stream in a fixed-capacity
//! ring buffer so inference can run repeatedly on the latest audio.
//! Platform backends (cpal) implement the `CaptureDevice` trait and plug
//! into the generic `AudioRecord`.
//!
//! ## Architecture
//!
//! ```text
//! audio-window-core (this crate)
//! ├── traits/       ← CaptureDevice, CaptureStream, RecordDelegate, WaveDecoder, InferenceEngine
//! ├── models/       ← AudioError, AudioFormat, RecordState, RecordConfig, diagnostics
//! ├── processing/   ← RingBuffer, AudioFrames
//! ├── session/      ← AudioRecord (capture coordinator), SharedWindow
//! ├── source/       ← StaticAudioSource, AudioSource (ring | static)
//! └── storage/      ← HoundDecoder (WAV files)
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod source;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioFormat, CallbackError, DeviceInfo, RecordDiagnostics};
pub use models::config::RecordConfig;
pub use models::error::AudioError;
pub use models::state::RecordState;
pub use processing::frames::AudioFrames;
pub use processing::ring_buffer::RingBuffer;
pub use session::record::AudioRecord;
pub use session::window::{SharedWindow, WindowReader};
pub use source::audio_source::AudioSource;
pub use source::static_source::StaticAudioSource;
pub use storage::wav_decoder::HoundDecoder;
pub use traits::capture_device::{AudioBufferCallback, CaptureDevice, CaptureStream};
pub use traits::inference::InferenceEngine;
pub use traits::record_delegate::RecordDelegate;
pub use traits::wave_decoder::WaveDecoder;
