use crate::models::audio_models::AudioFormat;
use crate::models::error::AudioError;
use crate::processing::frames::AudioFrames;
use crate::session::window::WindowReader;
use crate::source::static_source::StaticAudioSource;
use crate::traits::inference::InferenceEngine;

/// Audio input for inference: either a live rolling window or a fixed clip.
///
/// Both variants answer the same questions (format, frame count, last N
/// frames), so downstream code never needs to know where audio came from.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Rolling window fed by a capture device.
    Ring(WindowReader),
    /// Pre-decoded audio, e.g. from a WAV file.
    Static(StaticAudioSource),
}

impl AudioSource {
    pub fn format(&self) -> AudioFormat {
        match self {
            Self::Ring(reader) => reader.format(),
            Self::Static(source) => source.format(),
        }
    }

    /// Frames available to read: the window capacity or the clip length.
    pub fn frame_count(&self) -> usize {
        match self {
            Self::Ring(reader) => reader.capacity(),
            Self::Static(source) => source.frame_count(),
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Ring(_))
    }

    /// The last `count` frames, oldest first.
    pub fn read(&self, count: usize) -> Result<AudioFrames, AudioError> {
        match self {
            Self::Ring(reader) => reader.read(count),
            Self::Static(source) => source.read(count),
        }
    }

    pub fn read_at(&self, offset: usize, count: usize) -> Result<AudioFrames, AudioError> {
        match self {
            Self::Ring(reader) => reader.read_at(offset, count),
            Self::Static(source) => source.read_at(offset, count),
        }
    }

    pub fn snapshot(&self) -> AudioFrames {
        match self {
            Self::Ring(reader) => reader.snapshot(),
            Self::Static(source) => source.snapshot(),
        }
    }

    /// Feed the latest `engine.input_frame_count()` frames to `engine`.
    ///
    /// Fails with `Config` if the source format differs from what the
    /// engine expects.
    pub fn run<E: InferenceEngine>(&self, engine: &mut E) -> Result<E::Output, E::Error> {
        let expected = engine.input_format();
        if self.format() != expected {
            return Err(AudioError::Config(format!(
                "engine expects {}, source provides {}",
                expected,
                self.format()
            ))
            .into());
        }
        let frames = self.read(engine.input_frame_count())?;
        engine.run(&frames)
    }
}

impl From<WindowReader> for AudioSource {
    fn from(reader: WindowReader) -> Self {
        Self::Ring(reader)
    }
}

impl From<StaticAudioSource> for AudioSource {
    fn from(source: StaticAudioSource) -> Self {
        Self::Static(source)
    }
}
