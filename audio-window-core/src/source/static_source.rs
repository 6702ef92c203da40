use std::path::Path;

use crate::models::audio_models::AudioFormat;
use crate::models::error::AudioError;
use crate::processing::frames::AudioFrames;
use crate::traits::wave_decoder::WaveDecoder;

/// Immutable, fully populated audio, typically decoded from a file.
///
/// There is no write path: the frames are fixed at construction and reads
/// are slices of them. The whole clip plays the role of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticAudioSource {
    frames: AudioFrames,
}

impl StaticAudioSource {
    pub fn new(format: AudioFormat, samples: Vec<f32>) -> Result<Self, AudioError> {
        format.validate()?;
        let width = format.frame_width();
        if samples.len() % width != 0 {
            return Err(AudioError::ChannelMismatch {
                expected: width,
                actual: samples.len() % width,
            });
        }
        Ok(Self {
            frames: AudioFrames::new(format, samples),
        })
    }

    pub fn from_decoder<W: WaveDecoder + ?Sized>(decoder: &W, path: &Path) -> Result<Self, AudioError> {
        let (samples, format) = decoder.decode(path)?;
        Self::loaded(format, samples, path)
    }

    /// Decode `path`, keeping only the first `max_frames` frames. Shorter
    /// clips are kept whole.
    ///
    /// With `max_frames` set to an engine's input size, the clip is exactly
    /// one engine input taken from the start of the file.
    pub fn from_decoder_with_limit<W: WaveDecoder + ?Sized>(
        decoder: &W,
        path: &Path,
        max_frames: usize,
    ) -> Result<Self, AudioError> {
        let (mut samples, format) = decoder.decode(path)?;
        format.validate()?;
        let limit = max_frames.saturating_mul(format.frame_width());
        if samples.len() > limit {
            log::debug!("Keeping the first {} frames of {}", max_frames, path.display());
            samples.truncate(limit);
        }
        Self::loaded(format, samples, path)
    }

    fn loaded(format: AudioFormat, samples: Vec<f32>, path: &Path) -> Result<Self, AudioError> {
        let source = Self::new(format, samples)?;
        log::debug!(
            "Loaded {} frames ({}) from {}",
            source.frame_count(),
            format,
            path.display()
        );
        Ok(source)
    }

    pub fn format(&self) -> AudioFormat {
        self.frames.format()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.frame_count()
    }

    /// The last `count` frames, oldest first.
    pub fn read(&self, count: usize) -> Result<AudioFrames, AudioError> {
        let available = self.frame_count();
        if count > available {
            return Err(AudioError::RequestTooLarge {
                requested: count,
                available,
            });
        }
        self.read_at(available - count, count)
    }

    /// `count` frames starting at frame `offset`.
    pub fn read_at(&self, offset: usize, count: usize) -> Result<AudioFrames, AudioError> {
        let available = self.frame_count();
        let end = offset
            .checked_add(count)
            .filter(|end| *end <= available)
            .ok_or(AudioError::RequestTooLarge {
                requested: offset.saturating_add(count),
                available,
            })?;

        if offset == 0 && end == available {
            return Ok(self.frames.clone());
        }
        let width = self.format().frame_width();
        let samples = self.frames.samples()[offset * width..end * width].to_vec();
        Ok(AudioFrames::new(self.format(), samples))
    }

    /// All frames. Shares storage with the source.
    pub fn snapshot(&self) -> AudioFrames {
        self.frames.clone()
    }
}
