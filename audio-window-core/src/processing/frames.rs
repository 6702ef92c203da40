use std::sync::Arc;

use crate::models::audio_models::AudioFormat;

/// An immutable block of interleaved audio frames tagged with its format.
///
/// Returned by every read on a window or source. Storage is shared, so
/// cloning is cheap and the value can be handed to another thread as is.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrames {
    format: AudioFormat,
    samples: Arc<[f32]>,
}

impl AudioFrames {
    /// Wrap interleaved samples. `samples.len()` must be a multiple of the
    /// channel count; callers inside the crate guarantee this.
    pub(crate) fn new(format: AudioFormat, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len() % format.frame_width(), 0);
        Self {
            format,
            samples: samples.into(),
        }
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.format.frame_width()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved samples, oldest frame first.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Frame at `index`, or None if out of range.
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let width = self.format.frame_width();
        let start = index.checked_mul(width)?;
        let end = start.checked_add(width)?;
        self.samples.get(start..end)
    }

    pub fn frames(&self) -> impl Iterator<Item = &[f32]> {
        self.samples.chunks_exact(self.format.frame_width())
    }

    /// De-interleave a single channel.
    pub fn channel(&self, channel: usize) -> Option<Vec<f32>> {
        if channel >= self.format.frame_width() {
            return None;
        }
        Some(self.frames().map(|frame| frame[channel]).collect())
    }

    /// Duration covered by these frames in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.format.duration_secs(self.frame_count())
    }

    /// RMS level across all samples, 0.0 for an empty block.
    pub fn rms_level(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = self.samples.iter().map(|s| s * s).sum();
        (sum_sq / self.samples.len() as f32).sqrt()
    }

    /// Peak absolute sample value.
    pub fn peak_level(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.to_vec()
    }
}
