use std::path::Path;

use crate::models::audio_models::AudioFormat;
use crate::models::error::AudioError;

/// Decodes an audio file into interleaved f32 samples and their format.
pub trait WaveDecoder {
    fn decode(&self, path: &Path) -> Result<(Vec<f32>, AudioFormat), AudioError>;
}
