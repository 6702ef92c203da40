use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::models::audio_models::AudioFormat;
use crate::models::error::AudioError;
use crate::traits::wave_decoder::WaveDecoder;

/// [`WaveDecoder`] backed by `hound`.
///
/// Integer PCM (8 to 32 bit) is scaled to [-1.0, 1.0); float PCM is passed
/// through. Channel layout is preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoundDecoder;

impl WaveDecoder for HoundDecoder {
    fn decode(&self, path: &Path) -> Result<(Vec<f32>, AudioFormat), AudioError> {
        let mut reader = WavReader::open(path)
            .map_err(|e| AudioError::Decode(format!("failed to open {}: {}", path.display(), e)))?;
        let spec = reader.spec();
        let format = AudioFormat::new(spec.channels, spec.sample_rate);
        format.validate()?;

        let samples = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>(),
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(AudioError::Decode(format!(
                        "unsupported bit depth: {}",
                        spec.bits_per_sample
                    )));
                }
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()
            }
        }
        .map_err(|e| AudioError::Decode(format!("failed to read samples: {}", e)))?;

        if samples.len() % format.frame_width() != 0 {
            return Err(AudioError::Decode(format!(
                "{} samples do not form whole {}-channel frames",
                samples.len(),
                format.channels
            )));
        }

        log::debug!("Decoded {} ({}, {} samples)", path.display(), format, samples.len());
        Ok((samples, format))
    }
}
