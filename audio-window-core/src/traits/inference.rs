use crate::models::audio_models::AudioFormat;
use crate::processing::frames::AudioFrames;

/// Downstream model fed with the latest audio window.
///
/// Classification and embedding engines live outside this crate; they only
/// declare the input they expect and consume [`AudioFrames`].
pub trait InferenceEngine {
    type Output;
    type Error: From<crate::models::error::AudioError>;

    /// Format the model input must have.
    fn input_format(&self) -> AudioFormat;

    /// Number of frames consumed per run.
    fn input_frame_count(&self) -> usize;

    fn run(&mut self, frames: &AudioFrames) -> Result<Self::Output, Self::Error>;
}
