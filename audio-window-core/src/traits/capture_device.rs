use std::sync::Arc;

use crate::models::audio_models::{AudioFormat, DeviceInfo};
use crate::models::error::AudioError;

/// Callback invoked when a captured buffer is available.
///
/// Parameters:
/// - `samples`: Interleaved f32 samples, oldest frame first.
/// - `sample_rate`: The actual sample rate of the delivered audio.
/// - `channels`: Number of interleaved channels.
///
/// Fires on a thread owned by the device backend; it must never panic back
/// into it.
pub type AudioBufferCallback = Arc<dyn Fn(&[f32], u32, u16) + Send + Sync + 'static>;

/// Interface for platform-specific capture devices.
///
/// Implemented by:
/// - `CpalDevice` (audio-window-cpal)
/// - test doubles that drive the callback by hand
pub trait CaptureDevice: Send {
    type Stream: CaptureStream;

    /// Whether this device can currently be opened.
    fn is_available(&self) -> bool;

    /// Open a stream delivering `format` audio to `callback`.
    ///
    /// The stream does not deliver anything until [`CaptureStream::start`].
    fn open(
        &mut self,
        format: AudioFormat,
        callback: AudioBufferCallback,
    ) -> Result<Self::Stream, AudioError>;

    /// Information about the device backing this capture.
    fn device_info(&self) -> DeviceInfo;
}

/// An opened capture stream. Dropping it releases the device.
pub trait CaptureStream: Send {
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop delivering buffers. After this returns the callback is not
    /// invoked again by this stream.
    fn stop(&mut self) -> Result<(), AudioError>;
}
