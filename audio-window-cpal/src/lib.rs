//! # audio-window-cpal
//!
//! cpal capture backend for audio-window.
//!
//! Provides:
//! - `CpalDevice`: `CaptureDevice` over any cpal input device (ALSA,
//!   CoreAudio, WASAPI, ...)
//! - `device_enumerator`: input device listing
//!
//! ## Usage
//! ```ignore
//! use audio_window_core::{AudioFormat, AudioRecord};
//! use audio_window_cpal::CpalDevice;
//!
//! let mut record = AudioRecord::new(CpalDevice::default_input(), AudioFormat::mono(16000), 15600)?;
//! record.start_recording()?;
//! let latest = record.read(8000)?;
//! ```

pub mod cpal_device;
pub mod device_enumerator;

pub use cpal_device::{CpalDevice, CpalStream};
pub use device_enumerator::{default_input_device_name, list_input_devices};
