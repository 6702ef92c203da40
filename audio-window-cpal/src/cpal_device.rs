//! cpal capture device.
//!
//! `cpal::Stream` is `!Send` on most hosts (COM on Windows, CoreAudio on
//! macOS), so each opened stream lives on a dedicated thread that builds it,
//! plays it on request, and drops it on shutdown. The handle returned to
//! `AudioRecord` only holds channels to that thread and is `Send`.

use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Sender};
use parking_lot::Mutex;

use audio_window_core::models::audio_models::{AudioFormat, DeviceInfo};
use audio_window_core::models::config::RecordConfig;
use audio_window_core::models::error::AudioError;
use audio_window_core::traits::capture_device::{AudioBufferCallback, CaptureDevice, CaptureStream};

use crate::device_enumerator;

/// An input device reached through the default cpal host.
///
/// With no name the system default input is used. A named device that is
/// not present falls back to the default with a warning.
pub struct CpalDevice {
    device_name: Option<String>,
}

impl CpalDevice {
    /// Capture from the system default input device.
    pub fn default_input() -> Self {
        Self { device_name: None }
    }

    /// Capture from the input device called `name`.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
        }
    }

    pub fn from_config(config: &RecordConfig) -> Self {
        Self {
            device_name: config.device_name.clone(),
        }
    }
}

impl CaptureDevice for CpalDevice {
    type Stream = CpalStream;

    fn is_available(&self) -> bool {
        resolve_device(self.device_name.as_deref()).is_ok()
    }

    fn open(
        &mut self,
        format: AudioFormat,
        callback: AudioBufferCallback,
    ) -> Result<CpalStream, AudioError> {
        let (ready_tx, ready_rx) = bounded::<Result<(), AudioError>>(1);
        let (command_tx, command_rx) = unbounded::<StreamCommand>();
        let device_name = self.device_name.clone();

        let handle = thread::Builder::new()
            .name("cpal-capture".into())
            .spawn(move || {
                let stream = match build_stream(device_name.as_deref(), format, callback) {
                    Ok(stream) => {
                        let _ = ready_tx.send(Ok(()));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                for command in command_rx.iter() {
                    match command {
                        StreamCommand::Play(reply) => {
                            let result = stream
                                .play()
                                .map_err(|e| AudioError::CaptureDevice(format!("play failed: {}", e)));
                            let _ = reply.send(result);
                        }
                        StreamCommand::Shutdown => break,
                    }
                }
                // Dropping the stream stops the device callback.
                drop(stream);
                log::debug!("cpal capture thread exiting");
            })
            .map_err(|e| AudioError::CaptureDevice(format!("failed to spawn capture thread: {}", e)))?;

        let opened = ready_rx.recv().unwrap_or_else(|_| {
            Err(AudioError::CaptureDevice("capture thread exited during open".into()))
        });
        if let Err(e) = opened {
            let _ = handle.join();
            return Err(e);
        }

        Ok(CpalStream {
            commands: command_tx,
            handle: Mutex::new(Some(handle)),
        })
    }

    fn device_info(&self) -> DeviceInfo {
        match resolve_device(self.device_name.as_deref()) {
            Ok(device) => {
                let default_name = device_enumerator::default_input_device_name();
                device_enumerator::describe(&device, default_name.as_deref())
            }
            Err(_) => DeviceInfo {
                id: self.device_name.clone().unwrap_or_else(|| "default-input".into()),
                name: self
                    .device_name
                    .clone()
                    .unwrap_or_else(|| "Default Input".into()),
                is_default: self.device_name.is_none(),
                default_format: None,
            },
        }
    }
}

enum StreamCommand {
    Play(Sender<Result<(), AudioError>>),
    Shutdown,
}

/// Handle to a stream owned by its capture thread.
pub struct CpalStream {
    commands: Sender<StreamCommand>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CaptureStream for CpalStream {
    fn start(&mut self) -> Result<(), AudioError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(StreamCommand::Play(reply_tx))
            .map_err(|_| AudioError::CaptureDevice("capture thread is gone".into()))?;
        reply_rx
            .recv()
            .map_err(|_| AudioError::CaptureDevice("capture thread is gone".into()))?
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        let _ = self.commands.send(StreamCommand::Shutdown);
        if let Some(handle) = self.handle.lock().take() {
            handle
                .join()
                .map_err(|_| AudioError::CaptureDevice("capture thread panicked".into()))?;
        }
        Ok(())
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Find the named input device, falling back to the default input.
fn resolve_device(preferred_name: Option<&str>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();

    if let Some(preferred_name) = preferred_name {
        match host.input_devices() {
            Ok(mut devices) => {
                let found = devices.find(|device| {
                    device
                        .name()
                        .map(|name| name == preferred_name)
                        .unwrap_or(false)
                });
                if let Some(device) = found {
                    return Ok(device);
                }
                log::warn!(
                    "Input device '{}' not found, falling back to default",
                    preferred_name
                );
            }
            Err(e) => log::warn!("Failed to list input devices: {}", e),
        }
    }

    host.default_input_device()
        .ok_or_else(|| AudioError::CaptureDevice("no input device available".into()))
}

/// Pick the best sample format the device offers for exactly `format`.
fn select_sample_format(device: &cpal::Device, format: AudioFormat) -> Result<SampleFormat, AudioError> {
    let configs = device
        .supported_input_configs()
        .map_err(|e| AudioError::CaptureDevice(format!("failed to query configs: {}", e)))?;

    let mut offered: Vec<SampleFormat> = configs
        .filter(|c| {
            c.channels() == format.channels
                && c.min_sample_rate().0 <= format.sample_rate
                && format.sample_rate <= c.max_sample_rate().0
        })
        .map(|c| c.sample_format())
        .collect();
    offered.sort_by_key(|f| match f {
        SampleFormat::F32 => 0,
        SampleFormat::I16 => 1,
        SampleFormat::U16 => 2,
        _ => 3,
    });

    offered
        .into_iter()
        .find(|f| matches!(f, SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16))
        .ok_or_else(|| AudioError::CaptureDevice(format!("device does not support {}", format)))
}

fn build_stream(
    device_name: Option<&str>,
    format: AudioFormat,
    callback: AudioBufferCallback,
) -> Result<Stream, AudioError> {
    let device = resolve_device(device_name)?;
    let sample_format = select_sample_format(&device, format)?;

    log::info!(
        "Opening input device '{}' ({}, {:?})",
        device.name().unwrap_or_default(),
        format,
        sample_format
    );

    let config = StreamConfig {
        channels: format.channels,
        sample_rate: SampleRate(format.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = match sample_format {
        SampleFormat::F32 => {
            let (rate, channels) = (format.sample_rate, format.channels);
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| callback(data, rate, channels),
                |err| log::error!("Input stream error: {}", err),
                None,
            )
        }
        SampleFormat::I16 => build_converting::<i16, _>(&device, &config, callback, |s| {
            s as f32 / 32768.0
        }),
        SampleFormat::U16 => build_converting::<u16, _>(&device, &config, callback, |s| {
            (s as f32 - 32768.0) / 32768.0
        }),
        other => {
            return Err(AudioError::CaptureDevice(format!(
                "unsupported sample format: {:?}",
                other
            )))
        }
    }
    .map_err(|e| AudioError::CaptureDevice(format!("failed to build input stream: {}", e)))?;

    Ok(stream)
}

/// Build a stream for a non-f32 sample type, converting into a reused buffer.
fn build_converting<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    callback: AudioBufferCallback,
    convert: F,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    F: Fn(T) -> f32 + Send + 'static,
{
    let (rate, channels) = (config.sample_rate.0, config.channels);
    let mut scratch: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            scratch.clear();
            scratch.extend(data.iter().map(|s| convert(*s)));
            callback(&scratch, rate, channels);
        },
        |err| log::error!("Input stream error: {}", err),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_selects_named_device() {
        let config = RecordConfig {
            device_name: Some("USB Mic".into()),
            ..Default::default()
        };
        let device = CpalDevice::from_config(&config);
        assert_eq!(device.device_name.as_deref(), Some("USB Mic"));
        assert!(CpalDevice::default_input().device_name.is_none());
    }
}
