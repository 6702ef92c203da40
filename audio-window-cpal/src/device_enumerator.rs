//! Input device enumeration via the default cpal host.

use cpal::traits::{DeviceTrait, HostTrait};

use audio_window_core::models::audio_models::{AudioFormat, DeviceInfo};

/// List available input devices with their preferred formats.
///
/// Returns an empty `Vec` if the host cannot enumerate devices.
pub fn list_input_devices() -> Vec<DeviceInfo> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    match host.input_devices() {
        Ok(devices) => devices
            .map(|device| describe(&device, default_name.as_deref()))
            .collect(),
        Err(e) => {
            log::warn!("Failed to enumerate input devices: {}", e);
            Vec::new()
        }
    }
}

/// Name of the system default input device, if any.
pub fn default_input_device_name() -> Option<String> {
    cpal::default_host()
        .default_input_device()
        .and_then(|d| d.name().ok())
}

/// Describe a cpal device. cpal exposes no stable device ID, so the name
/// doubles as the ID.
pub(crate) fn describe(device: &cpal::Device, default_name: Option<&str>) -> DeviceInfo {
    let name = device.name().unwrap_or_else(|_| "Unknown".into());
    let default_format = device
        .default_input_config()
        .ok()
        .map(|c| AudioFormat::new(c.channels(), c.sample_rate().0));

    DeviceInfo {
        id: name.clone(),
        is_default: default_name == Some(name.as_str()),
        name,
        default_format,
    }
}
