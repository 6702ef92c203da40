//! Record from an input device and log the level of the latest window.
//!
//! ```text
//! window-monitor [--list] [CONFIG.json] [SECONDS]
//! ```
//!
//! `RUST_LOG=debug` shows stream setup details.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use audio_window_core::{AudioRecord, RecordConfig};
use audio_window_cpal::{list_input_devices, CpalDevice};

const REPORT_INTERVAL: Duration = Duration::from_millis(500);

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--list") {
        for device in list_input_devices() {
            let marker = if device.is_default { "*" } else { " " };
            match device.default_format {
                Some(format) => println!("{} {} ({})", marker, device.name, format),
                None => println!("{} {}", marker, device.name),
            }
        }
        return Ok(());
    }

    let config = match args.first() {
        Some(path) => RecordConfig::load(Path::new(path))?,
        None => RecordConfig::default(),
    };
    let seconds: u64 = match args.get(1) {
        Some(s) => s.parse()?,
        None => 10,
    };

    let device = CpalDevice::from_config(&config);
    let mut record = AudioRecord::from_config(device, &config)?;
    let source = record.source();

    log::info!(
        "Monitoring '{}' for {}s ({} frame window)",
        record.device_info().name,
        seconds,
        record.capacity()
    );
    record.start_recording()?;

    let deadline = Instant::now() + Duration::from_secs(seconds);
    while Instant::now() < deadline {
        thread::sleep(REPORT_INTERVAL);
        let window = source.snapshot();
        log::info!(
            "window {:.2}s  rms {:.4}  peak {:.4}",
            window.duration_secs(),
            window.rms_level(),
            window.peak_level()
        );
        if let Some(err) = record.take_last_error() {
            log::warn!("capture error at {}: {}", err.at.format("%H:%M:%S%.3f"), err.error);
        }
    }

    record.stop()?;

    let diag = record.diagnostics();
    log::info!(
        "Done: {} callbacks, {} frames written, {} chunks dropped",
        diag.callback_count,
        diag.frames_written,
        diag.chunks_dropped
    );
    Ok(())
}
