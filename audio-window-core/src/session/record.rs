use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::audio_models::{AudioFormat, CallbackError, DeviceInfo, RecordDiagnostics};
use crate::models::config::RecordConfig;
use crate::models::error::AudioError;
use crate::models::state::RecordState;
use crate::processing::frames::AudioFrames;
use crate::session::window::{SharedWindow, WindowReader};
use crate::source::audio_source::AudioSource;
use crate::traits::capture_device::{AudioBufferCallback, CaptureDevice, CaptureStream};
use crate::traits::inference::InferenceEngine;
use crate::traits::record_delegate::RecordDelegate;

/// State shared with the capture callback.
struct CaptureShared {
    window: SharedWindow,
    /// Epoch of the session allowed to write, `None` while not recording.
    ///
    /// The callback holds a read guard for the duration of a write, so
    /// taking the write guard waits for in-flight writes to finish.
    gate: RwLock<Option<u64>>,
    diagnostics: Mutex<RecordDiagnostics>,
    delegate: RwLock<Option<Arc<dyn RecordDelegate>>>,
}

impl CaptureShared {
    fn on_buffer(&self, epoch: u64, samples: &[f32], sample_rate: u32, channels: u16) {
        let result = {
            let gate = self.gate.read();
            if *gate != Some(epoch) {
                return;
            }
            let expected_rate = self.window.format().sample_rate;
            if sample_rate != expected_rate {
                Err(AudioError::SampleRateMismatch {
                    expected: expected_rate,
                    actual: sample_rate,
                })
            } else {
                self.window.write_interleaved(samples, channels)
            }
        };

        let frames = samples.len() / (channels.max(1) as usize);
        let mut diag = self.diagnostics.lock();
        diag.callback_count += 1;
        match result {
            Ok(()) => diag.frames_written += frames as u64,
            Err(error) => {
                diag.chunks_dropped += 1;
                // Log the first drop and then every 100th to keep a
                // misconfigured device from flooding the log.
                if diag.chunks_dropped % 100 == 1 {
                    log::warn!(
                        "Dropped captured chunk of {} samples ({} dropped so far): {}",
                        samples.len(),
                        diag.chunks_dropped,
                        error
                    );
                }
                diag.last_error = Some(CallbackError::now(error.clone()));
                drop(diag);

                if let Some(ref delegate) = *self.delegate.read() {
                    delegate.on_error(&error);
                }
            }
        }
    }
}

/// Streams audio from a capture device into a rolling window.
///
/// The record owns the window and the device stream. The device invokes a
/// registered callback on its own thread; consumers read the latest frames
/// with [`read`](Self::read) / [`snapshot`](Self::snapshot), or through a
/// [`WindowReader`] handed to another thread.
///
/// ```text
/// [CaptureDevice] → callback → [SharedWindow] ← read/snapshot ← consumer
/// ```
pub struct AudioRecord<D: CaptureDevice> {
    id: Uuid,
    device: D,
    stream: Option<D::Stream>,
    state: RecordState,
    epoch: u64,
    shared: Arc<CaptureShared>,
}

impl<D: CaptureDevice> AudioRecord<D> {
    pub fn new(device: D, format: AudioFormat, capacity: usize) -> Result<Self, AudioError> {
        let window = SharedWindow::new(format, capacity)?;
        Ok(Self {
            id: Uuid::new_v4(),
            device,
            stream: None,
            state: RecordState::Idle,
            epoch: 0,
            shared: Arc::new(CaptureShared {
                window,
                gate: RwLock::new(None),
                diagnostics: Mutex::new(RecordDiagnostics::default()),
                delegate: RwLock::new(None),
            }),
        })
    }

    pub fn from_config(device: D, config: &RecordConfig) -> Result<Self, AudioError> {
        config.validate()?;
        Self::new(device, config.format(), config.window_frames)
    }

    /// A record whose window matches the input an engine expects.
    pub fn for_engine<E: InferenceEngine>(device: D, engine: &E) -> Result<Self, AudioError> {
        Self::new(device, engine.input_format(), engine.input_frame_count())
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecordDelegate>) {
        *self.shared.delegate.write() = Some(delegate);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn format(&self) -> AudioFormat {
        self.shared.window.format()
    }

    pub fn capacity(&self) -> usize {
        self.shared.window.capacity()
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.device.device_info()
    }

    pub fn diagnostics(&self) -> RecordDiagnostics {
        self.shared.diagnostics.lock().clone()
    }

    /// Take the most recent callback error, if any, clearing it.
    pub fn take_last_error(&self) -> Option<CallbackError> {
        self.shared.diagnostics.lock().last_error.take()
    }

    /// Open the device and start streaming into the window.
    /// Transitions: idle/stopped → recording.
    ///
    /// On failure the state and the window are unchanged.
    pub fn start_recording(&mut self) -> Result<(), AudioError> {
        if !self.state.can_start() {
            return Err(AudioError::InvalidState(format!(
                "cannot start recording while {}",
                self.state
            )));
        }

        let format = self.format();
        // Every attempt gets a fresh epoch so a stream that failed to start
        // can never write into a later session.
        self.epoch += 1;
        let epoch = self.epoch;
        let shared = Arc::clone(&self.shared);
        let callback: AudioBufferCallback =
            Arc::new(move |samples: &[f32], sample_rate: u32, channels: u16| {
                shared.on_buffer(epoch, samples, sample_rate, channels);
            });

        let mut stream = self.device.open(format, callback)?;

        *self.shared.gate.write() = Some(epoch);
        if let Err(e) = stream.start() {
            *self.shared.gate.write() = None;
            log::error!("Audio record {} failed to start: {}", self.id, e);
            return Err(e);
        }

        self.stream = Some(stream);
        log::info!(
            "Audio record {} recording from '{}' ({}, {} frame window)",
            self.id,
            self.device.device_info().name,
            format,
            self.capacity()
        );
        self.set_state(RecordState::Recording);
        Ok(())
    }

    /// Stop streaming. Transitions: recording → stopped.
    ///
    /// Waits for any in-flight callback write before releasing the device,
    /// so the window is frozen once this returns. The window is not cleared.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        if !self.state.is_recording() {
            return Err(AudioError::InvalidState(format!(
                "cannot stop while {}",
                self.state
            )));
        }

        *self.shared.gate.write() = None;

        let result = match self.stream.take() {
            Some(mut stream) => stream.stop(),
            None => Ok(()),
        };
        if let Err(ref e) = result {
            log::error!("Audio record {} failed to stop stream cleanly: {}", self.id, e);
        }

        log::info!("Audio record {} stopped", self.id);
        self.set_state(RecordState::Stopped);
        result
    }

    /// The last `count` frames, oldest first.
    pub fn read(&self, count: usize) -> Result<AudioFrames, AudioError> {
        self.shared.window.read(count)
    }

    pub fn read_at(&self, offset: usize, count: usize) -> Result<AudioFrames, AudioError> {
        self.shared.window.read_at(offset, count)
    }

    pub fn snapshot(&self) -> AudioFrames {
        self.shared.window.snapshot()
    }

    /// Write frames directly, bypassing the device.
    pub fn write<F: AsRef<[f32]>>(&self, frames: &[F]) -> Result<(), AudioError> {
        self.shared.window.write(frames)
    }

    pub fn clear(&self) {
        self.shared.window.clear();
    }

    /// Read-only handle on the window for a consumer thread.
    pub fn reader(&self) -> WindowReader {
        self.shared.window.reader()
    }

    /// The window as a consumer-facing [`AudioSource`].
    pub fn source(&self) -> AudioSource {
        AudioSource::Ring(self.reader())
    }

    fn set_state(&mut self, state: RecordState) {
        self.state = state;
        if let Some(ref delegate) = *self.shared.delegate.read() {
            delegate.on_state_changed(&state);
        }
    }
}

impl<D: CaptureDevice> Drop for AudioRecord<D> {
    fn drop(&mut self) {
        if self.state.is_recording() {
            if let Err(e) = self.stop() {
                log::warn!("Audio record {} dropped with stream error: {}", self.id, e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Device double: keeps the callback so tests can drive it by hand.
    #[derive(Default)]
    pub(crate) struct MockHandle {
        pub callback: Mutex<Option<AudioBufferCallback>>,
        pub opened: AtomicUsize,
        pub started: AtomicUsize,
        pub stopped: AtomicUsize,
        pub fail_open: AtomicBool,
        pub fail_start: AtomicBool,
        pub fail_stop: AtomicBool,
    }

    impl MockHandle {
        pub fn emit(&self, samples: &[f32], sample_rate: u32, channels: u16) {
            let callback = self.callback.lock().clone();
            if let Some(callback) = callback {
                callback(samples, sample_rate, channels);
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct MockDevice {
        pub handle: Arc<MockHandle>,
    }

    pub(crate) struct MockStream {
        handle: Arc<MockHandle>,
    }

    impl CaptureDevice for MockDevice {
        type Stream = MockStream;

        fn is_available(&self) -> bool {
            true
        }

        fn open(
            &mut self,
            _format: AudioFormat,
            callback: AudioBufferCallback,
        ) -> Result<MockStream, AudioError> {
            if self.handle.fail_open.load(Ordering::SeqCst) {
                return Err(AudioError::CaptureDevice("no such device".into()));
            }
            self.handle.opened.fetch_add(1, Ordering::SeqCst);
            *self.handle.callback.lock() = Some(callback);
            Ok(MockStream {
                handle: Arc::clone(&self.handle),
            })
        }

        fn device_info(&self) -> DeviceInfo {
            DeviceInfo {
                id: "mock".into(),
                name: "Mock Microphone".into(),
                is_default: true,
                default_format: None,
            }
        }
    }

    impl CaptureStream for MockStream {
        fn start(&mut self) -> Result<(), AudioError> {
            if self.handle.fail_start.load(Ordering::SeqCst) {
                return Err(AudioError::CaptureDevice("device busy".into()));
            }
            self.handle.started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            self.handle.stopped.fetch_add(1, Ordering::SeqCst);
            if self.handle.fail_stop.load(Ordering::SeqCst) {
                return Err(AudioError::CaptureDevice("stop failed".into()));
            }
            Ok(())
        }
    }

    fn mono_record(capacity: usize) -> (AudioRecord<MockDevice>, Arc<MockHandle>) {
        let device = MockDevice::default();
        let handle = Arc::clone(&device.handle);
        let record = AudioRecord::new(device, AudioFormat::mono(16000), capacity).unwrap();
        (record, handle)
    }

    #[derive(Default)]
    struct RecordingDelegate {
        states: Mutex<Vec<RecordState>>,
        errors: Mutex<Vec<AudioError>>,
    }

    impl RecordDelegate for RecordingDelegate {
        fn on_state_changed(&self, state: &RecordState) {
            self.states.lock().push(*state);
        }

        fn on_error(&self, error: &AudioError) {
            self.errors.lock().push(error.clone());
        }
    }

    #[test]
    fn reads_zero_window_before_recording() {
        let (record, _) = mono_record(4);
        assert!(record.state().is_idle());
        assert_eq!(record.snapshot().to_vec(), vec![0.0; 4]);
        assert_eq!(record.read(2).unwrap().to_vec(), vec![0.0; 2]);
    }

    #[test]
    fn callback_writes_into_window() {
        let (mut record, handle) = mono_record(4);
        record.start_recording().unwrap();
        assert!(record.state().is_recording());
        assert_eq!(handle.started.load(Ordering::SeqCst), 1);

        handle.emit(&[1.0, 2.0], 16000, 1);
        handle.emit(&[3.0, 4.0, 5.0], 16000, 1);

        assert_eq!(record.snapshot().to_vec(), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(record.read(2).unwrap().to_vec(), vec![4.0, 5.0]);

        let diag = record.diagnostics();
        assert_eq!(diag.callback_count, 2);
        assert_eq!(diag.frames_written, 5);
        assert_eq!(diag.chunks_dropped, 0);
    }

    #[test]
    fn start_then_stop_without_callbacks_keeps_window() {
        let (mut record, handle) = mono_record(3);
        record.start_recording().unwrap();
        record.stop().unwrap();

        assert!(record.state().is_stopped());
        assert_eq!(handle.stopped.load(Ordering::SeqCst), 1);
        assert_eq!(record.snapshot().to_vec(), vec![0.0; 3]);
    }

    #[test]
    fn stop_freezes_window_but_keeps_contents() {
        let (mut record, handle) = mono_record(3);
        record.start_recording().unwrap();
        handle.emit(&[1.0, 2.0, 3.0], 16000, 1);
        record.stop().unwrap();

        // A late callback from the device after stop must not land.
        handle.emit(&[9.0], 16000, 1);
        assert_eq!(record.snapshot().to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(record.diagnostics().callback_count, 1);
    }

    #[test]
    fn restart_ignores_stale_callbacks() {
        let (mut record, handle) = mono_record(3);
        record.start_recording().unwrap();
        let stale = handle.callback.lock().clone().unwrap();
        record.stop().unwrap();

        record.start_recording().unwrap();
        assert_eq!(handle.opened.load(Ordering::SeqCst), 2);

        stale(&[7.0], 16000, 1);
        handle.emit(&[1.0], 16000, 1);
        assert_eq!(record.snapshot().to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn invalid_transitions() {
        let (mut record, _) = mono_record(2);
        assert!(matches!(record.stop(), Err(AudioError::InvalidState(_))));

        record.start_recording().unwrap();
        assert!(matches!(
            record.start_recording(),
            Err(AudioError::InvalidState(_))
        ));
        assert!(record.state().is_recording());
    }

    #[test]
    fn device_failures_leave_state_unchanged() {
        let (mut record, handle) = mono_record(2);
        record.write(&[[1.0], [2.0]]).unwrap();

        handle.fail_open.store(true, Ordering::SeqCst);
        assert!(matches!(
            record.start_recording(),
            Err(AudioError::CaptureDevice(_))
        ));
        assert!(record.state().is_idle());

        handle.fail_open.store(false, Ordering::SeqCst);
        handle.fail_start.store(true, Ordering::SeqCst);
        assert!(matches!(
            record.start_recording(),
            Err(AudioError::CaptureDevice(_))
        ));
        assert!(record.state().is_idle());

        // The stream that failed to start must not feed the window.
        handle.emit(&[5.0], 16000, 1);
        assert_eq!(record.snapshot().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn stop_failure_still_stops() {
        let (mut record, handle) = mono_record(2);
        record.start_recording().unwrap();
        handle.fail_stop.store(true, Ordering::SeqCst);

        assert!(matches!(record.stop(), Err(AudioError::CaptureDevice(_))));
        assert!(record.state().is_stopped());
        handle.emit(&[5.0], 16000, 1);
        assert_eq!(record.snapshot().to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn bad_chunks_are_dropped_and_recorded() {
        let (mut record, handle) = mono_record(4);
        let delegate = Arc::new(RecordingDelegate::default());
        record.set_delegate(delegate.clone());
        record.start_recording().unwrap();

        handle.emit(&[1.0], 16000, 1);
        handle.emit(&[2.0, 2.0], 16000, 2);
        handle.emit(&[3.0; 5], 16000, 1);
        handle.emit(&[4.0], 44100, 1);

        assert_eq!(record.snapshot().to_vec(), vec![0.0, 0.0, 0.0, 1.0]);

        let diag = record.diagnostics();
        assert_eq!(diag.callback_count, 4);
        assert_eq!(diag.chunks_dropped, 3);
        assert_eq!(
            delegate.errors.lock().clone(),
            vec![
                AudioError::ChannelMismatch { expected: 1, actual: 2 },
                AudioError::BufferOverflow { frames: 5, capacity: 4 },
                AudioError::SampleRateMismatch { expected: 16000, actual: 44100 },
            ]
        );

        let last = record.take_last_error().unwrap();
        assert_eq!(
            last.error,
            AudioError::SampleRateMismatch { expected: 16000, actual: 44100 }
        );
        assert!(record.take_last_error().is_none());
    }

    #[test]
    fn delegate_sees_state_changes() {
        let (mut record, _) = mono_record(2);
        let delegate = Arc::new(RecordingDelegate::default());
        record.set_delegate(delegate.clone());

        record.start_recording().unwrap();
        record.stop().unwrap();
        record.start_recording().unwrap();

        assert_eq!(
            delegate.states.lock().clone(),
            vec![RecordState::Recording, RecordState::Stopped, RecordState::Recording]
        );
    }

    #[test]
    fn drop_stops_stream() {
        let (mut record, handle) = mono_record(2);
        record.start_recording().unwrap();
        drop(record);
        assert_eq!(handle.stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn from_config_validates() {
        let config = RecordConfig {
            window_frames: 0,
            ..Default::default()
        };
        assert!(matches!(
            AudioRecord::from_config(MockDevice::default(), &config),
            Err(AudioError::Config(_))
        ));

        let record = AudioRecord::from_config(MockDevice::default(), &RecordConfig::default())
            .unwrap();
        assert_eq!(record.capacity(), 15600);
        assert_eq!(record.format(), AudioFormat::mono(16000));
        assert_eq!(record.device_info().name, "Mock Microphone");
    }

    struct FixedInputEngine;

    impl InferenceEngine for FixedInputEngine {
        type Output = usize;
        type Error = AudioError;

        fn input_format(&self) -> AudioFormat {
            AudioFormat::new(2, 48000)
        }

        fn input_frame_count(&self) -> usize {
            960
        }

        fn run(&mut self, frames: &AudioFrames) -> Result<usize, AudioError> {
            Ok(frames.frame_count())
        }
    }

    #[test]
    fn window_sized_for_engine() {
        let mut engine = FixedInputEngine;
        let record = AudioRecord::for_engine(MockDevice::default(), &engine).unwrap();
        assert_eq!(record.format(), AudioFormat::new(2, 48000));
        assert_eq!(record.capacity(), 960);
        assert_eq!(record.source().run(&mut engine).unwrap(), 960);
    }

    #[test]
    fn clear_zero_fills_window() {
        let (record, _) = mono_record(2);
        record.write(&[[1.0], [2.0]]).unwrap();
        record.clear();
        assert_eq!(record.snapshot().to_vec(), vec![0.0, 0.0]);
    }
}
