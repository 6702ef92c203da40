use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::AudioFormat;
use crate::models::error::AudioError;
use crate::processing::frames::AudioFrames;
use crate::processing::ring_buffer::RingBuffer;

/// A [`RingBuffer`] behind a single mutex, shared between the capture
/// callback and consumers.
///
/// Every operation takes the lock for one O(capacity) step at most.
/// Format and capacity are fixed at construction and are cached outside
/// the lock.
#[derive(Debug, Clone)]
pub struct SharedWindow {
    ring: Arc<Mutex<RingBuffer>>,
    format: AudioFormat,
    capacity: usize,
}

impl SharedWindow {
    pub fn new(format: AudioFormat, capacity: usize) -> Result<Self, AudioError> {
        let ring = RingBuffer::new(format, capacity)?;
        Ok(Self {
            ring: Arc::new(Mutex::new(ring)),
            format,
            capacity,
        })
    }

    pub fn write<F: AsRef<[f32]>>(&self, frames: &[F]) -> Result<(), AudioError> {
        self.ring.lock().write(frames)
    }

    pub fn write_interleaved(&self, samples: &[f32], channels: u16) -> Result<(), AudioError> {
        self.ring.lock().write_interleaved(samples, channels)
    }

    pub fn read(&self, count: usize) -> Result<AudioFrames, AudioError> {
        self.ring.lock().read(count)
    }

    pub fn read_at(&self, offset: usize, count: usize) -> Result<AudioFrames, AudioError> {
        self.ring.lock().read_at(offset, count)
    }

    pub fn snapshot(&self) -> AudioFrames {
        self.ring.lock().snapshot()
    }

    pub fn clear(&self) {
        self.ring.lock().clear();
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read-only handle on the same window.
    pub fn reader(&self) -> WindowReader {
        WindowReader {
            window: self.clone(),
        }
    }
}

/// Read-only, clonable view of a shared window for consumer threads.
#[derive(Debug, Clone)]
pub struct WindowReader {
    window: SharedWindow,
}

impl WindowReader {
    pub fn read(&self, count: usize) -> Result<AudioFrames, AudioError> {
        self.window.read(count)
    }

    pub fn read_at(&self, offset: usize, count: usize) -> Result<AudioFrames, AudioError> {
        self.window.read_at(offset, count)
    }

    pub fn snapshot(&self) -> AudioFrames {
        self.window.snapshot()
    }

    pub fn format(&self) -> AudioFormat {
        self.window.format()
    }

    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }
}
