use crate::models::audio_models::AudioFormat;
use crate::models::error::AudioError;
use crate::processing::frames::AudioFrames;

/// Fixed-capacity rolling window of audio frames.
///
/// The window always holds exactly `capacity` frames: it starts zero-filled
/// and every write evicts the oldest frames to make room (tail-overwrite).
/// Logical index 0 is the oldest frame, `capacity - 1` the newest.
///
/// Storage is circular. `write_index` points at the oldest frame, which is
/// also the slot the next write starts at, so a write costs O(N) instead of
/// shifting the whole window.
///
/// Not synchronized; share it through [`crate::session::window::SharedWindow`].
#[derive(Debug, Clone)]
pub struct RingBuffer {
    format: AudioFormat,
    buffer: Vec<f32>,
    write_index: usize,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(format: AudioFormat, capacity: usize) -> Result<Self, AudioError> {
        format.validate()?;
        if capacity == 0 {
            return Err(AudioError::Config("capacity must be positive".into()));
        }
        let len = capacity
            .checked_mul(format.frame_width())
            .ok_or_else(|| AudioError::Config(format!("capacity {} is too large", capacity)))?;

        Ok(Self {
            format,
            buffer: vec![0.0; len],
            write_index: 0,
            capacity,
        })
    }

    /// Append frames, evicting the same number of oldest frames.
    ///
    /// Every frame must be `format.channels` wide and at most `capacity`
    /// frames may be written at once. On error the window is untouched.
    pub fn write<F: AsRef<[f32]>>(&mut self, frames: &[F]) -> Result<(), AudioError> {
        let width = self.format.frame_width();
        if let Some(bad) = frames.iter().find(|f| f.as_ref().len() != width) {
            return Err(AudioError::ChannelMismatch {
                expected: width,
                actual: bad.as_ref().len(),
            });
        }
        self.check_fits(frames.len())?;

        for frame in frames {
            let start = self.write_index * width;
            self.buffer[start..start + width].copy_from_slice(frame.as_ref());
            self.write_index = (self.write_index + 1) % self.capacity;
        }
        Ok(())
    }

    /// Append interleaved samples as delivered by a capture device.
    ///
    /// `channels` must match the window format and `samples` must hold a
    /// whole number of frames.
    pub fn write_interleaved(&mut self, samples: &[f32], channels: u16) -> Result<(), AudioError> {
        let width = self.format.frame_width();
        if channels as usize != width {
            return Err(AudioError::ChannelMismatch {
                expected: width,
                actual: channels as usize,
            });
        }
        let partial = samples.len() % width;
        if partial != 0 {
            return Err(AudioError::ChannelMismatch {
                expected: width,
                actual: partial,
            });
        }

        let frame_count = samples.len() / width;
        self.check_fits(frame_count)?;
        if frame_count == 0 {
            return Ok(());
        }

        // Up to two contiguous segments: to the end of storage, then wrapped.
        let first_frames = frame_count.min(self.capacity - self.write_index);
        let (head, tail) = samples.split_at(first_frames * width);
        let start = self.write_index * width;
        self.buffer[start..start + head.len()].copy_from_slice(head);
        self.buffer[..tail.len()].copy_from_slice(tail);

        self.write_index = (self.write_index + frame_count) % self.capacity;
        Ok(())
    }

    /// The last `count` frames, oldest first.
    pub fn read(&self, count: usize) -> Result<AudioFrames, AudioError> {
        if count > self.capacity {
            return Err(AudioError::RequestTooLarge {
                requested: count,
                available: self.capacity,
            });
        }
        Ok(self.copy_range(self.capacity - count, count))
    }

    /// `count` frames starting at logical index `offset` (0 = oldest).
    pub fn read_at(&self, offset: usize, count: usize) -> Result<AudioFrames, AudioError> {
        match offset.checked_add(count) {
            Some(end) if end <= self.capacity => Ok(self.copy_range(offset, count)),
            end => Err(AudioError::RequestTooLarge {
                requested: end.unwrap_or(usize::MAX),
                available: self.capacity,
            }),
        }
    }

    /// Copy of the whole window.
    pub fn snapshot(&self) -> AudioFrames {
        self.copy_range(0, self.capacity)
    }

    /// Zero-fill the window. Capacity and format are unchanged.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_index = 0;
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// The total capacity of the window in frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn check_fits(&self, frame_count: usize) -> Result<(), AudioError> {
        if frame_count > self.capacity {
            return Err(AudioError::BufferOverflow {
                frames: frame_count,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn copy_range(&self, offset: usize, count: usize) -> AudioFrames {
        let width = self.format.frame_width();
        let mut samples = Vec::with_capacity(count * width);

        let start = (self.write_index + offset) % self.capacity;
        let first_frames = count.min(self.capacity - start);
        samples.extend_from_slice(&self.buffer[start * width..(start + first_frames) * width]);
        samples.extend_from_slice(&self.buffer[..(count - first_frames) * width]);

        AudioFrames::new(self.format, samples)
    }
}
