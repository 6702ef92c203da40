pub mod frames;
pub mod ring_buffer;
