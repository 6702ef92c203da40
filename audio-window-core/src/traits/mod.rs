pub mod capture_device;
pub mod inference;
pub mod record_delegate;
pub mod wave_decoder;
