pub mod audio_source;
pub mod static_source;
