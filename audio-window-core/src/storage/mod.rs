pub mod wav_decoder;
