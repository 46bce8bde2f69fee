//! Utility modules for silencer-api

pub mod audio_decoder;
pub mod audio_encoder;
pub mod working_file;

pub use audio_decoder::{decode_audio_file, DecodeError, DecodedAudio};
pub use audio_encoder::{encode_wav, EncodeError};
pub use working_file::WorkingFile;
