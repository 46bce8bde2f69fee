//! WAV encoding of processed audio
//!
//! Output keeps the source channel layout and sample rate.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};
use silencer_common::OutputFormat;
use thiserror::Error;

use super::audio_decoder::DecodedAudio;

/// Encoding errors
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("Cannot encode audio with {channels} channels at {sample_rate} Hz")]
    InvalidLayout { channels: u16, sample_rate: u32 },
}

/// Encode decoded audio as an in-memory WAV file
///
/// `OutputFormat::Wav` writes 16-bit PCM, `OutputFormat::WavF32` writes
/// 32-bit float. Empty audio produces a valid header-only file.
pub fn encode_wav(audio: &DecodedAudio, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    if audio.channels == 0 || audio.sample_rate == 0 {
        return Err(EncodeError::InvalidLayout {
            channels: audio.channels,
            sample_rate: audio.sample_rate,
        });
    }

    let spec = match format {
        OutputFormat::Wav => WavSpec {
            channels: audio.channels,
            sample_rate: audio.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
        OutputFormat::WavF32 => WavSpec {
            channels: audio.channels,
            sample_rate: audio.sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    };

    // Header (44 bytes) plus samples
    let capacity = 44 + audio.samples.len() * (spec.bits_per_sample as usize / 8);
    let mut cursor = Cursor::new(Vec::with_capacity(capacity));

    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        match format {
            OutputFormat::Wav => {
                let mut i16_writer = writer.get_i16_writer(audio.samples.len() as u32);
                for &sample in &audio.samples {
                    i16_writer.write_sample(to_i16(sample));
                }
                i16_writer.flush()?;
            }
            OutputFormat::WavF32 => {
                for &sample in &audio.samples {
                    writer.write_sample(sample)?;
                }
            }
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Scale by 32768 so 16-bit sources round-trip exactly
fn to_i16(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
