//! Audio Decoding Utilities
//!
//! **Purpose:** Decode an uploaded audio file to interleaved f32 PCM, keeping
//! the native channel layout and sample rate so trimmed output sounds like
//! the input.
//!
//! Uses symphonia for format-agnostic decoding (MP3, WAV, FLAC, AAC, M4A, OGG)

use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to open audio file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Container not recognised
    #[error("Unrecognized audio container: {0}")]
    UnsupportedFormat(String),

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("Error reading audio stream: {0}")]
    Stream(String),

    #[error("No decodable audio frames")]
    NoAudioFrames,

    #[error("Decoding cancelled")]
    Cancelled,
}

/// Decoded audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples (f32, range [-1.0, 1.0])
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
}

impl DecodedAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Same layout, no samples
    pub fn empty_like(&self) -> Self {
        Self::new(Vec::new(), self.sample_rate, self.channels)
    }

    /// Number of frames (one sample per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Length in whole milliseconds, rounded up
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frames() as u64 * 1000).div_ceil(self.sample_rate as u64)
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Frame index at a millisecond offset, clamped to the end
    pub fn frame_at(&self, ms: u64) -> usize {
        let frame = ms * self.sample_rate as u64 / 1000;
        (frame as usize).min(self.frames())
    }
}

/// Decode audio file to interleaved f32 PCM samples
///
/// **Algorithm:**
/// 1. Open file and probe format using symphonia (extension hint first)
/// 2. Find the first audio track
/// 3. Decode every packet of that track, copying interleaved f32 samples
/// 4. Skip individually corrupt packets; fail if nothing decodes
///
/// The cancellation token is checked between packets.
pub fn decode_audio_file(
    file_path: &Path,
    hint_extension: Option<&str>,
    cancel: &CancellationToken,
) -> Result<DecodedAudio, DecodeError> {
    tracing::debug!(path = %file_path.display(), "Decoding audio file");

    let file = std::fs::File::open(file_path).map_err(|source| DecodeError::Open {
        path: file_path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = hint_extension {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedCodec(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut skipped_packets = 0usize;

    loop {
        if cancel.is_cancelled() {
            return Err(DecodeError::Cancelled);
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // End of stream
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Stream(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = Some(spec.rate);
                channels = Some(spec.channels.count() as u16);

                // Grow the conversion buffer if a packet is larger than any before it
                let required = decoded.capacity() * spec.channels.count();
                if sample_buf.as_ref().map_or(true, |b| b.capacity() < required) {
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                // Corrupt packet, keep going
                skipped_packets += 1;
                tracing::debug!(path = %file_path.display(), error = msg, "Skipping undecodable packet");
            }
            Err(e) => return Err(DecodeError::Stream(e.to_string())),
        }
    }

    let (sample_rate, channels) = match (sample_rate, channels) {
        (Some(rate), Some(ch)) if rate > 0 && ch > 0 => (rate, ch),
        _ => return Err(DecodeError::NoAudioFrames),
    };

    if samples.is_empty() && skipped_packets > 0 {
        return Err(DecodeError::NoAudioFrames);
    }

    let audio = DecodedAudio::new(samples, sample_rate, channels);

    tracing::debug!(
        path = %file_path.display(),
        sample_rate,
        channels,
        frames = audio.frames(),
        skipped_packets,
        duration_seconds = format!("{:.2}", audio.duration_seconds()),
        "Audio decoding complete"
    );

    Ok(audio)
}
