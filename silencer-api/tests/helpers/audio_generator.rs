//! Audio Test Fixture Generator
//!
//! In-memory WAV and FLAC files with a tone and optional silence

use std::io::Cursor;

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub silence_gap_start: Option<f64>,
    pub silence_gap_duration: Option<f64>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 2.0,
            sample_rate: 44100,
            channels: 2,
            silence_gap_start: None,
            silence_gap_duration: None,
        }
    }
}

impl AudioConfig {
    /// Tone for `tone_seconds`, then silence to the end
    pub fn trailing_silence(tone_seconds: f64, silence_seconds: f64) -> Self {
        Self {
            duration_seconds: tone_seconds + silence_seconds,
            silence_gap_start: Some(tone_seconds),
            silence_gap_duration: Some(silence_seconds),
            ..Default::default()
        }
    }

    /// Tone throughout
    pub fn tone(duration_seconds: f64) -> Self {
        Self {
            duration_seconds,
            ..Default::default()
        }
    }
}

/// Interleaved 16-bit samples for `config`
fn generate_samples(config: &AudioConfig) -> Vec<i16> {
    let total_samples = (config.duration_seconds * config.sample_rate as f64).round() as usize;

    // Calculate silence region in samples
    let (silence_start, silence_end) = match (config.silence_gap_start, config.silence_gap_duration) {
        (Some(start), Some(duration)) => {
            let start_sample = (start * config.sample_rate as f64).round() as usize;
            let end_sample = start_sample + (duration * config.sample_rate as f64).round() as usize;
            (start_sample, end_sample)
        }
        _ => (total_samples + 1, total_samples + 2), // No silence
    };

    let mut samples = Vec::with_capacity(total_samples * config.channels as usize);
    for i in 0..total_samples {
        let sample = if i >= silence_start && i < silence_end {
            0
        } else {
            // Simple 440Hz tone at 30% amplitude
            let t = i as f32 / config.sample_rate as f32;
            (0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * i16::MAX as f32) as i16
        };

        for _ in 0..config.channels {
            samples.push(sample);
        }
    }
    samples
}

/// Generate a 16-bit WAV file in memory
pub fn generate_test_wav(config: &AudioConfig) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for sample in generate_samples(config) {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

/// Frames per FLAC block
const FLAC_BLOCK_SIZE: usize = 4096;

/// Generate a 16-bit FLAC file in memory
///
/// Fixed-size blocks with verbatim subframes: no compression, but a real
/// FLAC stream (STREAMINFO, framed blocks, CRC-8 headers, CRC-16 footers)
/// that goes through the FLAC demuxer and decoder.
pub fn generate_test_flac(config: &AudioConfig) -> Vec<u8> {
    let channels = config.channels as usize;
    assert!((1..=8).contains(&channels), "FLAC supports 1 to 8 channels");

    let samples = generate_samples(config);
    let total_frames = (samples.len() / channels) as u64;

    let mut out = Vec::with_capacity(samples.len() * 2 + 1024);
    out.extend_from_slice(b"fLaC");

    // Last metadata block, type 0 (STREAMINFO), 34 bytes
    out.extend_from_slice(&[0x80, 0x00, 0x00, 34]);
    out.extend_from_slice(&(FLAC_BLOCK_SIZE as u16).to_be_bytes()); // min block size
    out.extend_from_slice(&(FLAC_BLOCK_SIZE as u16).to_be_bytes()); // max block size
    out.extend_from_slice(&[0; 6]); // min/max frame size unknown
    let packed = (u64::from(config.sample_rate) << 44)
        | ((channels as u64 - 1) << 41)
        | (15u64 << 36) // bits per sample - 1
        | total_frames;
    out.extend_from_slice(&packed.to_be_bytes());
    out.extend_from_slice(&[0; 16]); // no MD5

    let (rate_code, rate_tail) = flac_rate_code(config.sample_rate);

    for (index, block) in samples.chunks(FLAC_BLOCK_SIZE * channels).enumerate() {
        let block_frames = block.len() / channels;
        let frame_start = out.len();

        // Sync code, fixed block size
        out.extend_from_slice(&[0xFF, 0xF8]);
        // Block size as 16-bit (n - 1) after the frame number
        out.push(0x70 | rate_code);
        // Independent channels, 16 bits per sample
        out.push(((channels as u8 - 1) << 4) | 0x08);
        out.extend(utf8_coded(index as u64));
        out.extend_from_slice(&(block_frames as u16 - 1).to_be_bytes());
        out.extend_from_slice(&rate_tail);
        let header_crc = crc8(&out[frame_start..]);
        out.push(header_crc);

        for channel in 0..channels {
            out.push(0x02); // verbatim subframe, no wasted bits
            for frame in 0..block_frames {
                out.extend_from_slice(&block[frame * channels + channel].to_be_bytes());
            }
        }

        let frame_crc = crc16(&out[frame_start..]);
        out.extend_from_slice(&frame_crc.to_be_bytes());
    }

    out
}

/// Frame header sample rate code, plus any trailing rate bytes
fn flac_rate_code(sample_rate: u32) -> (u8, Vec<u8>) {
    match sample_rate {
        8000 => (0b0100, Vec::new()),
        16000 => (0b0101, Vec::new()),
        22050 => (0b0110, Vec::new()),
        24000 => (0b0111, Vec::new()),
        32000 => (0b1000, Vec::new()),
        44100 => (0b1001, Vec::new()),
        48000 => (0b1010, Vec::new()),
        96000 => (0b1011, Vec::new()),
        rate if rate <= u16::MAX as u32 => (0b1101, (rate as u16).to_be_bytes().to_vec()),
        // Taken from STREAMINFO
        _ => (0b0000, Vec::new()),
    }
}

/// FLAC's UTF-8 style variable-length frame number
fn utf8_coded(value: u64) -> Vec<u8> {
    if value < 0x80 {
        return vec![value as u8];
    }

    let len: u32 = match value {
        v if v < 0x800 => 2,
        v if v < 0x1_0000 => 3,
        v if v < 0x20_0000 => 4,
        v if v < 0x400_0000 => 5,
        v if v < 0x8000_0000 => 6,
        _ => 7,
    };

    let mut bytes = Vec::with_capacity(len as usize);
    let lead_mask = (0xFF00u16 >> len) as u8;
    bytes.push(lead_mask | (value >> (6 * (len - 1))) as u8);
    for shift in (0..len - 1).rev() {
        bytes.push(0x80 | ((value >> (6 * shift)) & 0x3F) as u8);
    }
    bytes
}

/// CRC-8, polynomial 0x07, initial value 0
fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x07 } else { crc << 1 };
        }
    }
    crc
}

/// CRC-16, polynomial 0x8005, initial value 0
fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x8005 } else { crc << 1 };
        }
    }
    crc
}

/// Duration of an encoded WAV file in seconds
pub fn wav_duration_seconds(bytes: &[u8]) -> f64 {
    let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    reader.duration() as f64 / reader.spec().sample_rate as f64
}
