//! Accepted upload formats and produced output formats

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Audio container/codec accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    M4a,
    Aac,
    Ogg,
}

impl AudioFormat {
    /// Every accepted format, in the order reported to clients
    pub const ALL: [AudioFormat; 6] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Flac,
        AudioFormat::M4a,
        AudioFormat::Aac,
        AudioFormat::Ogg,
    ];

    /// Match a file extension (without the dot), case-insensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "m4a" => Some(AudioFormat::M4a),
            "aac" => Some(AudioFormat::Aac),
            "ogg" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }

    /// Format declared by a filename's extension
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension, used as the decoder probe hint
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::M4a => "m4a",
            AudioFormat::Aac => "aac",
            AudioFormat::Ogg => "ogg",
        }
    }

    /// Comma-separated allow-list for error messages
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encoding of the trimmed output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// 16-bit integer PCM WAV
    #[default]
    Wav,
    /// 32-bit float WAV
    WavF32,
}

impl OutputFormat {
    /// Parse a client-requested format
    ///
    /// Unknown or empty values fall back to the default instead of failing.
    pub fn parse_or_default(requested: Option<&str>) -> Self {
        match requested.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "wav" || s == "wav16" => OutputFormat::Wav,
            Some(s) if s == "wav_f32" || s == "wav32" || s == "wav-f32" => OutputFormat::WavF32,
            Some(other) if !other.is_empty() => {
                tracing::warn!(
                    requested = %other,
                    fallback = %OutputFormat::default().name(),
                    "Unrecognized output format, using default"
                );
                OutputFormat::default()
            }
            _ => OutputFormat::default(),
        }
    }

    /// File extension of produced files
    pub fn extension(&self) -> &'static str {
        "wav"
    }

    /// HTTP content type of produced files
    pub fn content_type(&self) -> &'static str {
        "audio/wav"
    }

    /// Name accepted by [`OutputFormat::parse_or_default`]
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::WavF32 => "wav_f32",
        }
    }
}
