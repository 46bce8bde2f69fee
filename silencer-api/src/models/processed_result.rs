//! Per-file processing outcome and its error taxonomy

use std::time::Duration;

use silencer_common::AudioFormat;
use thiserror::Error;

/// Why the validator refused a file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("Unsupported file format: {filename} (allowed: {})", AudioFormat::allowed_list())]
    UnsupportedFormat { filename: String },

    #[error("File too large: {filename} is {size} bytes, limit is {limit} bytes")]
    FileTooLarge {
        filename: String,
        size: usize,
        limit: usize,
    },
}

/// Failure of one file; never aborts sibling files in a batch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FileError {
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    /// Payload unreadable despite an accepted extension
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Unexpected failure while trimming or encoding
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Per-file deadline expired
    #[error("Processing timed out after {0:?}")]
    TimedOut(Duration),

    /// Work was abandoned because its caller went away
    #[error("Processing cancelled")]
    Cancelled,
}

impl FileError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            FileError::Rejected(RejectionReason::UnsupportedFormat { .. }) => "UNSUPPORTED_FORMAT",
            FileError::Rejected(RejectionReason::FileTooLarge { .. }) => "FILE_TOO_LARGE",
            FileError::Decode(_) => "DECODE_ERROR",
            FileError::Processing(_) => "PROCESSING_ERROR",
            FileError::TimedOut(_) => "TIMEOUT",
            FileError::Cancelled => "CANCELLED",
        }
    }
}

/// Trimmed audio ready to be returned or archived
#[derive(Debug, Clone)]
pub struct ProcessedOutput {
    /// Filename as uploaded
    pub source_filename: String,
    /// Derived output name: source stem + output extension
    pub filename: String,
    /// Encoded audio
    pub data: Vec<u8>,
    pub content_type: &'static str,
    pub input_duration_secs: f64,
    pub output_duration_secs: f64,
}

impl ProcessedOutput {
    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Outcome for one uploaded file
#[derive(Debug, Clone)]
pub enum ProcessedResult {
    Success(ProcessedOutput),
    Failure { filename: String, error: FileError },
}

impl ProcessedResult {
    pub fn failure(filename: impl Into<String>, error: impl Into<FileError>) -> Self {
        ProcessedResult::Failure {
            filename: filename.into(),
            error: error.into(),
        }
    }
}
