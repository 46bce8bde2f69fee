//! Batch results manifest (`processing_summary.json`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use silencer_common::{OutputFormat, ProcessingParameters};

use super::processed_result::{FileError, ProcessedOutput};

/// Per-file status in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Failure,
}

/// One manifest record, in submission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Filename as uploaded
    pub filename: String,
    pub status: FileStatus,
    pub message: String,
    /// Archive entry holding the trimmed audio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl FileOutcome {
    /// Record a success stored under `archive_name`
    pub fn success(output: &ProcessedOutput, archive_name: String) -> Self {
        let removed = (output.input_duration_secs - output.output_duration_secs).max(0.0);
        Self {
            filename: output.source_filename.clone(),
            status: FileStatus::Success,
            message: format!("Removed {:.2}s of silence", removed),
            output_filename: Some(archive_name),
            output_size_bytes: Some(output.size()),
            input_duration_seconds: Some(output.input_duration_secs),
            output_duration_seconds: Some(output.output_duration_secs),
            error_code: None,
        }
    }

    pub fn failure(filename: &str, error: &FileError) -> Self {
        Self {
            filename: filename.to_string(),
            status: FileStatus::Failure,
            message: error.to_string(),
            output_filename: None,
            output_size_bytes: None,
            input_duration_seconds: None,
            output_duration_seconds: None,
            error_code: Some(error.code().to_string()),
        }
    }
}

/// Aggregate counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Manifest written into every batch archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub generated_at: DateTime<Utc>,
    pub parameters: ProcessingParameters,
    pub output_format: OutputFormat,
    pub counts: BatchCounts,
    pub files: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn new(
        parameters: ProcessingParameters,
        output_format: OutputFormat,
        files: Vec<FileOutcome>,
    ) -> Self {
        let succeeded = files
            .iter()
            .filter(|f| f.status == FileStatus::Success)
            .count();

        Self {
            generated_at: Utc::now(),
            parameters,
            output_format,
            counts: BatchCounts {
                total: files.len(),
                succeeded,
                failed: files.len() - succeeded,
            },
            files,
        }
    }

    /// Pretty-printed JSON manifest
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}
