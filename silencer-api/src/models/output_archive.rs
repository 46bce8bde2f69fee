//! In-memory zip archive returned for batch requests

use std::collections::HashSet;
use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::batch_summary::BatchSummary;
use super::uploaded_file::file_stem;

/// Archive entry holding the manifest
pub const SUMMARY_ENTRY_NAME: &str = "processing_summary.json";

/// Content type of the archive
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Archive construction errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Summary serialization failed: {0}")]
    Summary(#[from] serde_json::Error),
}

/// Finished archive
#[derive(Debug, Clone)]
pub struct OutputArchive {
    pub data: Vec<u8>,
    /// Entry names in write order; the summary is always last
    pub entries: Vec<String>,
}

impl OutputArchive {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Incrementally builds an [`OutputArchive`]
///
/// Entry names are unique: a second `a.wav` is stored as `a_2.wav`. The
/// summary name is reserved from the start.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    used_names: HashSet<String>,
    entries: Vec<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        let mut used_names = HashSet::new();
        used_names.insert(SUMMARY_ENTRY_NAME.to_ascii_lowercase());

        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            used_names,
            entries: Vec::new(),
        }
    }

    /// Add one audio file; returns the entry name actually used
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<String, ArchiveError> {
        let entry_name = self.unique_name(name);

        // WAV barely compresses, store as-is
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer.start_file(entry_name.as_str(), options)?;
        self.writer.write_all(data)?;

        self.entries.push(entry_name.clone());
        Ok(entry_name)
    }

    /// Write the manifest and close the archive
    pub fn finish(mut self, summary: &BatchSummary) -> Result<OutputArchive, ArchiveError> {
        let json = summary.to_json()?;

        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(SUMMARY_ENTRY_NAME, options)?;
        self.writer.write_all(&json)?;
        self.entries.push(SUMMARY_ENTRY_NAME.to_string());

        let cursor = self.writer.finish()?;
        Ok(OutputArchive {
            data: cursor.into_inner(),
            entries: self.entries,
        })
    }

    fn unique_name(&mut self, name: &str) -> String {
        // Case-insensitive so extraction on Windows/macOS cannot collide
        if self.used_names.insert(name.to_ascii_lowercase()) {
            return name.to_string();
        }

        let stem = file_stem(name);
        let extension = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut counter = 2;
        loop {
            let candidate = format!("{}_{}{}", stem, counter, extension);
            if self.used_names.insert(candidate.to_ascii_lowercase()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
