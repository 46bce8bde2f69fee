//! Uploaded audio file as received from a request

use axum::body::Bytes;
use silencer_common::AudioFormat;
use std::path::Path;

/// Name used when a client sends a file part without a usable filename
const UNNAMED_FILE: &str = "unnamed";

/// One file part of an upload request
///
/// Request-scoped: the bytes live only until the file has been processed.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Multipart field name chosen by the caller
    pub field_name: String,
    /// Original filename, reduced to its final path component
    pub filename: String,
    /// Raw upload content
    pub data: Bytes,
    /// Format named by the filename extension
    pub declared_format: Option<AudioFormat>,
    /// Format recognised from the leading bytes
    pub sniffed_format: Option<AudioFormat>,
}

impl UploadedFile {
    pub fn new(
        field_name: impl Into<String>,
        filename: &str,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        let filename = sanitize_filename(filename);
        let declared_format = AudioFormat::from_filename(&filename);
        let sniffed_format = infer::get(&data).and_then(|t| AudioFormat::from_extension(t.extension()));

        Self {
            field_name: field_name.into(),
            filename,
            data,
            declared_format,
            sniffed_format,
        }
    }

    /// Upload size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Filename without its extension
    pub fn stem(&self) -> &str {
        file_stem(&self.filename)
    }

    /// Format to hint the decoder with
    ///
    /// Content beats extension: a WAV uploaded as `.mp3` is probed as WAV.
    pub fn probe_hint(&self) -> Option<AudioFormat> {
        self.sniffed_format.or(self.declared_format)
    }
}

/// Filename without its extension
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(filename)
}

/// Strip client-side directories so names are safe as archive entries
fn sanitize_filename(raw: &str) -> String {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        UNNAMED_FILE.to_string()
    } else {
        name.to_string()
    }
}
