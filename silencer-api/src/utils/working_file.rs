//! Transient on-disk copy of an upload
//!
//! The decoder reads from a file so container probing can seek freely. The
//! file is removed when the [`WorkingFile`] is dropped, on success and on
//! every error path.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Uniquely named temporary file holding one upload
#[derive(Debug)]
pub struct WorkingFile {
    inner: NamedTempFile,
}

impl WorkingFile {
    /// Write `data` to a fresh file in `dir`
    ///
    /// The extension is kept so tools inspecting the directory can tell
    /// what the file is; the name itself never derives from client input.
    pub fn create(dir: &Path, extension: Option<&str>, data: &[u8]) -> std::io::Result<Self> {
        let suffix = extension.map(|e| format!(".{}", e)).unwrap_or_default();

        let mut inner = tempfile::Builder::new()
            .prefix("silencer-")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        inner.write_all(data)?;
        inner.flush()?;

        Ok(Self { inner })
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }
}
