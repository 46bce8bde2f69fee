//! Single-file processing: decode, trim silence, encode
//!
//! Blocking. Callers on the async runtime run it through `spawn_blocking`.
//! Every failure is returned as a [`ProcessedResult::Failure`], never raised.
//! Panics inside the decoder or the remover are caught and reported as
//! decode and processing errors respectively.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use silencer_common::{OutputFormat, ProcessingParameters};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::{FileError, ProcessedOutput, ProcessedResult, UploadedFile};
use crate::services::silence_detector::{RmsSilenceRemover, SilenceError, SilenceRemover};
use crate::utils::{decode_audio_file, encode_wav, DecodeError, WorkingFile};

/// Turns one upload into trimmed audio
#[derive(Clone)]
pub struct SingleFileProcessor {
    /// Directory for transient working files
    work_dir: PathBuf,
    remover: Arc<dyn SilenceRemover>,
}

impl SingleFileProcessor {
    /// Processor using the RMS threshold remover
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self::with_remover(work_dir, Arc::new(RmsSilenceRemover))
    }

    pub fn with_remover(work_dir: impl Into<PathBuf>, remover: Arc<dyn SilenceRemover>) -> Self {
        Self {
            work_dir: work_dir.into(),
            remover,
        }
    }

    /// Process one file
    ///
    /// The output is named after the source stem with the output extension.
    /// Audio without removable silence comes back unchanged apart from
    /// re-encoding.
    pub fn process(
        &self,
        file: &UploadedFile,
        params: &ProcessingParameters,
        output_format: OutputFormat,
        cancel: &CancellationToken,
    ) -> ProcessedResult {
        let started = Instant::now();

        match self.run(file, params, output_format, cancel) {
            Ok(output) => {
                info!(
                    filename = %file.filename,
                    input_bytes = file.size(),
                    output_bytes = output.size(),
                    input_duration = format!("{:.2}s", output.input_duration_secs),
                    output_duration = format!("{:.2}s", output.output_duration_secs),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "File processed"
                );
                ProcessedResult::Success(output)
            }
            Err(error) => {
                warn!(
                    filename = %file.filename,
                    code = error.code(),
                    error = %error,
                    "File processing failed"
                );
                ProcessedResult::failure(file.filename.clone(), error)
            }
        }
    }

    fn run(
        &self,
        file: &UploadedFile,
        params: &ProcessingParameters,
        output_format: OutputFormat,
        cancel: &CancellationToken,
    ) -> Result<ProcessedOutput, FileError> {
        let hint = file.probe_hint().map(|f| f.extension());

        let audio = {
            let working = WorkingFile::create(&self.work_dir, hint, &file.data).map_err(|e| {
                FileError::Processing(format!("could not stage working file: {}", e))
            })?;
            debug!(filename = %file.filename, path = %working.path().display(), "Staged working file");

            catch_unwind(AssertUnwindSafe(|| decode_audio_file(working.path(), hint, cancel)))
                .map_err(|payload| {
                    FileError::Decode(format!("decoder panicked: {}", panic_message(&*payload)))
                })?
                .map_err(|e| match e {
                    DecodeError::Cancelled => FileError::Cancelled,
                    other => FileError::Decode(other.to_string()),
                })?
            // Working file removed here
        };

        let trimmed = catch_unwind(AssertUnwindSafe(|| {
            self.remover.remove_silence(&audio, params, cancel)
        }))
        .map_err(|payload| {
            FileError::Processing(format!("silence removal panicked: {}", panic_message(&*payload)))
        })?
        .map_err(|e| match e {
            SilenceError::Cancelled => FileError::Cancelled,
            other => FileError::Processing(other.to_string()),
        })?;

        if cancel.is_cancelled() {
            return Err(FileError::Cancelled);
        }

        let data = encode_wav(&trimmed, output_format)
            .map_err(|e| FileError::Processing(e.to_string()))?;

        Ok(ProcessedOutput {
            source_filename: file.filename.clone(),
            filename: format!("{}.{}", file.stem(), output_format.extension()),
            data,
            content_type: output_format.content_type(),
            input_duration_secs: audio.duration_seconds(),
            output_duration_secs: trimmed.duration_seconds(),
        })
    }
}

/// Text of a caught panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
