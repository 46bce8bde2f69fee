//! Batch orchestration
//!
//! Runs every uploaded file through validation and the single-file processor
//! on a bounded pool of blocking workers, then packs the successes and a
//! `processing_summary.json` manifest into one archive.
//!
//! # Failure isolation
//! A file that is rejected, fails to decode, errors or exceeds its deadline
//! becomes a failure record; its siblings are unaffected. Only archive
//! construction itself can fail the batch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use silencer_common::config::{BatchConfig, LimitsConfig};
use silencer_common::{OutputFormat, ProcessingParameters};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::{
    ArchiveBuilder, ArchiveError, BatchSummary, FileError, FileOutcome, OutputArchive,
    ProcessedResult, UploadedFile,
};
use crate::services::file_validator::validate;
use crate::services::single_file_processor::SingleFileProcessor;

/// Archive plus the manifest written into it
#[derive(Debug)]
pub struct BatchOutcome {
    pub archive: OutputArchive,
    pub summary: BatchSummary,
}

/// Validates and processes files with per-file isolation and deadlines
#[derive(Clone)]
pub struct BatchOrchestrator {
    processor: SingleFileProcessor,
    limits: LimitsConfig,
    max_workers: usize,
    file_timeout: Duration,
}

impl BatchOrchestrator {
    pub fn new(processor: SingleFileProcessor, limits: LimitsConfig, batch: &BatchConfig) -> Self {
        Self {
            processor,
            limits,
            max_workers: batch.max_workers.max(1),
            file_timeout: Duration::from_secs(batch.file_timeout_secs),
        }
    }

    /// Override the per-file deadline
    pub fn with_file_timeout(mut self, file_timeout: Duration) -> Self {
        self.file_timeout = file_timeout;
        self
    }

    /// Validate then process one file under the per-file deadline
    ///
    /// Decoding and trimming run on the blocking pool. If the deadline
    /// expires, or this future is dropped because the client went away, the
    /// file's cancellation token fires and the worker stops at its next check.
    pub async fn process_file(
        &self,
        file: Arc<UploadedFile>,
        params: ProcessingParameters,
        output_format: OutputFormat,
    ) -> ProcessedResult {
        if let Err(reason) = validate(&file, &self.limits) {
            warn!(filename = %file.filename, error = %reason, "File rejected");
            return ProcessedResult::failure(file.filename.clone(), reason);
        }

        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();

        let processor = self.processor.clone();
        let worker_file = Arc::clone(&file);
        let worker_cancel = cancel.clone();
        let handle = tokio::task::spawn_blocking(move || {
            processor.process(&worker_file, &params, output_format, &worker_cancel)
        });

        let result = match tokio::time::timeout(self.file_timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                warn!(filename = %file.filename, error = %join_error, "Processing task failed");
                ProcessedResult::failure(
                    file.filename.clone(),
                    FileError::Processing(format!("worker task failed: {}", join_error)),
                )
            }
            Err(_) => {
                cancel.cancel();
                warn!(
                    filename = %file.filename,
                    timeout_ms = self.file_timeout.as_millis() as u64,
                    "File processing timed out"
                );
                ProcessedResult::failure(
                    file.filename.clone(),
                    FileError::TimedOut(self.file_timeout),
                )
            }
        };

        // Worker has finished or already been told to stop
        guard.disarm();
        result
    }

    /// Process a batch and build its archive
    ///
    /// At most `min(max_workers, files.len())` files are in flight. Results
    /// are re-ordered to submission order before the manifest is written.
    /// Batch output is always the default WAV format.
    pub async fn process_batch(
        &self,
        files: Vec<UploadedFile>,
        params: ProcessingParameters,
    ) -> Result<BatchOutcome, ArchiveError> {
        let started = Instant::now();
        let total = files.len();
        let workers = self.max_workers.min(total).max(1);
        let output_format = OutputFormat::default();

        info!(total, workers, "Batch processing started");

        let mut results: Vec<(usize, ProcessedResult)> = stream::iter(files.into_iter().enumerate())
            .map(|(index, file)| async move {
                let result = self
                    .process_file(Arc::new(file), params, output_format)
                    .await;
                (index, result)
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);

        let mut builder = ArchiveBuilder::new();
        let mut outcomes = Vec::with_capacity(total);
        for (_, result) in results {
            match result {
                ProcessedResult::Success(output) => {
                    let entry_name = builder.add_file(&output.filename, &output.data)?;
                    outcomes.push(FileOutcome::success(&output, entry_name));
                }
                ProcessedResult::Failure { filename, error } => {
                    outcomes.push(FileOutcome::failure(&filename, &error));
                }
            }
        }

        let summary = BatchSummary::new(params, output_format, outcomes);
        let archive = builder.finish(&summary)?;

        info!(
            total = summary.counts.total,
            succeeded = summary.counts.succeeded,
            failed = summary.counts.failed,
            archive_bytes = archive.size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch processing completed"
        );

        Ok(BatchOutcome { archive, summary })
    }
}
