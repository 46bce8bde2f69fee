//! Data models for silencer-api
//!
//! All values are request-scoped; nothing outlives the response.

pub mod batch_summary;
pub mod output_archive;
pub mod processed_result;
pub mod uploaded_file;

pub use batch_summary::{BatchCounts, BatchSummary, FileOutcome, FileStatus};
pub use output_archive::{
    ArchiveBuilder, ArchiveError, OutputArchive, ARCHIVE_CONTENT_TYPE, SUMMARY_ENTRY_NAME,
};
pub use processed_result::{FileError, ProcessedOutput, ProcessedResult, RejectionReason};
pub use uploaded_file::UploadedFile;
