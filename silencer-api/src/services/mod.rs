//! Service modules for silence removal
//!
//! Leaves first: detector, validator, single-file processor, batch
//! orchestrator.

pub mod batch_orchestrator;
pub mod file_validator;
pub mod silence_detector;
pub mod single_file_processor;

pub use batch_orchestrator::{BatchOrchestrator, BatchOutcome};
pub use file_validator::validate;
pub use silence_detector::{RmsSilenceRemover, SilenceDetector, SilenceError, SilenceRegion, SilenceRemover};
pub use single_file_processor::SingleFileProcessor;
