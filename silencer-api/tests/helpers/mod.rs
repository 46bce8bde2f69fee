//! Test Helper Utilities
//!
//! Shared utilities for testing silencer-api

pub mod audio_generator;
pub mod multipart;

// Re-export commonly used items
pub use audio_generator::{generate_test_flac, generate_test_wav, wav_duration_seconds, AudioConfig};
pub use multipart::MultipartBuilder;

use silencer_common::config::ServiceConfig;
use std::path::Path;

/// Default configuration with working files kept in `work_dir`
pub fn test_config(work_dir: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.work_dir = Some(work_dir.to_path_buf());
    config.batch.max_workers = 4;
    config
}
