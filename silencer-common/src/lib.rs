//! # Silencer Common Library
//!
//! Shared code for the Silencer service:
//! - Error types
//! - Configuration loading
//! - Silence removal parameters
//! - Accepted input and produced output formats

pub mod audio_format;
pub mod config;
pub mod error;
pub mod params;

pub use audio_format::{AudioFormat, OutputFormat};
pub use error::{Error, Result};
pub use params::{ParameterOverrides, ProcessingParameters};
