//! Silence removal parameters
//!
//! One immutable value is built per deployment from configuration and passed
//! explicitly into every processing call. Single-file requests may override
//! individual fields with [`ProcessingParameters::with_overrides`].

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Silence detection and trimming parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingParameters {
    /// Minimum length of a silent span before it is removed, in milliseconds (default: 45)
    #[serde(default = "default_min_silence_len_ms")]
    pub min_silence_len_ms: u32,

    /// Loudness below which audio counts as silent, in dBFS (default: -45.0)
    #[serde(default = "default_silence_thresh_db")]
    pub silence_thresh_db: f64,

    /// Audio kept on each side of a removed span, in milliseconds (default: 30)
    #[serde(default = "default_keep_silence_ms")]
    pub keep_silence_ms: u32,
}

fn default_min_silence_len_ms() -> u32 {
    45
}

fn default_silence_thresh_db() -> f64 {
    -45.0
}

fn default_keep_silence_ms() -> u32 {
    30
}

impl Default for ProcessingParameters {
    fn default() -> Self {
        Self {
            min_silence_len_ms: default_min_silence_len_ms(),
            silence_thresh_db: default_silence_thresh_db(),
            keep_silence_ms: default_keep_silence_ms(),
        }
    }
}

/// Per-request overrides; `None` keeps the deployment value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterOverrides {
    pub min_silence_len_ms: Option<u32>,
    pub silence_thresh_db: Option<f64>,
    pub keep_silence_ms: Option<u32>,
}

impl ParameterOverrides {
    pub fn is_empty(&self) -> bool {
        self.min_silence_len_ms.is_none()
            && self.silence_thresh_db.is_none()
            && self.keep_silence_ms.is_none()
    }
}

impl ProcessingParameters {
    /// Check that the threshold is a usable number
    pub fn validate(&self) -> Result<()> {
        if !self.silence_thresh_db.is_finite() {
            return Err(Error::InvalidInput(format!(
                "silence threshold must be a finite dBFS value, got {}",
                self.silence_thresh_db
            )));
        }
        Ok(())
    }

    /// Return a copy with the given overrides applied
    pub fn with_overrides(&self, overrides: &ParameterOverrides) -> Result<Self> {
        let params = Self {
            min_silence_len_ms: overrides
                .min_silence_len_ms
                .unwrap_or(self.min_silence_len_ms),
            silence_thresh_db: overrides
                .silence_thresh_db
                .unwrap_or(self.silence_thresh_db),
            keep_silence_ms: overrides.keep_silence_ms.unwrap_or(self.keep_silence_ms),
        };
        params.validate()?;
        Ok(params)
    }
}
