//! Upload acceptance checks
//!
//! Extension first, then size, so a huge `.exe` reports the format problem.

use silencer_common::config::LimitsConfig;
use silencer_common::AudioFormat;

use crate::models::{RejectionReason, UploadedFile};

/// Accept or reject one uploaded file
///
/// Returns the format named by the extension. No side effects.
pub fn validate(file: &UploadedFile, limits: &LimitsConfig) -> Result<AudioFormat, RejectionReason> {
    let format = file
        .declared_format
        .ok_or_else(|| RejectionReason::UnsupportedFormat {
            filename: file.filename.clone(),
        })?;

    if file.size() > limits.max_file_size_bytes {
        return Err(RejectionReason::FileTooLarge {
            filename: file.filename.clone(),
            size: file.size(),
            limit: limits.max_file_size_bytes,
        });
    }

    Ok(format)
}
