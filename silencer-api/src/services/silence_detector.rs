//! Silence detection and removal
//!
//! Audio is measured in whole milliseconds. A window of `min_silence_len_ms`
//! slides over the signal one millisecond at a time; a window is silent when
//! its RMS (all channels together) is at or below the threshold. Overlapping
//! silent windows merge into [`SilenceRegion`]s, the complement is the audio
//! that is kept, and each kept range is widened by `keep_silence_ms` on both
//! sides. Where two widened ranges overlap they meet at the midpoint, so no
//! audio is duplicated.

use silencer_common::ProcessingParameters;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::utils::DecodedAudio;

/// Windows scanned between cancellation checks
const CANCEL_CHECK_INTERVAL: u64 = 1000;

/// Silence detection errors
#[derive(Debug, Error)]
pub enum SilenceError {
    /// Invalid detection parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Silence detection cancelled")]
    Cancelled,
}

/// Silent span in milliseconds, `[start_ms, end_ms)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceRegion {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl SilenceRegion {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Duration of silence region in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Removes silent spans from decoded audio
///
/// Implementations must be pure functions of their inputs so one instance can
/// serve every request concurrently.
pub trait SilenceRemover: Send + Sync {
    fn remove_silence(
        &self,
        audio: &DecodedAudio,
        params: &ProcessingParameters,
        cancel: &CancellationToken,
    ) -> Result<DecodedAudio, SilenceError>;
}

/// Silence detector
pub struct SilenceDetector {
    /// Silence threshold as linear amplitude (full scale = 1.0)
    threshold_linear: f64,

    /// Sliding window length in milliseconds
    window_ms: u64,

    /// Audio kept either side of each kept range, in milliseconds
    keep_silence_ms: u64,
}

impl SilenceDetector {
    /// Build a detector from processing parameters
    pub fn new(params: &ProcessingParameters) -> Result<Self, SilenceError> {
        if !params.silence_thresh_db.is_finite() {
            return Err(SilenceError::InvalidParameters(format!(
                "silence threshold must be finite, got {}",
                params.silence_thresh_db
            )));
        }

        Ok(Self {
            threshold_linear: Self::db_to_linear(params.silence_thresh_db),
            // A zero-length window would measure nothing
            window_ms: u64::from(params.min_silence_len_ms.max(1)),
            keep_silence_ms: u64::from(params.keep_silence_ms),
        })
    }

    /// Detect silence regions in audio
    ///
    /// Regions are sorted, non-overlapping and at least one window long.
    pub fn detect(
        &self,
        audio: &DecodedAudio,
        cancel: &CancellationToken,
    ) -> Result<Vec<SilenceRegion>, SilenceError> {
        let total_ms = audio.duration_ms();
        if total_ms < self.window_ms {
            return Ok(Vec::new());
        }

        let energy = Self::energy_prefix(audio);
        let channels = audio.channels as usize;
        let window = self.window_ms;

        let mut regions: Vec<SilenceRegion> = Vec::new();
        let mut current: Option<(u64, u64)> = None; // (region start, last silent window start)

        for start in 0..=(total_ms - window) {
            if start % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(SilenceError::Cancelled);
            }

            let end = start + window;
            let frames = audio.frame_at(end) - audio.frame_at(start);
            let sum_squares = energy[end as usize] - energy[start as usize];
            let rms = if frames == 0 {
                0.0
            } else {
                (sum_squares / (frames * channels) as f64).sqrt()
            };

            if rms > self.threshold_linear {
                continue;
            }

            current = match current {
                // Overlapping or touching the previous silent window
                Some((region_start, prev)) if start <= prev + window => Some((region_start, start)),
                Some((region_start, prev)) => {
                    regions.push(SilenceRegion::new(region_start, prev + window));
                    Some((start, start))
                }
                None => Some((start, start)),
            };
        }

        if let Some((region_start, prev)) = current {
            regions.push(SilenceRegion::new(region_start, prev + window));
        }

        Ok(regions)
    }

    /// Millisecond ranges to keep, padded and clamped to the audio
    pub fn kept_ranges(&self, regions: &[SilenceRegion], total_ms: u64) -> Vec<(u64, u64)> {
        if regions.is_empty() {
            return vec![(0, total_ms)];
        }
        if regions.len() == 1 && regions[0] == SilenceRegion::new(0, total_ms) {
            return Vec::new();
        }

        let mut nonsilent: Vec<(i64, i64)> = Vec::with_capacity(regions.len() + 1);
        let mut prev_end = 0u64;
        for region in regions {
            if region.start_ms > prev_end {
                nonsilent.push((prev_end as i64, region.start_ms as i64));
            }
            prev_end = region.end_ms;
        }
        if prev_end < total_ms {
            nonsilent.push((prev_end as i64, total_ms as i64));
        }

        let keep = self.keep_silence_ms as i64;
        let mut padded: Vec<(i64, i64)> = nonsilent
            .iter()
            .map(|&(start, end)| (start - keep, end + keep))
            .collect();

        for i in 1..padded.len() {
            let last_end = padded[i - 1].1;
            let next_start = padded[i].0;
            if next_start < last_end {
                let mid = (last_end + next_start).div_euclid(2);
                padded[i - 1].1 = mid;
                padded[i].0 = mid;
            }
        }

        padded
            .into_iter()
            .map(|(start, end)| {
                (
                    start.clamp(0, total_ms as i64) as u64,
                    end.clamp(0, total_ms as i64) as u64,
                )
            })
            .filter(|(start, end)| end > start)
            .collect()
    }

    /// Cumulative sum of squares, one entry per millisecond boundary
    ///
    /// `energy[ms]` covers frames `0..audio.frame_at(ms)`.
    fn energy_prefix(audio: &DecodedAudio) -> Vec<f64> {
        let total_ms = audio.duration_ms();
        let channels = audio.channels as usize;

        let mut prefix = Vec::with_capacity(total_ms as usize + 1);
        prefix.push(0.0);

        let mut acc = 0.0f64;
        for ms in 0..total_ms {
            let from = audio.frame_at(ms) * channels;
            let to = audio.frame_at(ms + 1) * channels;
            acc += audio.samples[from..to]
                .iter()
                .map(|&s| f64::from(s) * f64::from(s))
                .sum::<f64>();
            prefix.push(acc);
        }

        prefix
    }

    /// Convert dB to linear amplitude
    fn db_to_linear(db: f64) -> f64 {
        10.0_f64.powf(db / 20.0)
    }
}

/// RMS-threshold remover backed by [`SilenceDetector`]
#[derive(Debug, Default, Clone, Copy)]
pub struct RmsSilenceRemover;

impl SilenceRemover for RmsSilenceRemover {
    fn remove_silence(
        &self,
        audio: &DecodedAudio,
        params: &ProcessingParameters,
        cancel: &CancellationToken,
    ) -> Result<DecodedAudio, SilenceError> {
        let detector = SilenceDetector::new(params)?;
        let total_ms = audio.duration_ms();

        let regions = detector.detect(audio, cancel)?;
        let ranges = detector.kept_ranges(&regions, total_ms);

        let channels = audio.channels as usize;
        let mut output = audio.empty_like();
        for (start_ms, end_ms) in &ranges {
            let from = audio.frame_at(*start_ms) * channels;
            let to = audio.frame_at(*end_ms) * channels;
            output.samples.extend_from_slice(&audio.samples[from..to]);
        }

        tracing::debug!(
            silent_regions = regions.len(),
            kept_ranges = ranges.len(),
            input_frames = audio.frames(),
            output_frames = output.frames(),
            "Silence removed"
        );

        Ok(output)
    }
}
