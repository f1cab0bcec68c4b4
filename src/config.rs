//! Segmenter configuration: loading, defaults, and eager validation.
//!
//! A `SegmenterConfig` is validated exactly once, when a stream is
//! constructed. Invalid values are fatal at that point and never re-checked
//! per chunk.

use crate::defaults;
use crate::error::{Result, TurnGateError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one turn-segmentation stream.
///
/// Immutable after validation at stream construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Speech probability threshold (0.0 to 1.0). A frame is speech when the
    /// classifier probability is at or above this value.
    pub threshold: f32,
    /// Frame size in samples. Must be one of 128, 256, 512.
    pub frame_size: usize,
    /// Sample rate in Hz, fixed for the stream lifetime.
    pub sample_rate: u32,
    /// Consecutive silence frames after speech before the turn completes.
    pub silence_frames_to_end_speech: u32,
    /// Trailing silence frames still transmitted after speech (end padding).
    pub speech_pad_frames: u32,
    /// Minimum speech-run length (frames) for a completed turn to emit
    /// `TurnComplete`. Shorter runs are treated as noise bursts.
    pub min_speech_frames: u32,
    /// Cap on the accumulator backlog, in whole frames. Overflow drops the
    /// oldest buffered frames.
    pub max_buffered_frames: usize,
    /// Time budget for a single classify call, in milliseconds.
    pub classify_budget_ms: u64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::THRESHOLD,
            frame_size: defaults::FRAME_SIZE,
            sample_rate: defaults::SAMPLE_RATE,
            silence_frames_to_end_speech: frames_for_duration(
                defaults::SILENCE_DURATION_MS,
                defaults::FRAME_SIZE,
                defaults::SAMPLE_RATE,
            ),
            speech_pad_frames: defaults::SPEECH_PAD_FRAMES,
            min_speech_frames: defaults::MIN_SPEECH_FRAMES,
            max_buffered_frames: defaults::MAX_BUFFERED_FRAMES,
            classify_budget_ms: defaults::CLASSIFY_BUDGET_MS,
        }
    }
}

/// Converts a duration in milliseconds to a frame count, rounding up so a
/// requested silence window is never shortened by truncation.
pub fn frames_for_duration(duration_ms: u32, frame_size: usize, sample_rate: u32) -> u32 {
    let frame_ms = frame_size as u64 * 1000 / sample_rate as u64;
    let frame_ms = frame_ms.max(1);
    (duration_ms as u64).div_ceil(frame_ms) as u32
}

impl SegmenterConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values. Returns an error for a missing
    /// file or invalid TOML. The result is not yet validated; validation
    /// happens when a stream is built from it.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::Error::new(TurnGateError::ConfigFileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                anyhow::Error::new(e)
            }
        })?;
        let config: SegmenterConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if it doesn't exist.
    ///
    /// Invalid TOML is still an error; only a missing file falls back.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<TurnGateError>()
                    .is_some_and(|te| matches!(te, TurnGateError::ConfigFileNotFound { .. }))
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - TURNGATE_THRESHOLD → threshold
    /// - TURNGATE_FRAME_SIZE → frame_size
    /// - TURNGATE_SILENCE_MS → silence_frames_to_end_speech (converted)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("TURNGATE_THRESHOLD")
            && let Ok(threshold) = value.parse::<f32>()
        {
            self.threshold = threshold;
        }

        if let Ok(value) = std::env::var("TURNGATE_FRAME_SIZE")
            && let Ok(frame_size) = value.parse::<usize>()
        {
            self.frame_size = frame_size;
        }

        if let Ok(value) = std::env::var("TURNGATE_SILENCE_MS")
            && let Ok(silence_ms) = value.parse::<u32>()
        {
            self.silence_frames_to_end_speech =
                frames_for_duration(silence_ms, self.frame_size, self.sample_rate);
        }

        self
    }

    /// Sets the silence window from a target duration instead of a frame count.
    pub fn with_silence_duration_ms(mut self, duration_ms: u32) -> Self {
        self.silence_frames_to_end_speech =
            frames_for_duration(duration_ms, self.frame_size, self.sample_rate);
        self
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(&self) -> u32 {
        (self.frame_size as u64 * 1000 / self.sample_rate as u64) as u32
    }

    /// Validates the configuration. Called once at stream construction;
    /// any violation prevents the stream from starting.
    pub fn validate(&self) -> Result<()> {
        if !defaults::SUPPORTED_FRAME_SIZES.contains(&self.frame_size) {
            return Err(TurnGateError::ConfigInvalidValue {
                key: "frame_size".to_string(),
                message: format!(
                    "{} is not supported, must be one of {:?}",
                    self.frame_size,
                    defaults::SUPPORTED_FRAME_SIZES
                ),
            });
        }

        if !defaults::SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(TurnGateError::ConfigInvalidValue {
                key: "sample_rate".to_string(),
                message: format!(
                    "{} is not supported, must be one of {:?}",
                    self.sample_rate,
                    defaults::SUPPORTED_SAMPLE_RATES
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.threshold) || !self.threshold.is_finite() {
            return Err(TurnGateError::ConfigInvalidValue {
                key: "threshold".to_string(),
                message: format!("{} is outside [0.0, 1.0]", self.threshold),
            });
        }

        if self.silence_frames_to_end_speech == 0 {
            return Err(TurnGateError::ConfigInvalidValue {
                key: "silence_frames_to_end_speech".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.max_buffered_frames == 0 {
            return Err(TurnGateError::ConfigInvalidValue {
                key: "max_buffered_frames".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.classify_budget_ms == 0 {
            return Err(TurnGateError::ConfigInvalidValue {
                key: "classify_budget_ms".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
