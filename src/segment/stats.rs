//! Frame and byte counters with derived cost-saving metrics.

use serde::{Deserialize, Serialize};

/// Snapshot of the counters for one stream, plus derived metrics.
///
/// Counters are monotonically non-decreasing between explicit resets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RunningStats {
    /// Frames processed (speech + silence).
    pub total_frames: u64,
    /// Frames at or above the speech threshold.
    pub speech_frames: u64,
    /// Frames below the speech threshold.
    pub silence_frames: u64,
    /// Bytes received from upstream, counted at PCM16 wire size.
    pub bytes_received: u64,
    /// Bytes actually forwarded downstream.
    pub bytes_sent: u64,
    /// Transient classification faults absorbed (frame treated as silence).
    pub classifier_faults: u64,
    /// Whole frames dropped by the accumulator on backlog overflow.
    pub overflow_drops: u64,
    /// Fraction of processed frames that were speech.
    pub speech_ratio: f64,
    /// Transport savings versus forwarding everything, in percent.
    pub savings_percent: f64,
}

/// Accumulates per-frame counters for one stream.
///
/// Telemetry only: nothing here feeds back into transmit decisions.
#[derive(Debug, Default)]
pub struct StatsCollector {
    total_frames: u64,
    speech_frames: u64,
    silence_frames: u64,
    bytes_received: u64,
    bytes_sent: u64,
    classifier_faults: u64,
    overflow_drops: u64,
}

impl StatsCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one processed frame.
    pub fn record_frame(&mut self, is_speech: bool, sample_count: usize, transmitted_bytes: usize) {
        self.total_frames += 1;
        if is_speech {
            self.speech_frames += 1;
        } else {
            self.silence_frames += 1;
        }
        // Received accounting is at PCM16 wire size, 2 bytes per sample.
        self.bytes_received += sample_count as u64 * 2;
        self.bytes_sent += transmitted_bytes as u64;
    }

    /// Records an absorbed transient classification fault.
    pub fn record_fault(&mut self) {
        self.classifier_faults += 1;
    }

    /// Records whole frames dropped on accumulator overflow.
    pub fn record_overflow(&mut self, frames_dropped: u64) {
        self.overflow_drops += frames_dropped;
    }

    /// Returns the current counters plus derived metrics.
    pub fn snapshot(&self) -> RunningStats {
        let total = self.total_frames.max(1);
        let received = self.bytes_received.max(1);
        RunningStats {
            total_frames: self.total_frames,
            speech_frames: self.speech_frames,
            silence_frames: self.silence_frames,
            bytes_received: self.bytes_received,
            bytes_sent: self.bytes_sent,
            classifier_faults: self.classifier_faults,
            overflow_drops: self.overflow_drops,
            speech_ratio: self.speech_frames as f64 / total as f64,
            savings_percent: (1.0 - self.bytes_sent as f64 / received as f64) * 100.0,
        }
    }

    /// Zeroes every counter. Segmenter and classifier state are untouched.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
