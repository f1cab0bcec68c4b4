//! Frame and event types flowing through the segmentation engine.

use serde::{Deserialize, Serialize};

/// A fixed-length window of float samples, classified as one unit.
///
/// Ephemeral: consumed once per classification and then released.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Monotonic index of this frame within its stream.
    pub index: u64,
    /// Exactly `frame_size` samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
}

impl AudioFrame {
    /// Creates a new audio frame.
    pub fn new(index: u64, samples: Vec<f32>) -> Self {
        Self { index, samples }
    }

    /// Returns the duration of this frame in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        (self.samples.len() as u32 * 1000) / sample_rate
    }
}

/// Turn-lifecycle events emitted by the segmenter.
///
/// `frame` is the index of the frame on which the event fired. A completing
/// frame carries both `SpeechEnd` and `TurnComplete`; every other frame
/// carries at most one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeechEvent {
    /// Speech has started after silence.
    SpeechStart { frame: u64 },
    /// Speech has ended (sustained silence confirmed).
    SpeechEnd { frame: u64 },
    /// The user's turn is complete; downstream should finalize the utterance.
    TurnComplete { frame: u64 },
}

impl SpeechEvent {
    /// Index of the frame this event fired on.
    pub fn frame(&self) -> u64 {
        match *self {
            SpeechEvent::SpeechStart { frame }
            | SpeechEvent::SpeechEnd { frame }
            | SpeechEvent::TurnComplete { frame } => frame,
        }
    }
}

/// Per-frame output of the engine: one transmit decision, any lifecycle
/// events, and the wire payload when transmitting.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDecision {
    /// Index of the processed frame.
    pub frame: u64,
    /// Speech probability reported by the classifier (0.0 on a fault).
    pub probability: f32,
    /// Whether this frame should be forwarded downstream.
    pub transmit: bool,
    /// Lifecycle events fired on this frame (0, 1, or 2 entries).
    pub events: Vec<SpeechEvent>,
    /// Little-endian PCM16 payload, present iff `transmit`.
    pub payload: Option<Vec<u8>>,
}

impl FrameDecision {
    /// Returns true if any event on this frame is `TurnComplete`.
    pub fn completes_turn(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, SpeechEvent::TurnComplete { .. }))
    }
}
