//! Turn segmenter: the hysteresis state machine at the heart of the engine.
//!
//! Consumes one speech probability per frame and produces a transmit
//! decision plus turn-lifecycle events. Pure state: no I/O, no clocks, no
//! allocation beyond the event list, so every transition is unit-testable.

use crate::config::SegmenterConfig;
use crate::segment::frame::SpeechEvent;

/// Segmenter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// No active speech; silence frames are dropped.
    Idle,
    /// Inside a speech run; every frame is transmitted.
    InSpeech,
    /// Silence after speech; counting toward turn completion, transmitting
    /// the pad window.
    TrailingSilence,
}

/// Outcome of stepping the segmenter with one frame's probability.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Whether the frame should be forwarded downstream.
    pub transmit: bool,
    /// Lifecycle events fired on this frame (at most two, and two only on
    /// the turn-completing frame).
    pub events: Vec<SpeechEvent>,
}

/// Hysteresis state machine segmenting a probability stream into turns.
pub struct TurnSegmenter {
    threshold: f32,
    silence_frames_to_end_speech: u32,
    speech_pad_frames: u32,
    min_speech_frames: u32,
    state: SegmenterState,
    /// Consecutive silence frames since the last speech frame.
    silence_run: u32,
    /// Speech frames observed in the current turn.
    speech_run: u32,
}

impl TurnSegmenter {
    /// Creates a segmenter from a validated configuration.
    pub fn new(config: &SegmenterConfig) -> Self {
        Self {
            threshold: config.threshold,
            silence_frames_to_end_speech: config.silence_frames_to_end_speech,
            speech_pad_frames: config.speech_pad_frames,
            min_speech_frames: config.min_speech_frames,
            state: SegmenterState::Idle,
            silence_run: 0,
            speech_run: 0,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SegmenterState {
        self.state
    }

    /// Returns true while a turn is in progress (speech or trailing silence).
    pub fn is_speech_active(&self) -> bool {
        self.state != SegmenterState::Idle
    }

    /// Classifies a probability against the configured threshold.
    pub fn is_speech(&self, probability: f32) -> bool {
        probability >= self.threshold
    }

    /// Advances the machine by one frame.
    ///
    /// `frame` is the stream-wide frame index, used only to stamp events.
    pub fn step(&mut self, frame: u64, probability: f32) -> StepOutcome {
        let speech = self.is_speech(probability);

        match (self.state, speech) {
            (SegmenterState::Idle, true) => {
                self.state = SegmenterState::InSpeech;
                self.silence_run = 0;
                self.speech_run = 1;
                StepOutcome {
                    transmit: true,
                    events: vec![SpeechEvent::SpeechStart { frame }],
                }
            }
            (SegmenterState::Idle, false) => StepOutcome {
                transmit: false,
                events: Vec::new(),
            },
            (SegmenterState::InSpeech, true) => {
                self.silence_run = 0;
                self.speech_run = self.speech_run.saturating_add(1);
                StepOutcome {
                    transmit: true,
                    events: Vec::new(),
                }
            }
            (SegmenterState::InSpeech, false) => {
                self.state = SegmenterState::TrailingSilence;
                self.silence_run = 1;
                // Start of the pad window; transmitted unless padding is off.
                StepOutcome {
                    transmit: self.silence_run <= self.speech_pad_frames,
                    events: Vec::new(),
                }
            }
            (SegmenterState::TrailingSilence, true) => {
                // Re-entrant: the pending completion is cancelled, the turn
                // continues, and no new SpeechStart fires.
                self.state = SegmenterState::InSpeech;
                self.silence_run = 0;
                self.speech_run = self.speech_run.saturating_add(1);
                StepOutcome {
                    transmit: true,
                    events: Vec::new(),
                }
            }
            (SegmenterState::TrailingSilence, false) => {
                self.silence_run = self.silence_run.saturating_add(1);
                if self.silence_run >= self.silence_frames_to_end_speech {
                    let completed_run = self.speech_run;
                    self.state = SegmenterState::Idle;
                    self.silence_run = 0;
                    self.speech_run = 0;

                    let mut events = vec![SpeechEvent::SpeechEnd { frame }];
                    // A run shorter than the minimum is a noise burst: it
                    // ends, but never signals an utterance boundary.
                    if completed_run >= self.min_speech_frames {
                        events.push(SpeechEvent::TurnComplete { frame });
                    }
                    StepOutcome {
                        transmit: false,
                        events,
                    }
                } else {
                    StepOutcome {
                        transmit: self.silence_run <= self.speech_pad_frames,
                        events: Vec::new(),
                    }
                }
            }
        }
    }

    /// Resets the machine to idle and clears the run counters.
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.silence_run = 0;
        self.speech_run = 0;
    }
}
