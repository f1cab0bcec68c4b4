//! turngate - streaming voice-activity and turn-segmentation engine
//!
//! Segments a continuous audio stream into discrete user turns and decides,
//! frame by frame, whether audio should be forwarded downstream: silence and
//! noise stay local, every syllable of genuine speech goes through.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod classifier;
pub mod config;
pub mod defaults;
pub mod error;
pub mod segment;
pub mod session;

// Core traits (classifier seam + per-frame observability)
pub use classifier::{ClassifierState, MockClassifier, SpeechClassifier};
pub use segment::observer::{FrameObserver, FrameReport, NoopObserver, StderrReporter};

// Engine
pub use segment::accumulator::FrameAccumulator;
pub use segment::frame::{AudioFrame, FrameDecision, SpeechEvent};
pub use segment::segmenter::{SegmenterState, StepOutcome, TurnSegmenter};
pub use segment::stats::{RunningStats, StatsCollector};
pub use session::TurnStream;

// Error handling
pub use error::{Result, TurnGateError};

// Config
pub use config::{SegmenterConfig, frames_for_duration};
