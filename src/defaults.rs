//! Default configuration constants for turngate.
//!
//! Shared across the config types so the library, tests, and any embedding
//! application agree on the same tuning values.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech models and keeps frame durations short
/// enough for responsive turn-taking.
pub const SAMPLE_RATE: u32 = 16_000;

/// Sample rates the engine accepts.
pub const SUPPORTED_SAMPLE_RATES: [u32; 2] = [8_000, 16_000];

/// Default speech probability threshold.
///
/// A frame is treated as speech when the classifier probability is at or
/// above this value. 0.5 is the neutral operating point for a calibrated
/// classifier; raise it in noisy environments.
pub const THRESHOLD: f32 = 0.5;

/// Default frame size in samples.
///
/// 512 samples at 16kHz is 32ms per frame, the largest window the supported
/// classifiers accept and the cheapest per-second to classify.
pub const FRAME_SIZE: usize = 512;

/// Frame sizes the engine accepts, in samples.
pub const SUPPORTED_FRAME_SIZES: [usize; 3] = [128, 256, 512];

/// Default silence duration in milliseconds before a turn is considered over.
///
/// 800ms allows for natural mid-sentence pauses without prematurely ending
/// the user's turn. At the default frame size this is 25 frames.
pub const SILENCE_DURATION_MS: u32 = 800;

/// Default number of trailing silence frames transmitted after speech.
///
/// Padding the end of speech avoids clipping final syllables when the
/// classifier drops out a frame or two early. 10 frames is 320ms at the
/// default frame size.
pub const SPEECH_PAD_FRAMES: u32 = 10;

/// Default minimum speech-run length, in frames, for a turn to count.
///
/// Runs shorter than this are treated as transient noise bursts: their
/// `TurnComplete` is suppressed so the backend never sees an utterance
/// boundary for a door slam or cough.
pub const MIN_SPEECH_FRAMES: u32 = 3;

/// Default cap on the accumulator's buffered backlog, in whole frames.
///
/// If chunks arrive faster than classification drains them the remainder
/// buffer would otherwise grow without bound. 64 frames is ~2s of audio at
/// the default frame size.
pub const MAX_BUFFERED_FRAMES: usize = 64;

/// Default time budget for a single classify call, in milliseconds.
///
/// A classifier that blows this budget is treated as a transient fault for
/// that frame; the stream never blocks indefinitely on inference.
pub const CLASSIFY_BUDGET_MS: u64 = 100;

/// Recurrent state width used by the built-in mock classifier and tests.
pub const MOCK_STATE_DIM: usize = 128;
