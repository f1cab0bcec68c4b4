//! Speech classifier adapter: the seam between the engine and an external
//! speech/silence model.
//!
//! The model itself is opaque. The engine threads a `ClassifierState` value
//! between consecutive calls; the classifier owns no per-stream state of its
//! own, so one classifier instance can safely serve many streams.

pub mod guard;

use crate::defaults;
use crate::error::{Result, TurnGateError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Opaque recurrent memory threaded between consecutive classify calls.
///
/// Modeled as the paired hidden/cell tensors of a small recurrent network.
/// Exactly one live instance per stream; the shape is fixed at stream start.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierState {
    /// Hidden tensor.
    pub h: Vec<f32>,
    /// Cell tensor.
    pub c: Vec<f32>,
}

impl ClassifierState {
    /// Canonical zero state of the given width.
    pub fn zeroed(dim: usize) -> Self {
        Self {
            h: vec![0.0; dim],
            c: vec![0.0; dim],
        }
    }

    /// Total element count; used to detect shape corruption.
    pub fn shape(&self) -> usize {
        self.h.len() + self.c.len()
    }
}

/// External collaborator interface: frame + recurrent state → probability +
/// next state.
///
/// Implementations must be deterministic for a given `(frame, state)` pair
/// and side-effect free with respect to anything but the returned state.
pub trait SpeechClassifier: Send {
    /// Classifies one frame.
    ///
    /// Returns the speech probability in [0.0, 1.0] and the state to thread
    /// into the next call.
    fn classify(&self, frame: &[f32], state: &ClassifierState) -> Result<(f32, ClassifierState)>;

    /// Returns the canonical zero state for a fresh stream.
    fn initial_state(&self) -> ClassifierState;
}

/// How the mock derives a probability from a frame.
#[derive(Debug, Clone)]
enum MockMode {
    /// Probability proportional to frame RMS, capped at 1.0.
    Energy { gain: f32 },
    /// Scripted probabilities indexed by a counter riding in the state, so
    /// a state reset replays the script. The last entry repeats once the
    /// script is exhausted.
    Scripted(Vec<f32>),
}

/// Mock classifier for tests and offline tuning.
///
/// Scripted probabilities are indexed by a counter carried in `h[0]`, so a
/// state reset replays the script from the top. Fault and corruption
/// injection key off the absolute call number instead: a caller that keeps
/// its pre-fault state must not hit the same injected fault again.
#[derive(Debug)]
pub struct MockClassifier {
    mode: MockMode,
    state_dim: usize,
    /// Total classify calls, successful or not.
    calls: AtomicU64,
    /// Call numbers (zero-based) that fail with a transient error.
    fault_on: HashSet<u64>,
    /// Call numbers that return a state of the wrong shape.
    corrupt_on: HashSet<u64>,
    /// Artificial latency per call, for budget tests.
    delay: Option<Duration>,
}

impl MockClassifier {
    /// Energy-driven mock: probability = min(rms * gain, 1.0).
    pub fn energy(gain: f32) -> Self {
        Self {
            mode: MockMode::Energy { gain },
            state_dim: defaults::MOCK_STATE_DIM,
            calls: AtomicU64::new(0),
            fault_on: HashSet::new(),
            corrupt_on: HashSet::new(),
            delay: None,
        }
    }

    /// Scripted mock returning the given probabilities call by call; the
    /// last entry repeats.
    pub fn scripted(probabilities: Vec<f32>) -> Self {
        Self {
            mode: MockMode::Scripted(probabilities),
            state_dim: defaults::MOCK_STATE_DIM,
            calls: AtomicU64::new(0),
            fault_on: HashSet::new(),
            corrupt_on: HashSet::new(),
            delay: None,
        }
    }

    /// Fails (transiently) on the given zero-based call numbers.
    pub fn with_fault_on(mut self, indices: impl IntoIterator<Item = u64>) -> Self {
        self.fault_on.extend(indices);
        self
    }

    /// Returns a wrong-shape state on the given zero-based call numbers.
    pub fn with_corrupt_state_on(mut self, indices: impl IntoIterator<Item = u64>) -> Self {
        self.corrupt_on.extend(indices);
        self
    }

    /// Adds artificial latency to every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Overrides the recurrent state width.
    pub fn with_state_dim(mut self, dim: usize) -> Self {
        self.state_dim = dim.max(1);
        self
    }
}

impl SpeechClassifier for MockClassifier {
    fn classify(&self, frame: &[f32], state: &ClassifierState) -> Result<(f32, ClassifierState)> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let call_number = self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fault_on.contains(&call_number) {
            return Err(TurnGateError::Classification {
                message: format!("scripted fault on call {call_number}"),
            });
        }

        let script_index = state.h.first().copied().unwrap_or(0.0) as u64;
        let probability = match &self.mode {
            MockMode::Energy { gain } => {
                (crate::audio::convert::compute_rms(frame) * gain).min(1.0)
            }
            MockMode::Scripted(script) => {
                let idx = (script_index as usize).min(script.len().saturating_sub(1));
                script.get(idx).copied().unwrap_or(0.0)
            }
        };

        if self.corrupt_on.contains(&call_number) {
            return Ok((probability, ClassifierState::zeroed(self.state_dim / 2)));
        }

        let mut next = state.clone();
        if let Some(counter) = next.h.first_mut() {
            *counter = (script_index + 1) as f32;
        }
        Ok((probability, next))
    }

    fn initial_state(&self) -> ClassifierState {
        ClassifierState::zeroed(self.state_dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_state_shape() {
        let state = ClassifierState::zeroed(64);
        assert_eq!(state.h.len(), 64);
        assert_eq!(state.c.len(), 64);
        assert_eq!(state.shape(), 128);
        assert!(state.h.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_scripted_mock_walks_script() {
        let mock = MockClassifier::scripted(vec![0.1, 0.9, 0.3]);
        let mut state = mock.initial_state();

        let mut probs = Vec::new();
        for _ in 0..5 {
            let (p, next) = mock.classify(&[0.0; 512], &state).unwrap();
            probs.push(p);
            state = next;
        }
        // Last entry repeats after the script runs out.
        assert_eq!(probs, vec![0.1, 0.9, 0.3, 0.3, 0.3]);
    }

    #[test]
    fn test_mock_is_deterministic_for_same_inputs() {
        let mock = MockClassifier::scripted(vec![0.2, 0.8]);
        let state = mock.initial_state();
        let frame = vec![0.5f32; 512];

        let a = mock.classify(&frame, &state).unwrap();
        let b = mock.classify(&frame, &state).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_energy_mock_tracks_rms() {
        let mock = MockClassifier::energy(10.0);
        let state = mock.initial_state();

        let (silence_p, _) = mock.classify(&vec![0.0f32; 512], &state).unwrap();
        assert_eq!(silence_p, 0.0);

        let (speech_p, _) = mock.classify(&vec![0.2f32; 512], &state).unwrap();
        assert!(speech_p > 0.5, "expected loud frame to score high, got {speech_p}");
    }

    #[test]
    fn test_fault_injection() {
        let mock = MockClassifier::scripted(vec![0.9]).with_fault_on([1]);
        let mut state = mock.initial_state();

        let (_, next) = mock.classify(&[0.0; 512], &state).unwrap();
        state = next;

        let err = mock.classify(&[0.0; 512], &state).unwrap_err();
        assert!(matches!(err, TurnGateError::Classification { .. }));
    }

    #[test]
    fn test_corrupt_state_injection() {
        let mock = MockClassifier::scripted(vec![0.9]).with_corrupt_state_on([0]);
        let state = mock.initial_state();

        let (_, next) = mock.classify(&[0.0; 512], &state).unwrap();
        assert_ne!(next.shape(), state.shape());
    }
}
