//! Per-stream composition: chunks in, transmit decisions and turn events out.
//!
//! One `TurnStream` per audio session. Streams share nothing: each owns its
//! accumulator, classifier state, segmenter, and stats, so independent
//! sessions can run on parallel tasks with no synchronization between them.

use crate::audio::convert;
use crate::classifier::guard::ClassifierGuard;
use crate::classifier::{ClassifierState, SpeechClassifier};
use crate::config::SegmenterConfig;
use crate::error::Result;
use crate::segment::accumulator::FrameAccumulator;
use crate::segment::frame::{AudioFrame, FrameDecision};
use crate::segment::observer::{FrameObserver, FrameReport, NoopObserver};
use crate::segment::segmenter::{SegmenterState, TurnSegmenter};
use crate::segment::stats::{RunningStats, StatsCollector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Streaming voice-activity / turn-segmentation engine for one session.
///
/// Processing is strictly sequential: frame N+1 is not classified until
/// frame N's classification has returned, because the recurrent state is a
/// sequential dependency.
pub struct TurnStream {
    config: SegmenterConfig,
    accumulator: FrameAccumulator,
    guard: ClassifierGuard,
    state: ClassifierState,
    /// Reset epoch; bumped on `reset_state` so in-flight classification
    /// results from before the reset are discarded, never applied.
    generation: u64,
    segmenter: TurnSegmenter,
    stats: StatsCollector,
    observer: Arc<dyn FrameObserver>,
    /// Set after state corruption: the stream fails open (always transmit)
    /// until the caller rebuilds it.
    poisoned: bool,
    /// Overflow drops already forwarded to stats/observer.
    reported_overflow: u64,
}

impl TurnStream {
    /// Builds a stream from a configuration and a classifier.
    ///
    /// The configuration is validated here, once; invalid values prevent
    /// the stream from starting.
    pub fn new<C: SpeechClassifier + 'static>(
        config: SegmenterConfig,
        classifier: C,
    ) -> Result<Self> {
        let accumulator = FrameAccumulator::new(&config)?;
        let guard = ClassifierGuard::new(classifier, Duration::from_millis(config.classify_budget_ms));
        let state = guard.initial_state();
        let segmenter = TurnSegmenter::new(&config);

        Ok(Self {
            config,
            accumulator,
            guard,
            state,
            generation: 0,
            segmenter,
            stats: StatsCollector::new(),
            observer: Arc::new(NoopObserver),
            poisoned: false,
            reported_overflow: 0,
        })
    }

    /// Replaces the per-frame observer.
    pub fn set_observer(&mut self, observer: Arc<dyn FrameObserver>) {
        self.observer = observer;
    }

    /// Returns the stream's configuration.
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Returns true while a turn is in progress.
    pub fn is_speech_active(&self) -> bool {
        self.segmenter.is_speech_active()
    }

    /// Current segmenter state.
    pub fn segmenter_state(&self) -> SegmenterState {
        self.segmenter.state()
    }

    /// Returns true once the stream has failed open after state corruption.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Telemetry snapshot.
    pub fn stats(&self) -> RunningStats {
        self.stats.snapshot()
    }

    /// Zeroes the telemetry counters. Classifier and segmenter state are
    /// untouched.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Resets the classifier state to its canonical zero value, clears the
    /// buffered remainder and the segmenter's run counters.
    ///
    /// `RunningStats` persists across this call. The generation bump makes
    /// any still-in-flight classification result stale.
    pub fn reset_state(&mut self) {
        self.generation += 1;
        self.state = self.guard.initial_state();
        self.accumulator.clear();
        self.segmenter.reset();
    }

    /// Feeds a chunk of float samples and returns one decision per complete
    /// frame.
    ///
    /// Chunk sizes are caller-defined and need not align with the frame
    /// size; leftovers carry over to the next call. The only error surfaced
    /// here is stream-fatal state corruption — transient classification
    /// faults are absorbed (the frame fails closed to silence).
    ///
    /// On corruption the whole chunk is still processed: the corrupting
    /// frame and every frame after it go through the fail-open path, with
    /// stats and the observer seeing each one, and the error is returned
    /// once the chunk is finished. No drained frame is dropped at the
    /// corruption boundary.
    pub fn push(&mut self, chunk: &[f32]) -> Result<Vec<FrameDecision>> {
        let frames = self.accumulator.append_and_drain(chunk);
        self.report_overflow();

        let mut decisions = Vec::with_capacity(frames.len());
        let mut fatal = None;
        for frame in frames {
            let decision = if self.poisoned {
                self.decide_fail_open(&frame)
            } else {
                match self.classify_and_decide(&frame) {
                    Ok(decision) => decision,
                    Err(err) => {
                        // Stream-scoped terminating error: force a reset,
                        // fail open from this frame on, surface the error
                        // after the chunk completes.
                        self.poisoned = true;
                        self.reset_state();
                        fatal = Some(err);
                        self.decide_fail_open(&frame)
                    }
                }
            };
            decisions.push(decision);
        }

        match fatal {
            Some(err) => Err(err),
            None => Ok(decisions),
        }
    }

    /// Feeds a chunk of 16-bit PCM samples.
    pub fn push_pcm16(&mut self, chunk: &[i16]) -> Result<Vec<FrameDecision>> {
        self.push(&convert::from_pcm16(chunk))
    }

    /// Errs only on stream-fatal corruption; transient faults are absorbed
    /// here (the frame fails closed to silence, state is kept).
    fn classify_and_decide(&mut self, frame: &AudioFrame) -> Result<FrameDecision> {
        let probability =
            match self
                .guard
                .classify(frame.samples.clone(), &self.state, self.generation)
            {
                Ok((probability, next_state)) => {
                    self.state = next_state;
                    probability
                }
                Err(err) if err.is_stream_fatal() => return Err(err),
                Err(err) => {
                    // Transient fault or dead worker: fail closed to silence
                    // for this frame, keep the last known-good state.
                    self.stats.record_fault();
                    self.observer.on_fault(frame.index, &err.to_string());
                    0.0
                }
            };

        let is_speech = self.segmenter.is_speech(probability);
        let outcome = self.segmenter.step(frame.index, probability);

        let payload = outcome
            .transmit
            .then(|| convert::pcm16_to_bytes(&convert::to_pcm16(&frame.samples)));
        let payload_len = payload.as_ref().map_or(0, Vec::len);

        self.stats.record_frame(is_speech, frame.samples.len(), payload_len);

        let decision = FrameDecision {
            frame: frame.index,
            probability,
            transmit: outcome.transmit,
            events: outcome.events,
            payload,
        };

        self.observer.on_frame(&FrameReport {
            decision: &decision,
            state: self.segmenter.state(),
            rms: convert::compute_rms(&frame.samples),
        });

        Ok(decision)
    }

    /// Fail-open path after state corruption: every full frame is
    /// transmitted so genuine speech is never lost, and no events fire.
    fn decide_fail_open(&mut self, frame: &AudioFrame) -> FrameDecision {
        let payload = convert::pcm16_to_bytes(&convert::to_pcm16(&frame.samples));
        self.stats.record_frame(true, frame.samples.len(), payload.len());

        let decision = FrameDecision {
            frame: frame.index,
            probability: 1.0,
            transmit: true,
            events: Vec::new(),
            payload: Some(payload),
        };

        self.observer.on_frame(&FrameReport {
            decision: &decision,
            state: self.segmenter.state(),
            rms: convert::compute_rms(&frame.samples),
        });

        decision
    }

    fn report_overflow(&mut self) {
        let total = self.accumulator.overflow_drops();
        let new = total - self.reported_overflow;
        if new > 0 {
            self.reported_overflow = total;
            self.stats.record_overflow(new);
            self.observer.on_overflow(new);
        }
    }

    /// Runs the stream as a channel-connected station for async callers.
    ///
    /// Chunks are processed strictly in order; the channel serializes calls
    /// so classifications never overlap. Ends when the input closes, the
    /// output is dropped, or a stream-fatal error occurs; returns the final
    /// stats snapshot.
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<Vec<f32>>,
        output: mpsc::Sender<FrameDecision>,
    ) -> Result<RunningStats> {
        while let Some(chunk) = input.recv().await {
            for decision in self.push(&chunk)? {
                if output.send(decision).await.is_err() {
                    return Ok(self.stats());
                }
            }
        }
        Ok(self.stats())
    }
}
