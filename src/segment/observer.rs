//! Per-frame observer hook.
//!
//! The engine invokes the observer on every processed frame; any sampling or
//! rate limiting is the observer's business, keeping the core deterministic.

use crate::segment::frame::FrameDecision;
use crate::segment::segmenter::SegmenterState;

/// What the observer sees for one processed frame.
#[derive(Debug, Clone)]
pub struct FrameReport<'a> {
    /// The decision the engine produced for this frame.
    pub decision: &'a FrameDecision,
    /// Segmenter state after processing the frame.
    pub state: SegmenterState,
    /// Diagnostic RMS of the frame's samples.
    pub rms: f32,
}

/// Hook invoked once per processed frame, plus notifications for absorbed
/// faults and overflow drops.
pub trait FrameObserver: Send + Sync {
    /// Called after every processed frame.
    fn on_frame(&self, report: &FrameReport<'_>);

    /// Called when a transient classification fault was absorbed.
    fn on_fault(&self, frame: u64, message: &str) {
        let _ = (frame, message);
    }

    /// Called when the accumulator dropped whole frames on overflow.
    fn on_overflow(&self, frames_dropped: u64) {
        let _ = frames_dropped;
    }
}

/// Observer that ignores everything. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FrameObserver for NoopObserver {
    fn on_frame(&self, _report: &FrameReport<'_>) {}
}

/// Observer that reports faults and overflows to stderr.
///
/// Frame-by-frame output stays silent; only the conditions an operator
/// should notice are printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl FrameObserver for StderrReporter {
    fn on_frame(&self, _report: &FrameReport<'_>) {}

    fn on_fault(&self, frame: u64, message: &str) {
        eprintln!("turngate: classify fault on frame {frame}: {message}");
    }

    fn on_overflow(&self, frames_dropped: u64) {
        eprintln!("turngate: backlog overflow, dropped {frames_dropped} frame(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Observer that records everything it sees, for assertions.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub frames: Mutex<Vec<u64>>,
        pub faults: Mutex<Vec<u64>>,
        pub overflows: Mutex<Vec<u64>>,
    }

    impl FrameObserver for RecordingObserver {
        fn on_frame(&self, report: &FrameReport<'_>) {
            self.frames.lock().unwrap().push(report.decision.frame);
        }

        fn on_fault(&self, frame: u64, _message: &str) {
            self.faults.lock().unwrap().push(frame);
        }

        fn on_overflow(&self, frames_dropped: u64) {
            self.overflows.lock().unwrap().push(frames_dropped);
        }
    }

    #[test]
    fn test_noop_observer_does_not_panic() {
        let observer = NoopObserver;
        let decision = FrameDecision {
            frame: 0,
            probability: 0.5,
            transmit: true,
            events: Vec::new(),
            payload: None,
        };
        observer.on_frame(&FrameReport {
            decision: &decision,
            state: SegmenterState::InSpeech,
            rms: 0.1,
        });
        observer.on_fault(1, "test");
        observer.on_overflow(2);
    }

    #[test]
    fn test_stderr_reporter_does_not_panic() {
        let reporter = StderrReporter;
        reporter.on_fault(3, "budget exceeded");
        reporter.on_overflow(1);
    }

    #[test]
    fn test_recording_observer_captures_calls() {
        let observer = RecordingObserver::default();
        observer.on_fault(7, "x");
        observer.on_overflow(2);
        assert_eq!(*observer.faults.lock().unwrap(), vec![7]);
        assert_eq!(*observer.overflows.lock().unwrap(), vec![2]);
    }
}
