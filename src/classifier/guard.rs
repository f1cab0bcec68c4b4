//! Classifier guard: bounded time budget, fault absorption, and stale-result
//! discarding for a classifier running on its own worker thread.
//!
//! The recurrent state is a sequential dependency, so calls for one stream
//! must never overlap. The guard serializes them through a single worker and
//! enforces the budget with `recv_timeout`: a slow call leaves its job on
//! the worker, the caller fails closed for that frame, and the eventual
//! result is discarded by job id when it finally lands.

use crate::classifier::{ClassifierState, SpeechClassifier};
use crate::error::{Result, TurnGateError};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct Job {
    id: u64,
    generation: u64,
    frame: Vec<f32>,
    state: ClassifierState,
}

struct JobResult {
    id: u64,
    generation: u64,
    outcome: Result<(f32, ClassifierState)>,
}

/// Wraps a classifier behind a worker thread with a per-call time budget.
pub struct ClassifierGuard {
    job_tx: Option<Sender<Job>>,
    result_rx: Receiver<JobResult>,
    budget: Duration,
    canonical_shape: usize,
    initial_state: ClassifierState,
    next_job_id: u64,
    worker: Option<JoinHandle<()>>,
}

impl ClassifierGuard {
    /// Spawns the worker thread owning the classifier.
    pub fn new<C: SpeechClassifier + 'static>(classifier: C, budget: Duration) -> Self {
        let initial_state = classifier.initial_state();
        let canonical_shape = initial_state.shape();

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<JobResult>();

        let worker = std::thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let outcome = classifier.classify(&job.frame, &job.state);
                let result = JobResult {
                    id: job.id,
                    generation: job.generation,
                    outcome,
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self {
            job_tx: Some(job_tx),
            result_rx,
            budget,
            canonical_shape,
            initial_state,
            next_job_id: 0,
            worker: Some(worker),
        }
    }

    /// Canonical zero state for this classifier.
    pub fn initial_state(&self) -> ClassifierState {
        self.initial_state.clone()
    }

    /// Classifies one frame within the configured budget.
    ///
    /// `generation` tags the stream's reset epoch; results carrying a stale
    /// generation or job id are discarded, never applied.
    ///
    /// Errors:
    /// - `Classification` — the call faulted or blew the budget (transient,
    ///   caller fails closed and keeps its state)
    /// - `ClassifierUnavailable` — the worker is gone (every later call will
    ///   fail the same way)
    /// - `StateCorruption` — the returned state has the wrong shape
    pub fn classify(
        &mut self,
        frame: Vec<f32>,
        state: &ClassifierState,
        generation: u64,
    ) -> Result<(f32, ClassifierState)> {
        let job_id = self.next_job_id;
        self.next_job_id += 1;

        let tx = self
            .job_tx
            .as_ref()
            .ok_or_else(|| TurnGateError::ClassifierUnavailable {
                message: "guard shut down".to_string(),
            })?;

        tx.send(Job {
            id: job_id,
            generation,
            frame,
            state: state.clone(),
        })
        .map_err(|_| TurnGateError::ClassifierUnavailable {
            message: "worker thread exited".to_string(),
        })?;

        let deadline = Instant::now() + self.budget;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(TurnGateError::Classification {
                    message: format!("budget of {:?} exceeded", self.budget),
                });
            }

            match self.result_rx.recv_timeout(deadline - now) {
                Ok(result) if result.id == job_id && result.generation == generation => {
                    let (probability, next_state) = result.outcome?;
                    if next_state.shape() != self.canonical_shape {
                        return Err(TurnGateError::StateCorruption {
                            expected: self.canonical_shape,
                            actual: next_state.shape(),
                        });
                    }
                    return Ok((probability.clamp(0.0, 1.0), next_state));
                }
                // Late result of an earlier (timed-out or pre-reset) job.
                Ok(_stale) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(TurnGateError::Classification {
                        message: format!("budget of {:?} exceeded", self.budget),
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(TurnGateError::ClassifierUnavailable {
                        message: "worker thread exited".to_string(),
                    });
                }
            }
        }
    }
}

impl Drop for ClassifierGuard {
    fn drop(&mut self) {
        // Closing the job channel lets the worker drain and exit.
        self.job_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
