//! Frame accumulator: re-frames arbitrarily-chunked audio into fixed-size
//! frames.
//!
//! Chunk boundaries from upstream rarely align with classifier frame
//! boundaries. The accumulator buffers the remainder between calls so the
//! drained frame sequence is identical for every partition of the same
//! sample stream.

use crate::config::SegmenterConfig;
use crate::error::Result;
use crate::segment::frame::AudioFrame;
use std::collections::VecDeque;

/// Turns an arbitrary sequence of audio chunks into fixed-length frames.
///
/// Samples are consumed strictly in arrival order; leftovers (fewer than
/// `frame_size` samples) are retained and prepended to the next call's
/// input. The retained backlog is capped: whatever stays buffered after a
/// drain past `max_buffered_samples` loses its oldest whole frames, which
/// are counted. Samples drained by the same call are never subject to the
/// cap, so the frame sequence does not depend on chunk partitioning.
pub struct FrameAccumulator {
    frame_size: usize,
    max_buffered_samples: usize,
    buffer: VecDeque<f32>,
    /// Index assigned to the next drained frame; monotonic for the stream
    /// lifetime, surviving resets.
    next_index: u64,
    /// Number of whole frames dropped due to backlog overflow.
    overflow_drops: u64,
}

impl FrameAccumulator {
    /// Creates an accumulator for the given configuration.
    ///
    /// The frame size is validated here, once; per-chunk calls never
    /// re-check it.
    pub fn new(config: &SegmenterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            frame_size: config.frame_size,
            max_buffered_samples: config.max_buffered_frames * config.frame_size,
            buffer: VecDeque::with_capacity(config.frame_size * 2),
            next_index: 0,
            overflow_drops: 0,
        })
    }

    /// Appends a chunk and drains every complete frame.
    ///
    /// Returns the full frames in arrival order; the remainder stays
    /// buffered. Each returned frame is an owned copy, so the caller can
    /// hand it to the classifier while the buffer mutates underneath.
    ///
    /// The cap is enforced on what remains after draining, never on frames
    /// this call can hand back: a chunk larger than the cap still drains in
    /// full.
    pub fn append_and_drain(&mut self, chunk: &[f32]) -> Vec<AudioFrame> {
        self.buffer.extend(chunk.iter().copied());

        let frame_count = self.buffer.len() / self.frame_size;
        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            let samples: Vec<f32> = self.buffer.drain(..self.frame_size).collect();
            frames.push(AudioFrame::new(self.next_index, samples));
            self.next_index += 1;
        }
        self.enforce_cap();
        frames
    }

    /// Drops the oldest whole frames until the buffer fits under the cap.
    ///
    /// Only fires on a backlog a drain left behind, so it is inert while
    /// every complete frame is drained synchronously. Never drops mid-frame:
    /// the retained samples stay frame-aligned with respect to what will be
    /// drained next.
    fn enforce_cap(&mut self) {
        while self.buffer.len() > self.max_buffered_samples {
            let excess = self.buffer.len() - self.max_buffered_samples;
            let frames_to_drop = excess.div_ceil(self.frame_size);
            let samples_to_drop = (frames_to_drop * self.frame_size).min(self.buffer.len());
            self.buffer.drain(..samples_to_drop);
            self.overflow_drops += frames_to_drop as u64;
        }
    }

    /// Number of samples currently buffered (always < frame_size after a
    /// drain, unless the cap was just enforced mid-append).
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Whole frames dropped due to backlog overflow since construction or
    /// the last counter reset.
    pub fn overflow_drops(&self) -> u64 {
        self.overflow_drops
    }

    /// Clears the buffered remainder without touching the overflow counter.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
