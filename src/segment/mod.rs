//! Streaming turn segmentation: frame accumulation, the hysteresis state
//! machine, telemetry counters, and the per-frame observer hook.

pub mod accumulator;
pub mod frame;
pub mod observer;
pub mod segmenter;
pub mod stats;
