//! Sample-format conversion and audio diagnostics.

pub mod convert;
