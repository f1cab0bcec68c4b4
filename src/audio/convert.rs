//! Sample-format conversion between float and 16-bit fixed-point PCM.
//!
//! The i16 range is asymmetric (-32768..=32767), so a single shared scale
//! constant cannot round-trip both full-scale extremes. Positive samples
//! scale by 32767 and negative samples by 32768, and the inverse conversion
//! divides by the matching constant.

/// Positive full-scale constant for 16-bit PCM.
const POSITIVE_FULL_SCALE: f32 = 32767.0;
/// Negative full-scale constant for 16-bit PCM.
const NEGATIVE_FULL_SCALE: f32 = 32768.0;

/// Converts float samples to 16-bit PCM.
///
/// Samples are clamped to [-1.0, 1.0] before scaling. Non-finite samples
/// (a misbehaving upstream resampler) convert to 0.
pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| {
            if !sample.is_finite() {
                return 0;
            }
            let clamped = sample.clamp(-1.0, 1.0);
            if clamped >= 0.0 {
                (clamped * POSITIVE_FULL_SCALE) as i16
            } else {
                (clamped * NEGATIVE_FULL_SCALE) as i16
            }
        })
        .collect()
}

/// Converts 16-bit PCM samples to floats in [-1.0, 1.0].
pub fn from_pcm16(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&sample| {
            if sample >= 0 {
                sample as f32 / POSITIVE_FULL_SCALE
            } else {
                sample as f32 / NEGATIVE_FULL_SCALE
            }
        })
        .collect()
}

/// Serializes 16-bit PCM samples to little-endian bytes (the wire format).
pub fn pcm16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Parses little-endian bytes back into 16-bit PCM samples.
///
/// A trailing odd byte is ignored.
pub fn bytes_to_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Calculates the Root Mean Square (RMS) of float samples.
///
/// Diagnostic only; the transmit decision never depends on it. Returns a
/// value in [0.0, 1.0] for samples within [-1.0, 1.0], where ~0.707 is a
/// full-scale sine wave.
pub fn compute_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let s = sample as f64;
            s * s
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}
