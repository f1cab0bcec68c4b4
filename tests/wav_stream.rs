//! WAV-driven end-to-end run: a tone bracketed by silence becomes exactly
//! one turn, with the energy-driven mock standing in for a real classifier.

use std::f32::consts::PI;
use turngate::{MockClassifier, SegmenterConfig, SpeechEvent, TurnStream};

const SAMPLE_RATE: u32 = 16_000;

/// Writes 1s silence, 0.5s of a 440Hz tone, 1s silence to a temp WAV file.
fn write_fixture(path: &std::path::Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();

    for _ in 0..SAMPLE_RATE {
        writer.write_sample(0i16).unwrap();
    }
    for i in 0..SAMPLE_RATE / 2 {
        let sample = (i as f32 * 2.0 * PI * 440.0 / SAMPLE_RATE as f32).sin() * 0.4;
        writer.write_sample((sample * 32767.0) as i16).unwrap();
    }
    for _ in 0..SAMPLE_RATE {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn wav_tone_becomes_one_turn() {
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("tone.wav");
    write_fixture(&wav_path);

    let mut reader = hound::WavReader::open(&wav_path).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len() as u32, SAMPLE_RATE * 5 / 2);

    let config = SegmenterConfig {
        threshold: 0.5,
        frame_size: 512,
        sample_rate: SAMPLE_RATE,
        silence_frames_to_end_speech: 10,
        speech_pad_frames: 2,
        min_speech_frames: 3,
        ..Default::default()
    };

    // A 0.4-amplitude sine has RMS ~0.28; gain 3 puts it well above the
    // threshold while silence stays at zero.
    let mut stream = TurnStream::new(config, MockClassifier::energy(3.0)).unwrap();

    // Deliver in uneven chunks, as a capture layer would.
    let mut decisions = Vec::new();
    for chunk in samples.chunks(1600) {
        decisions.extend(stream.push_pcm16(chunk).unwrap());
    }

    let starts = decisions
        .iter()
        .flat_map(|d| d.events.iter())
        .filter(|e| matches!(e, SpeechEvent::SpeechStart { .. }))
        .count();
    let completes = decisions
        .iter()
        .flat_map(|d| d.events.iter())
        .filter(|e| matches!(e, SpeechEvent::TurnComplete { .. }))
        .count();
    assert_eq!(starts, 1, "tone should start exactly one turn");
    assert_eq!(completes, 1, "tone should complete exactly one turn");

    // Most of the file is silence: well over half the bytes stay local.
    let stats = stream.stats();
    assert!(stats.speech_frames > 10 && stats.speech_frames < 25);
    assert!(
        stats.savings_percent > 50.0,
        "expected majority savings, got {}",
        stats.savings_percent
    );
    assert_eq!(
        stats.speech_frames + stats.silence_frames,
        stats.total_frames
    );
}
