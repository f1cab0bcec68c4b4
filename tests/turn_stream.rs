//! End-to-end scenarios for the turn-segmentation engine.

use turngate::{
    FrameDecision, MockClassifier, SegmenterConfig, SpeechEvent, TurnStream,
};

fn reference_config() -> SegmenterConfig {
    SegmenterConfig {
        threshold: 0.5,
        frame_size: 512,
        sample_rate: 16000,
        silence_frames_to_end_speech: 25,
        speech_pad_frames: 10,
        min_speech_frames: 3,
        ..Default::default()
    }
}

fn frames_of_silence(frames: usize, frame_size: usize) -> Vec<f32> {
    vec![0.0; frames * frame_size]
}

fn event_count(decisions: &[FrameDecision], pred: fn(&SpeechEvent) -> bool) -> usize {
    decisions
        .iter()
        .flat_map(|d| d.events.iter())
        .filter(|e| pred(e))
        .count()
}

#[test]
fn reference_end_to_end_scenario() {
    // 30 frames at 0.1, 5 at 0.9, 25 at 0.05.
    let mut script = vec![0.1f32; 30];
    script.extend(vec![0.9f32; 5]);
    script.extend(vec![0.05f32; 25]);

    let mut stream =
        TurnStream::new(reference_config(), MockClassifier::scripted(script)).unwrap();
    let decisions = stream.push(&frames_of_silence(60, 512)).unwrap();
    assert_eq!(decisions.len(), 60);

    // Leading silence: no transmissions, no events.
    for d in &decisions[..30] {
        assert!(!d.transmit, "frame {} transmitted during idle silence", d.frame);
        assert!(d.events.is_empty());
    }

    // Speech: SpeechStart on the first speech frame, all five transmitted.
    assert_eq!(
        decisions[30].events,
        vec![SpeechEvent::SpeechStart { frame: 30 }]
    );
    for d in &decisions[30..35] {
        assert!(d.transmit, "speech frame {} not transmitted", d.frame);
        assert!(d.payload.is_some());
    }

    // Trailing silence: the first 10 frames are the pad window.
    for d in &decisions[35..45] {
        assert!(d.transmit, "pad frame {} not transmitted", d.frame);
    }
    // The next 14 are dropped but still processed.
    for d in &decisions[45..59] {
        assert!(!d.transmit, "frame {} transmitted past the pad window", d.frame);
        assert!(d.events.is_empty());
    }

    // The 25th trailing silence frame ends the turn, untransmitted.
    let closing = &decisions[59];
    assert!(!closing.transmit);
    assert_eq!(
        closing.events,
        vec![
            SpeechEvent::SpeechEnd { frame: 59 },
            SpeechEvent::TurnComplete { frame: 59 },
        ]
    );

    // Counters add up and the savings reflect 15 transmitted frames of 60.
    let stats = stream.stats();
    assert_eq!(stats.total_frames, 60);
    assert_eq!(stats.speech_frames + stats.silence_frames, stats.total_frames);
    assert_eq!(stats.speech_frames, 5);
    assert_eq!(stats.bytes_received, 60 * 1024);
    assert_eq!(stats.bytes_sent, 15 * 1024);
    assert!((stats.savings_percent - 75.0).abs() < 1e-9);
}

#[test]
fn hysteresis_boundary_one_frame_short() {
    // [silence]*5 + [speech]*3 + [silence]*24 must not complete the turn;
    // one more silence frame completes it exactly once.
    let mut script = vec![0.1f32; 5];
    script.extend(vec![0.9f32; 3]);
    script.extend(vec![0.1f32; 30]);

    let mut stream =
        TurnStream::new(reference_config(), MockClassifier::scripted(script)).unwrap();

    let decisions = stream.push(&frames_of_silence(32, 512)).unwrap();
    assert_eq!(
        event_count(&decisions, |e| matches!(e, SpeechEvent::TurnComplete { .. })),
        0,
        "turn completed a frame early"
    );

    let decisions = stream.push(&frames_of_silence(1, 512)).unwrap();
    assert_eq!(
        event_count(&decisions, |e| matches!(e, SpeechEvent::TurnComplete { .. })),
        1
    );
}

#[test]
fn chunk_partitioning_does_not_change_decisions() {
    let mut script = vec![0.1f32; 4];
    script.extend(vec![0.9f32; 6]);
    script.extend(vec![0.05f32; 30]);

    let config = SegmenterConfig {
        silence_frames_to_end_speech: 8,
        speech_pad_frames: 3,
        ..reference_config()
    };

    // 40 frames of audio delivered in one call...
    let samples = frames_of_silence(40, 512);
    let mut whole =
        TurnStream::new(config.clone(), MockClassifier::scripted(script.clone())).unwrap();
    let whole_decisions = whole.push(&samples).unwrap();

    // ...and the same audio in ragged 1000-sample chunks.
    let mut ragged = TurnStream::new(config, MockClassifier::scripted(script)).unwrap();
    let mut ragged_decisions = Vec::new();
    for chunk in samples.chunks(1000) {
        ragged_decisions.extend(ragged.push(chunk).unwrap());
    }

    assert_eq!(ragged_decisions, whole_decisions);
    assert_eq!(ragged.stats(), whole.stats());
}

#[test]
fn independent_streams_are_bitwise_identical() {
    let mut script = vec![0.2f32; 10];
    script.extend(vec![0.8f32; 7]);
    script.extend(vec![0.3f32; 40]);

    let mut a = TurnStream::new(reference_config(), MockClassifier::scripted(script.clone()))
        .unwrap();
    let mut b =
        TurnStream::new(reference_config(), MockClassifier::scripted(script)).unwrap();

    let samples = frames_of_silence(57, 512);
    let decisions_a = a.push(&samples).unwrap();
    let decisions_b = b.push(&samples).unwrap();

    assert_eq!(decisions_a, decisions_b);
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn short_burst_never_signals_turn_complete() {
    // Two speech frames against min_speech_frames = 3: the burst ends but
    // the backend never sees an utterance boundary.
    let mut script = vec![0.1f32; 2];
    script.extend(vec![0.9f32; 2]);
    script.extend(vec![0.1f32; 30]);

    let mut stream =
        TurnStream::new(reference_config(), MockClassifier::scripted(script)).unwrap();
    let decisions = stream.push(&frames_of_silence(34, 512)).unwrap();

    assert_eq!(
        event_count(&decisions, |e| matches!(e, SpeechEvent::SpeechStart { .. })),
        1
    );
    assert_eq!(
        event_count(&decisions, |e| matches!(e, SpeechEvent::SpeechEnd { .. })),
        1
    );
    assert_eq!(
        event_count(&decisions, |e| matches!(e, SpeechEvent::TurnComplete { .. })),
        0
    );
}

#[test]
fn faulted_frames_count_and_stream_recovers() {
    let script = vec![0.9f32; 10];
    let mock = MockClassifier::scripted(script).with_fault_on([2, 3]);
    let mut stream = TurnStream::new(reference_config(), mock).unwrap();

    let decisions = stream.push(&frames_of_silence(10, 512)).unwrap();
    assert_eq!(decisions[2].probability, 0.0);
    assert_eq!(decisions[3].probability, 0.0);
    // Speech resumes with the preserved state.
    assert!(decisions[4].transmit);

    let stats = stream.stats();
    assert_eq!(stats.classifier_faults, 2);
    assert_eq!(stats.total_frames, 10);
}

#[test]
fn stats_reset_is_independent_of_segmentation_state() {
    let mut stream =
        TurnStream::new(reference_config(), MockClassifier::scripted(vec![0.9])).unwrap();

    stream.push(&frames_of_silence(5, 512)).unwrap();
    assert!(stream.is_speech_active());

    stream.reset_stats();
    assert_eq!(stream.stats().total_frames, 0);
    // The turn in progress is unaffected.
    assert!(stream.is_speech_active());
}
