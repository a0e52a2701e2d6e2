use neuroamp_dsp::config::Housekeeping;
use neuroamp_dsp::engine::{ManualBackend, ManualDriver};
use neuroamp_dsp::looper::{LoopTrack, RecordingState};
use neuroamp_dsp::params::{EffectSettings, InputMode, RhythmSettings};
use neuroamp_dsp::sequencing::DrumPattern;
use neuroamp_dsp::{Engine, EngineConfig, EngineError};

const SR: u32 = 48_000;
/// Frames per housekeeping tick in these tests: 0.1 s.
const BLOCK: usize = 4_800;

fn session() -> (Engine, ManualDriver) {
    let backend = ManualBackend::new(SR);
    let driver = backend.driver();
    let config = EngineConfig::default().housekeeping(Housekeeping::Manual);
    (Engine::new(config, backend), driver)
}

fn sine(freq: f32, frames: usize, offset: usize) -> Vec<f32> {
    (offset..offset + frames)
        .map(|i| (i as f32 * 2.0 * std::f32::consts::PI * freq / SR as f32).sin() * 0.5)
        .collect()
}

#[test]
fn drums_land_on_the_scheduled_frame() {
    let (mut engine, driver) = session();
    engine
        .update_live_pattern(
            DrumPattern::from_strings(
                "x... x... x... x...",
                ".... .... .... ....",
                ".... .... .... ....",
            )
            .unwrap(),
        )
        .unwrap();
    engine.set_rhythm_settings(RhythmSettings {
        is_playing: true,
        ..RhythmSettings::default()
    });
    engine.start().unwrap();

    let silence = vec![0.0; BLOCK];
    let mut first = vec![0.0; BLOCK * 2];
    let mut scratch = vec![0.0; BLOCK * 2];
    let mut pushed = 0;
    for block in 0..10 {
        pushed += engine.tick().unwrap();
        let output = if block == 0 { &mut first } else { &mut scratch };
        assert_eq!(driver.render(&silence, output, 2), BLOCK);
    }

    // 120 bpm sixteenths from 0.025 s: steps 0..=7 fall inside the last horizon
    assert_eq!(pushed, 2);
    assert_eq!(engine.current_step(), Some(7));
    assert_eq!(engine.stats().skipped_steps, 0);

    // Step 0 starts at frame 1200
    let onset = 1_200;
    let before = first[..onset * 2].iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let after = first[onset * 2..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(before < 1e-4, "output before the hit: {before}");
    assert!(after > 0.01, "hit too quiet: {after}");
    assert_eq!(engine.stats().realtime.late_triggers, 0);
}

#[test]
fn recorded_take_bounces_to_wav() {
    let (mut engine, driver) = session();
    engine.start().unwrap();
    engine.start_recording().unwrap();
    assert_eq!(engine.recording_state(), RecordingState::Recording);
    assert!(matches!(
        engine.start_recording(),
        Err(EngineError::RecordingState(_))
    ));

    let mut output = vec![0.0; BLOCK * 2];
    for block in 0..5 {
        engine.tick().unwrap();
        driver.render(&sine(220.0, BLOCK, block * BLOCK), &mut output, 2);
    }

    engine.tick().unwrap();
    assert!((engine.recorded_seconds() - 0.5).abs() < 1e-6);

    let take = engine.stop_recording().unwrap();
    assert_eq!(engine.recording_state(), RecordingState::Idle);
    assert_eq!(engine.recorded_seconds(), 0.0);
    assert!((take.duration - 0.5).abs() < 1e-6, "{}", take.duration);
    assert_eq!(engine.stats().realtime.capture_overflows, 0);

    let track = LoopTrack::from_take(take, 1);
    assert_eq!(track.name, "Loop Layer 1");
    let wav = engine.export_mix(&[track]).unwrap();

    let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_rate, SR);
    let samples: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), BLOCK * 5 * 2);
    assert!(samples.iter().any(|s| s.unsigned_abs() > 300));
}

#[test]
fn analysis_tracks_the_input_pitch() {
    let (mut engine, driver) = session();
    engine.start().unwrap();
    engine
        .apply_parameters(EffectSettings {
            input_mode: InputMode::Vocal,
            reverb_mix: 0.0,
            ..EffectSettings::default()
        })
        .unwrap();

    let mut output = vec![0.0; BLOCK * 2];
    for block in 0..5 {
        engine.tick().unwrap();
        driver.render(&sine(440.0, BLOCK, block * BLOCK), &mut output, 2);
    }

    let frame = engine.analysis_frame().unwrap();
    assert_eq!(frame.frequency_db.len(), 1_024);
    assert_eq!(frame.time_domain.len(), 2_048);
    let peak = frame.bin_frequency(frame.peak_bin().unwrap());
    assert!((peak - 440.0).abs() < 30.0, "peak at {peak} Hz");
}

#[test]
fn stopped_engine_still_edits_patterns() {
    let (mut engine, _driver) = session();
    let groove = DrumPattern::from_strings(
        "x.x. x.x. x.x. x.x.",
        "..x. ..x. ..x. ..x.",
        "xxxx xxxx xxxx xxxx",
    )
    .unwrap();
    let before = engine.list_patterns();
    assert!(matches!(
        DrumPattern::from_strings("x", ".", "x"),
        Err(EngineError::InvalidPattern(_))
    ));
    assert!(matches!(
        DrumPattern::empty(8),
        Err(EngineError::InvalidPattern(_))
    ));
    assert_eq!(engine.list_patterns(), before);
    engine.save_pattern("groove", groove.clone()).unwrap();
    engine.set_rhythm_settings(RhythmSettings {
        pattern: "groove".to_string(),
        ..RhythmSettings::default()
    });
    assert_eq!(*engine.live_pattern(), groove);

    assert!(matches!(
        engine.delete_pattern("metronome"),
        Err(EngineError::PatternProtected(_))
    ));
    assert!(matches!(engine.position(), Err(EngineError::NotStarted)));

    engine.start().unwrap();
    engine.stop();
    assert!(engine.list_patterns().contains(&"groove".to_string()));
    assert!(matches!(engine.tick(), Err(EngineError::NotStarted)));
}

#[test]
fn empty_take_is_still_a_wav() {
    let (mut engine, _driver) = session();
    engine.start().unwrap();
    engine.start_recording().unwrap();
    let take = engine.stop_recording().unwrap();
    assert_eq!(take.duration, 0.0);

    let reader = hound::WavReader::new(std::io::Cursor::new(take.payload)).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.len(), 0);
    assert!(matches!(
        engine.stop_recording(),
        Err(EngineError::RecordingState(RecordingState::Idle))
    ));
}
