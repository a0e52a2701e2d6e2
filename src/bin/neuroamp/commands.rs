use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::info;

use neuroamp_dsp::config::Housekeeping;
use neuroamp_dsp::engine::{CpalBackend, ManualBackend};
use neuroamp_dsp::looper::{wav, LoopTrack};
use neuroamp_dsp::params::{find_preset, EffectSettings, FACTORY_PRESETS};
use neuroamp_dsp::sequencing::{Instrument, PatternStore};
use neuroamp_dsp::{Engine, EngineConfig};

use super::{BounceArgs, LiveArgs, ToneArgs};

fn preset_settings(tone: &ToneArgs) -> Result<EffectSettings> {
    find_preset(&tone.preset)
        .map(|p| p.settings)
        .ok_or_else(|| eyre!("no preset named '{}' (try `neuroamp presets`)", tone.preset))
}

pub fn live(args: LiveArgs) -> Result<()> {
    let settings = preset_settings(&args.tone)?;
    let mut engine = Engine::new(EngineConfig::default(), CpalBackend::new());
    engine.start().wrap_err("failed to start audio")?;
    engine.apply_parameters(settings)?;
    engine.set_rhythm_settings(args.tone.rhythm());
    if args.record.is_some() {
        engine.start_recording()?;
    }

    println!("=== neuroamp ===");
    println!("Preset: {}", args.tone.preset);
    println!("Sample rate: {} Hz", engine.sample_rate());
    println!("Running for {:.0} s...", args.seconds);

    let deadline = Instant::now() + Duration::from_secs_f64(args.seconds.max(0.0));
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(500));
        let frame = engine.analysis_frame()?;
        let peak_hz = frame.peak_bin().map(|bin| frame.bin_frequency(bin));
        if args.record.is_some() {
            info!(step = ?engine.current_step(), ?peak_hz, recorded = engine.recorded_seconds(), "playing");
        } else {
            info!(step = ?engine.current_step(), ?peak_hz, "playing");
        }
    }

    if let Some(path) = &args.record {
        let take = engine.stop_recording()?;
        fs::write(path, &take.payload)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        println!("Recorded {:.1} s to {}", take.duration, path.display());
    }

    let stats = engine.stats();
    engine.stop();
    info!(?stats, "session finished");
    Ok(())
}

pub fn bounce(args: BounceArgs) -> Result<()> {
    let settings = preset_settings(&args.tone)?;
    let bytes = fs::read(&args.input)
        .wrap_err_with(|| format!("failed to read {}", args.input.display()))?;
    let clip = wav::decode(&bytes, args.sample_rate)?;

    let tail = (args.tail.max(0.0) * args.sample_rate as f64) as usize;
    let mut input: Vec<f32> = clip
        .left
        .iter()
        .zip(&clip.right)
        .map(|(l, r)| 0.5 * (l + r))
        .collect();
    input.resize(input.len() + tail, 0.0);

    let backend = ManualBackend::new(args.sample_rate);
    let driver = backend.driver();
    let config = EngineConfig::default()
        .sample_rate(args.sample_rate)
        .housekeeping(Housekeeping::Manual);
    let block = ((config.tick_interval * args.sample_rate as f64) as usize).max(1);

    let mut engine = Engine::new(config, backend);
    engine.start()?;
    engine.apply_parameters(settings)?;
    engine.set_rhythm_settings(args.tone.rhythm());
    engine.start_recording()?;

    let mut output = vec![0.0; block * 2];
    for chunk in input.chunks(block) {
        engine.tick()?;
        driver.render(chunk, &mut output[..chunk.len() * 2], 2);
    }
    engine.tick()?;

    let take = engine.stop_recording()?;
    let mix = engine.export_mix(&[LoopTrack::from_take(take, 1)])?;
    fs::write(&args.output, mix)
        .wrap_err_with(|| format!("failed to write {}", args.output.display()))?;

    let stats = engine.stats();
    engine.stop();
    println!(
        "Bounced {:.1} s to {}",
        input.len() as f64 / args.sample_rate as f64,
        args.output.display()
    );
    info!(?stats, "bounce finished");
    Ok(())
}

pub fn list_presets() {
    for preset in &FACTORY_PRESETS {
        let s = &preset.settings;
        println!("{:<20} {}", preset.name, preset.description);
        println!(
            "{:<20} drive {:.2} {:?}, reverb {:.2}, delay {:.2} s",
            "", s.drive, s.drive_model, s.reverb_mix, s.delay_time
        );
    }
}

pub fn list_patterns() {
    let store = PatternStore::new();
    for name in store.list() {
        let Some(pattern) = store.get(&name) else {
            continue;
        };
        let lock = if PatternStore::is_protected(&name) { " (built in)" } else { "" };
        println!("{name}{lock}");
        for instrument in Instrument::ALL {
            println!("  {:<6} {}", format!("{instrument:?}"), pattern.lane_string(instrument));
        }
    }
}
