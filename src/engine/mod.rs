/*
Engine
======

Session object wiring every part together around one audio backend.

  control side (caller + housekeeping)           audio callback
  ────────────────────────────────────           ──────────────
  apply_parameters ─▶ GraphController ─ ring ─▶ GraphInbox ─┐
  set_rhythm_settings ─▶ RhythmSequencer ─ ring ─▶ DrumBus   ├─ SignalGraph
  analysis_frame ◀─ Analyser ◀───────────── ring ── Analyser │
  stop_recording ◀─ LoopRecorder ◀───────── ring ── Capture ─┘
                       ▲
                       └── AudioClock (frames rendered)

Lifecycle: new → start → operate → stop. `start` acquires the backend, builds
the graph at the backend's rate and moves the realtime half into it. While
running, a housekeeping thread ticks every `tick_interval`: flushes pending
parameter updates, drains capture, refreshes analysis and schedules drum hits
up to `lookahead` ahead of the audio clock.

Pattern editing and rhythm settings work before `start`; everything that
needs the graph returns `NotStarted` until then.
*/

pub mod backend;
pub mod clock;
pub mod cpal_backend;
pub mod realtime;
pub mod stats;

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rtrb::{Producer, RingBuffer};
use tracing::{debug, info, warn};

pub use backend::{AudioBackend, ManualBackend, ManualDriver};
pub use clock::AudioClock;
pub use cpal_backend::CpalBackend;
pub use realtime::RealtimeProcessor;
pub use stats::{EngineStats, RealtimeCounts, RealtimeStats};

use crate::config::{EngineConfig, Housekeeping};
use crate::curve::{ImpulseResponse, TransferCurve};
use crate::graph::{graph_channel, AnalysisFrame, Analyser, GraphController, SignalGraph, StageTargets};
use crate::looper::{self, LoopRecorder, LoopTrack, MixdownOptions, RecordingState, Take};
use crate::params::{EffectSettings, RhythmSettings};
use crate::sequencing::{DrumPattern, DrumTrigger, PatternStore, RhythmSequencer, TRIGGER_CAPACITY};
use crate::voices::DrumBus;
use crate::EngineError;

use self::realtime::BusTaps;

/// Control-side ends of one running session.
struct Session {
    controller: GraphController,
    analyser: Analyser,
    recorder: LoopRecorder,
    clock: Arc<AudioClock>,
}

/// State shared between the caller and the housekeeping thread.
struct Control {
    sequencer: RhythmSequencer,
    session: Option<Session>,
    reported_stream_errors: u64,
}

impl Control {
    fn tick(&mut self, stats: &RealtimeStats) -> usize {
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        session.controller.flush();
        if session.controller.has_pending() {
            debug!("graph inbox full, parameter update deferred");
        }
        session.recorder.drain();
        session.analyser.refresh();
        let pushed = self.sequencer.tick(session.clock.seconds());

        let errors = stats.snapshot().stream_errors;
        if errors > self.reported_stream_errors {
            warn!(new = errors - self.reported_stream_errors, "audio stream errors");
            self.reported_stream_errors = errors;
        }
        pushed
    }
}

fn lock(control: &Mutex<Control>) -> MutexGuard<'_, Control> {
    control.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Housekeeper {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Housekeeper {
    fn spawn(
        control: Arc<Mutex<Control>>,
        stats: Arc<RealtimeStats>,
        interval: Duration,
    ) -> Result<Self, EngineError> {
        let (stop, stopped) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("neuroamp-housekeeping".into())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        lock(&control).tick(&stats);
                    }
                    _ => break,
                }
            })
            .map_err(|e| EngineError::DeviceUnavailable(format!("housekeeping thread: {e}")))?;
        Ok(Self { stop, handle })
    }

    fn join(self) {
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            warn!("housekeeping thread panicked");
        }
    }
}

/// A realtime effects session.
///
/// ```
/// use neuroamp_dsp::config::Housekeeping;
/// use neuroamp_dsp::engine::ManualBackend;
/// use neuroamp_dsp::params::EffectSettings;
/// use neuroamp_dsp::{Engine, EngineConfig, EngineError};
///
/// let config = EngineConfig::default().housekeeping(Housekeeping::Manual);
/// let mut engine = Engine::new(config, ManualBackend::new(48_000));
///
/// assert!(matches!(
///     engine.apply_parameters(EffectSettings::default()),
///     Err(EngineError::NotStarted)
/// ));
/// engine.start().unwrap();
/// engine.apply_parameters(EffectSettings { drive: 0.4, ..Default::default() }).unwrap();
/// engine.stop();
/// ```
pub struct Engine {
    config: EngineConfig,
    backend: Box<dyn AudioBackend>,
    stats: Arc<RealtimeStats>,
    control: Arc<Mutex<Control>>,
    housekeeper: Option<Housekeeper>,
    settings: EffectSettings,
    /// Rate of the running session, `None` while stopped.
    running_rate: Option<u32>,
    retired_dropped_updates: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, backend: impl AudioBackend + 'static) -> Self {
        Self::with_patterns(config, backend, PatternStore::new())
    }

    /// Start from a pattern store restored elsewhere.
    pub fn with_patterns(
        config: EngineConfig,
        backend: impl AudioBackend + 'static,
        store: PatternStore,
    ) -> Self {
        let stats = Arc::new(RealtimeStats::new());
        let timing = config.scheduler_timing(config.sample_rate);
        let sequencer = RhythmSequencer::detached(store, timing, Arc::clone(&stats));
        Self {
            config,
            backend: Box::new(backend),
            stats,
            control: Arc::new(Mutex::new(Control {
                sequencer,
                session: None,
                reported_stream_errors: 0,
            })),
            housekeeper: None,
            settings: EffectSettings::default(),
            running_rate: None,
            retired_dropped_updates: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running_rate.is_some()
    }

    /// Rate of the running session, or the configured rate while stopped.
    pub fn sample_rate(&self) -> u32 {
        self.running_rate.unwrap_or(self.config.sample_rate)
    }

    /// Acquire the backend and start processing. Starting a running engine
    /// does nothing.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.is_running() {
            debug!("engine already running");
            return Ok(());
        }

        let sample_rate = self.backend.acquire(&self.config)?;
        let (processor, session, triggers) = self.build_session(sample_rate);
        if let Err(err) = self.backend.launch(processor, &self.config) {
            self.backend.halt();
            return Err(err);
        }

        {
            let mut control = lock(&self.control);
            let timing = self.config.scheduler_timing(sample_rate);
            control.sequencer.attach(triggers, timing, 0.0);
            control.session = Some(session);
        }
        self.running_rate = Some(sample_rate);

        if self.config.housekeeping == Housekeeping::Thread {
            let interval = Duration::from_secs_f64(self.config.tick_interval.max(0.001));
            match Housekeeper::spawn(Arc::clone(&self.control), Arc::clone(&self.stats), interval) {
                Ok(housekeeper) => self.housekeeper = Some(housekeeper),
                Err(err) => {
                    self.stop();
                    return Err(err);
                }
            }
        }

        info!(sample_rate, "engine started");
        Ok(())
    }

    fn build_session(&self, sample_rate: u32) -> (RealtimeProcessor, Session, Producer<DrumTrigger>) {
        let targets = StageTargets::from_settings(&self.settings);
        let curve = Box::new(TransferCurve::build(&targets.curve));
        let impulse = ImpulseResponse::synthesize(sample_rate);

        let (triggers, trigger_rx) = RingBuffer::new(TRIGGER_CAPACITY);
        let drums = DrumBus::new(trigger_rx, Arc::clone(&self.stats));
        let graph = SignalGraph::new(sample_rate as f32, &impulse, &targets, curve, drums);
        let (controller, inbox) = graph_channel(targets.curve);

        let fft_size = self.config.fft_size;
        let (analysis_tx, analysis_rx) =
            RingBuffer::new((fft_size * 2).max(sample_rate as usize / 2));
        let (capture_tx, capture_rx) = RingBuffer::new(self.config.capture_capacity(sample_rate));
        let armed = Arc::new(AtomicBool::new(false));
        let clock = Arc::new(AudioClock::new(sample_rate));

        let taps = BusTaps {
            capture: capture_tx,
            analysis: analysis_tx,
            armed: Arc::clone(&armed),
        };
        let processor =
            RealtimeProcessor::new(graph, inbox, taps, Arc::clone(&clock), Arc::clone(&self.stats));
        let session = Session {
            controller,
            analyser: Analyser::new(
                analysis_rx,
                fft_size,
                self.config.analysis_smoothing,
                sample_rate,
            ),
            recorder: LoopRecorder::new(capture_rx, armed, sample_rate),
            clock,
        };
        (processor, session, triggers)
    }

    /// Stop processing and release the backend. An unfinished recording is
    /// discarded. Stopping a stopped engine does nothing.
    pub fn stop(&mut self) {
        if self.running_rate.take().is_none() {
            return;
        }
        if let Some(housekeeper) = self.housekeeper.take() {
            housekeeper.join();
        }
        self.backend.halt();

        let mut control = lock(&self.control);
        control.sequencer.detach();
        if let Some(session) = control.session.take() {
            self.retired_dropped_updates += session.controller.dropped_updates();
            if session.recorder.state() == RecordingState::Recording {
                info!("unfinished recording discarded");
            }
        }
        info!("engine stopped");
    }

    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut Session) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut control = lock(&self.control);
        let session = control.session.as_mut().ok_or(EngineError::NotStarted)?;
        f(session)
    }

    /// Hand new settings to the graph. Every numeric target glides there
    /// over the smoothing time.
    pub fn apply_parameters(&mut self, settings: EffectSettings) -> Result<(), EngineError> {
        let settings = settings.clamped();
        self.with_session(|session| {
            session.controller.apply(&settings);
            Ok(())
        })?;
        self.settings = settings;
        Ok(())
    }

    /// Settings most recently applied.
    pub fn parameters(&self) -> EffectSettings {
        self.settings
    }

    pub fn set_rhythm_settings(&self, settings: RhythmSettings) {
        let mut control = lock(&self.control);
        let now = control
            .session
            .as_ref()
            .map_or(0.0, |session| session.clock.seconds());
        control.sequencer.set_settings(settings, now);
    }

    pub fn rhythm_settings(&self) -> RhythmSettings {
        lock(&self.control).sequencer.settings().clone()
    }

    /// Index of the last scheduled step, for transport display.
    pub fn current_step(&self) -> Option<usize> {
        lock(&self.control).sequencer.current_step()
    }

    /// Seconds of audio rendered by the running session.
    pub fn position(&self) -> Result<f64, EngineError> {
        self.with_session(|session| Ok(session.clock.seconds()))
    }

    /// Latest spectrum and waveform of the output bus.
    pub fn analysis_frame(&self) -> Result<AnalysisFrame, EngineError> {
        self.with_session(|session| {
            session.analyser.refresh();
            Ok(session.analyser.frame().clone())
        })
    }

    pub fn list_patterns(&self) -> Vec<String> {
        lock(&self.control).sequencer.store().list()
    }

    pub fn get_pattern(&self, name: &str) -> Option<Arc<DrumPattern>> {
        lock(&self.control).sequencer.store().get(name)
    }

    pub fn save_pattern(&self, name: &str, pattern: DrumPattern) -> Result<(), EngineError> {
        lock(&self.control).sequencer.save_pattern(name, pattern)
    }

    pub fn delete_pattern(&self, name: &str) -> Result<(), EngineError> {
        lock(&self.control).sequencer.delete_pattern(name)
    }

    /// Replace what is playing without saving it.
    pub fn update_live_pattern(&self, pattern: DrumPattern) -> Result<(), EngineError> {
        lock(&self.control).sequencer.update_live_pattern(pattern)
    }

    pub fn live_pattern(&self) -> Arc<DrumPattern> {
        lock(&self.control).sequencer.live_pattern()
    }

    /// User patterns as JSON, for an external persistence layer.
    #[cfg(feature = "serde")]
    pub fn patterns_json(&self) -> Result<String, EngineError> {
        lock(&self.control).sequencer.store().to_json()
    }

    pub fn start_recording(&self) -> Result<(), EngineError> {
        self.with_session(|session| session.recorder.start())
    }

    pub fn stop_recording(&self) -> Result<Take, EngineError> {
        self.with_session(|session| session.recorder.stop())
    }

    pub fn recording_state(&self) -> RecordingState {
        lock(&self.control)
            .session
            .as_ref()
            .map_or(RecordingState::Idle, |session| session.recorder.state())
    }

    /// Seconds captured by the current recording, 0 when idle or stopped.
    pub fn recorded_seconds(&self) -> f64 {
        lock(&self.control)
            .session
            .as_ref()
            .map_or(0.0, |session| session.recorder.recorded_seconds())
    }

    /// Bounce the audible tracks to a 16-bit stereo WAV at the engine rate.
    pub fn export_mix(&self, tracks: &[LoopTrack]) -> Result<Vec<u8>, EngineError> {
        looper::export_mix(tracks, self.sample_rate())
    }

    pub fn export_mix_with(
        &self,
        tracks: &[LoopTrack],
        options: MixdownOptions,
    ) -> Result<Vec<u8>, EngineError> {
        looper::export_mix_with(tracks, self.sample_rate(), options)
    }

    /// [`export_mix_with`](Self::export_mix_with) on a worker thread.
    pub fn spawn_export(
        &self,
        tracks: Vec<LoopTrack>,
        options: MixdownOptions,
    ) -> JoinHandle<Result<Vec<u8>, EngineError>> {
        looper::spawn_export(tracks, self.sample_rate(), options)
    }

    pub fn stats(&self) -> EngineStats {
        let control = lock(&self.control);
        let live_updates = control
            .session
            .as_ref()
            .map_or(0, |session| session.controller.dropped_updates());
        EngineStats {
            realtime: self.stats.snapshot(),
            dropped_updates: self.retired_dropped_updates + live_updates,
            skipped_steps: control.sequencer.skipped_steps(),
        }
    }

    /// Run one housekeeping pass now. Returns the drum hits scheduled.
    ///
    /// With [`Housekeeping::Manual`] this is the only way the sequencer,
    /// recorder and parameter queue make progress.
    pub fn tick(&self) -> Result<usize, EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotStarted);
        }
        Ok(lock(&self.control).tick(&self.stats))
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DriveModel;

    fn manual() -> (Engine, ManualDriver) {
        let backend = ManualBackend::new(48_000);
        let driver = backend.driver();
        let config = EngineConfig::default().housekeeping(Housekeeping::Manual);
        (Engine::new(config, backend), driver)
    }

    #[test]
    fn test_graph_operations_need_start() {
        let (engine, _driver) = manual();
        assert!(matches!(engine.tick(), Err(EngineError::NotStarted)));
        assert!(matches!(engine.analysis_frame(), Err(EngineError::NotStarted)));
        assert!(matches!(engine.start_recording(), Err(EngineError::NotStarted)));
        assert!(matches!(engine.stop_recording(), Err(EngineError::NotStarted)));
        assert_eq!(engine.recording_state(), RecordingState::Idle);
    }

    #[test]
    fn test_rejected_parameters_leave_settings_alone() {
        let (mut engine, _driver) = manual();
        let quiet = EffectSettings {
            output_volume: 0.1,
            ..EffectSettings::default()
        };
        assert!(engine.apply_parameters(quiet).is_err());
        assert_eq!(engine.parameters(), EffectSettings::default());
    }

    #[test]
    fn test_unavailable_device_fails_start() {
        let backend = ManualBackend::unavailable(48_000);
        let mut engine = Engine::new(EngineConfig::default(), backend);
        assert!(matches!(
            engine.start(),
            Err(EngineError::DeviceUnavailable(_))
        ));
        assert!(!engine.is_running());
    }

    #[test]
    fn test_start_twice_is_a_no_op() {
        let (mut engine, driver) = manual();
        engine.start().unwrap();
        engine.start().unwrap();
        assert!(driver.is_running());
        engine.stop();
        assert!(!driver.is_running());
        engine.stop();
    }

    #[test]
    fn test_parameters_are_clamped_and_kept() {
        let (mut engine, _driver) = manual();
        engine.start().unwrap();
        engine
            .apply_parameters(EffectSettings {
                drive: 3.0,
                drive_model: DriveModel::Fuzz,
                ..EffectSettings::default()
            })
            .unwrap();
        assert_eq!(engine.parameters().drive, 1.0);
    }

    #[test]
    fn test_clock_advances_with_rendering() {
        let (mut engine, driver) = manual();
        engine.start().unwrap();
        let input = vec![0.0; 4_800];
        let mut output = vec![0.0; 9_600];
        assert_eq!(driver.render(&input, &mut output, 2), 4_800);
        assert!((engine.position().unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_restart_keeps_patterns_and_stats() {
        let (mut engine, driver) = manual();
        let pattern = DrumPattern::empty(16).unwrap();
        engine.save_pattern("sparse", pattern.clone()).unwrap();

        engine.start().unwrap();
        let mut output = vec![0.0; 200];
        driver.render(&[], &mut output, 2);
        engine.stop();
        let underruns = engine.stats().realtime.input_underruns;
        assert_eq!(underruns, 100);

        engine.start().unwrap();
        assert_eq!(engine.get_pattern("sparse").as_deref(), Some(&pattern));
        assert_eq!(engine.stats().realtime.input_underruns, underruns);
    }
}
