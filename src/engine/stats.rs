use std::sync::atomic::{AtomicU64, Ordering};

/// Counters bumped from the audio callback.
///
/// Relaxed atomics only: the realtime side never waits on them and the
/// housekeeping side only reads snapshots.
#[derive(Debug, Default)]
pub struct RealtimeStats {
    input_underruns: AtomicU64,
    capture_overflows: AtomicU64,
    analysis_drops: AtomicU64,
    late_triggers: AtomicU64,
    dropped_triggers: AtomicU64,
    stream_errors: AtomicU64,
}

macro_rules! counter {
    ($bump:ident, $field:ident) => {
        #[inline]
        pub fn $bump(&self, n: u64) {
            if n > 0 {
                self.$field.fetch_add(n, Ordering::Relaxed);
            }
        }
    };
}

impl RealtimeStats {
    pub fn new() -> Self {
        Self::default()
    }

    counter!(add_input_underruns, input_underruns);
    counter!(add_capture_overflows, capture_overflows);
    counter!(add_analysis_drops, analysis_drops);
    counter!(add_late_triggers, late_triggers);
    counter!(add_dropped_triggers, dropped_triggers);
    counter!(add_stream_errors, stream_errors);

    pub fn snapshot(&self) -> RealtimeCounts {
        RealtimeCounts {
            input_underruns: self.input_underruns.load(Ordering::Relaxed),
            capture_overflows: self.capture_overflows.load(Ordering::Relaxed),
            analysis_drops: self.analysis_drops.load(Ordering::Relaxed),
            late_triggers: self.late_triggers.load(Ordering::Relaxed),
            dropped_triggers: self.dropped_triggers.load(Ordering::Relaxed),
            stream_errors: self.stream_errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealtimeCounts {
    /// Output frames rendered with no captured input available.
    pub input_underruns: u64,
    /// Capture blocks lost because the recorder fell behind.
    pub capture_overflows: u64,
    pub analysis_drops: u64,
    /// Drum hits that arrived after their scheduled frame.
    pub late_triggers: u64,
    /// Drum hits lost because the trigger ring was full.
    pub dropped_triggers: u64,
    pub stream_errors: u64,
}

/// Everything the engine counts, realtime and control side together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub realtime: RealtimeCounts,
    /// Parameter updates superseded before the audio thread saw them.
    pub dropped_updates: u64,
    /// Sequencer steps whose time had already passed when scheduled.
    pub skipped_steps: u64,
}
