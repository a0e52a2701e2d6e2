//! Engine configuration.
//!
//! ```
//! use neuroamp_dsp::EngineConfig;
//!
//! let config = EngineConfig::default().sample_rate(44_100).lookahead(0.2);
//! assert_eq!(config.sample_rate, 44_100);
//! assert_eq!(config.tick_interval, 0.025);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::analysis::{DEFAULT_FFT_SIZE, DEFAULT_SMOOTHING};
use crate::sequencing::SchedulerTiming;
use crate::DEFAULT_SAMPLE_RATE;

/// Who calls [`Engine::tick`](crate::Engine::tick).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Housekeeping {
    /// A background thread ticks every `tick_interval`.
    #[default]
    Thread,
    /// The caller ticks. Used for offline rendering and tests.
    Manual,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Requested rate. Backends with a fixed device rate override it.
    pub sample_rate: u32,
    /// Seconds of drum hits scheduled ahead of the audio clock.
    pub lookahead: f64,
    /// Seconds between housekeeping ticks.
    pub tick_interval: f64,
    /// Gap between pressing play and the first step.
    pub start_offset: f64,
    pub fft_size: usize,
    pub analysis_smoothing: f32,
    /// Capture ring length in seconds of stereo audio.
    pub capture_seconds: f64,
    /// Silence queued between input and output streams to absorb jitter.
    pub input_latency: f64,
    pub housekeeping: Housekeeping,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            lookahead: 0.1,
            tick_interval: 0.025,
            start_offset: 0.025,
            fft_size: DEFAULT_FFT_SIZE,
            analysis_smoothing: DEFAULT_SMOOTHING,
            capture_seconds: 2.0,
            input_latency: 0.01,
            housekeeping: Housekeeping::Thread,
        }
    }
}

impl EngineConfig {
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn lookahead(mut self, seconds: f64) -> Self {
        self.lookahead = seconds;
        self
    }

    pub fn tick_interval(mut self, seconds: f64) -> Self {
        self.tick_interval = seconds;
        self
    }

    pub fn start_offset(mut self, seconds: f64) -> Self {
        self.start_offset = seconds;
        self
    }

    pub fn fft_size(mut self, size: usize) -> Self {
        self.fft_size = size;
        self
    }

    pub fn analysis_smoothing(mut self, smoothing: f32) -> Self {
        self.analysis_smoothing = smoothing;
        self
    }

    pub fn capture_seconds(mut self, seconds: f64) -> Self {
        self.capture_seconds = seconds;
        self
    }

    pub fn input_latency(mut self, seconds: f64) -> Self {
        self.input_latency = seconds;
        self
    }

    pub fn housekeeping(mut self, housekeeping: Housekeeping) -> Self {
        self.housekeeping = housekeeping;
        self
    }

    /// Scheduler timing at the rate the backend actually runs.
    pub(crate) fn scheduler_timing(&self, sample_rate: u32) -> SchedulerTiming {
        SchedulerTiming {
            sample_rate,
            lookahead: self.lookahead.max(0.0),
            start_offset: self.start_offset.max(0.0),
        }
    }

    /// Capture ring length in samples (interleaved stereo).
    pub(crate) fn capture_capacity(&self, sample_rate: u32) -> usize {
        ((self.capture_seconds.max(0.1) * sample_rate as f64) as usize * 2).max(2 * crate::MAX_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = EngineConfig::default()
            .sample_rate(44_100)
            .fft_size(1024)
            .housekeeping(Housekeeping::Manual);
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.fft_size, 1024);
        assert_eq!(config.housekeeping, Housekeeping::Manual);
        assert_eq!(config.lookahead, 0.1);
    }

    #[test]
    fn test_capture_ring_holds_whole_blocks() {
        let config = EngineConfig::default().capture_seconds(0.0);
        assert!(config.capture_capacity(48_000) >= 2 * crate::MAX_BLOCK_SIZE);
        assert_eq!(
            EngineConfig::default().capture_capacity(48_000),
            2 * 48_000 * 2
        );
    }
}
