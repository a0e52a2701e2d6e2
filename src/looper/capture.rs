use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rtrb::Consumer;
use tracing::{debug, info};

use super::wav;
use crate::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => f.write_str("idle"),
            RecordingState::Recording => f.write_str("already recording"),
        }
    }
}

/// A finished recording: a 32-bit float stereo WAV and its length in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Take {
    pub payload: Vec<u8>,
    pub duration: f64,
}

/// Control-side end of the capture ring.
///
/// The callback pushes interleaved stereo from the master bus while the
/// shared flag is up. `drain` moves it into a growable buffer; it is called
/// from housekeeping and once more at stop.
pub struct LoopRecorder {
    rx: Consumer<f32>,
    armed: Arc<AtomicBool>,
    state: RecordingState,
    samples: Vec<f32>,
    sample_rate: u32,
}

impl LoopRecorder {
    pub fn new(rx: Consumer<f32>, armed: Arc<AtomicBool>, sample_rate: u32) -> Self {
        Self {
            rx,
            armed,
            state: RecordingState::Idle,
            samples: Vec::new(),
            sample_rate,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Seconds captured so far.
    pub fn recorded_seconds(&self) -> f64 {
        (self.samples.len() / 2) as f64 / self.sample_rate as f64
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.state == RecordingState::Recording {
            return Err(EngineError::RecordingState(self.state));
        }
        // Anything still queued was pushed after the previous stop
        self.drain();
        self.samples.clear();
        self.state = RecordingState::Recording;
        self.armed.store(true, Ordering::Release);
        info!("recording started");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<Take, EngineError> {
        if self.state == RecordingState::Idle {
            return Err(EngineError::RecordingState(self.state));
        }
        self.armed.store(false, Ordering::Release);
        self.drain();
        self.state = RecordingState::Idle;

        let samples = std::mem::take(&mut self.samples);
        let frames = samples.len() / 2;
        let duration = frames as f64 / self.sample_rate as f64;
        let payload = wav::encode_take(&samples[..frames * 2], self.sample_rate)?;
        info!(duration, "recording stopped");
        Ok(Take { payload, duration })
    }

    /// Empty the ring. Samples are kept only while recording.
    pub fn drain(&mut self) -> usize {
        let available = self.rx.slots();
        if available == 0 {
            return 0;
        }
        let Ok(chunk) = self.rx.read_chunk(available) else {
            return 0;
        };
        if self.state == RecordingState::Recording {
            let (first, second) = chunk.as_slices();
            self.samples.extend_from_slice(first);
            self.samples.extend_from_slice(second);
        } else {
            debug!(available, "discarding stale capture");
        }
        chunk.commit_all();
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    fn recorder() -> (rtrb::Producer<f32>, Arc<AtomicBool>, LoopRecorder) {
        let (tx, rx) = RingBuffer::new(1024);
        let armed = Arc::new(AtomicBool::new(false));
        let recorder = LoopRecorder::new(rx, Arc::clone(&armed), 100);
        (tx, armed, recorder)
    }

    #[test]
    fn test_state_errors_leave_state_alone() {
        let (_tx, _armed, mut rec) = recorder();
        assert!(matches!(
            rec.stop(),
            Err(EngineError::RecordingState(RecordingState::Idle))
        ));
        assert_eq!(rec.state(), RecordingState::Idle);

        rec.start().unwrap();
        assert!(matches!(
            rec.start(),
            Err(EngineError::RecordingState(RecordingState::Recording))
        ));
        assert_eq!(rec.state(), RecordingState::Recording);
    }

    #[test]
    fn test_flag_follows_state() {
        let (_tx, armed, mut rec) = recorder();
        rec.start().unwrap();
        assert!(armed.load(Ordering::Acquire));
        rec.stop().unwrap();
        assert!(!armed.load(Ordering::Acquire));
    }

    #[test]
    fn test_take_holds_captured_frames() {
        let (mut tx, _armed, mut rec) = recorder();
        rec.start().unwrap();
        for i in 0..50 {
            tx.push(i as f32 / 100.0).unwrap();
            tx.push(-(i as f32) / 100.0).unwrap();
        }
        assert_eq!(rec.drain(), 100);
        assert_eq!(rec.recorded_seconds(), 0.5);
        for _ in 0..100 {
            tx.push(0.0).unwrap();
        }
        let take = rec.stop().unwrap();
        assert_eq!(take.duration, 1.0);

        let clip = wav::decode(&take.payload, 100).unwrap();
        assert_eq!(clip.frames(), 100);
        assert_eq!(clip.left[10], 0.1);
        assert_eq!(clip.right[10], -0.1);
    }

    #[test]
    fn test_empty_take_is_zero_length() {
        let (_tx, _armed, mut rec) = recorder();
        rec.start().unwrap();
        let take = rec.stop().unwrap();
        assert_eq!(take.duration, 0.0);
        assert!(wav::decode(&take.payload, 100).unwrap().is_empty());
    }

    #[test]
    fn test_stale_samples_are_not_recorded() {
        let (mut tx, _armed, mut rec) = recorder();
        for _ in 0..20 {
            tx.push(1.0).unwrap();
        }
        rec.start().unwrap();
        let take = rec.stop().unwrap();
        assert_eq!(take.duration, 0.0);
    }

    #[test]
    fn test_state_display() {
        let err = EngineError::RecordingState(RecordingState::Idle);
        assert_eq!(err.to_string(), "recorder is idle");
    }
}
