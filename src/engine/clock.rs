use std::sync::atomic::{AtomicU64, Ordering};

/// Frames rendered since the stream started, published by the callback.
///
/// The housekeeping thread reads it to know where "now" is on the audio
/// timeline; drum hits are stamped against the same count.
#[derive(Debug)]
pub struct AudioClock {
    frames: AtomicU64,
    sample_rate: u32,
}

impl AudioClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub(crate) fn publish(&self, frames: u64) {
        self.frames.store(frames, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_follow_frames() {
        let clock = AudioClock::new(48_000);
        assert_eq!(clock.seconds(), 0.0);
        clock.publish(24_000);
        assert_eq!(clock.frames(), 24_000);
        assert_eq!(clock.seconds(), 0.5);
    }
}
