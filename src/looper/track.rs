use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::capture::Take;
use crate::dsp::mix;

/// Varispeed playback rate of a layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackSpeed {
    Half,
    #[default]
    Normal,
    Double,
}

impl PlaybackSpeed {
    pub fn ratio(self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
        }
    }
}

/// One recorded layer in the loop station.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LoopTrack {
    /// Milliseconds since the Unix epoch at creation, bumped if needed so
    /// two tracks never share one.
    pub id: u64,
    /// WAV bytes as produced by the recorder.
    pub payload: Vec<u8>,
    pub duration: f64,
    pub volume: f32,
    pub is_muted: bool,
    pub is_solo: bool,
    pub name: String,
    pub timestamp: SystemTime,
    /// Balance: -1 is hard left, 0 leaves both sides at unity.
    pub pan: f32,
    pub reversed: bool,
    pub speed: PlaybackSpeed,
}

static LAST_ID: AtomicU64 = AtomicU64::new(0);

fn next_id(now: SystemTime) -> u64 {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let id = millis.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, id, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return id,
            Err(seen) => last = seen,
        }
    }
}

impl LoopTrack {
    /// Wrap a finished take as layer number `layer` (1-based, used for the
    /// default name).
    pub fn from_take(take: Take, layer: usize) -> Self {
        let timestamp = SystemTime::now();
        Self {
            id: next_id(timestamp),
            payload: take.payload,
            duration: take.duration,
            volume: 1.0,
            is_muted: false,
            is_solo: false,
            name: format!("Loop Layer {layer}"),
            timestamp,
            pan: 0.0,
            reversed: false,
            speed: PlaybackSpeed::Normal,
        }
    }

    /// Audible given whether any track in the set is soloed.
    pub fn is_audible(&self, any_solo: bool) -> bool {
        if any_solo {
            self.is_solo
        } else {
            !self.is_muted
        }
    }

    /// Per-side gains for the balance control.
    pub fn pan_gains(&self) -> (f32, f32) {
        mix::balance_gains(self.pan)
    }

    /// Seconds this layer lasts once speed is applied.
    pub fn playback_duration(&self) -> f64 {
        self.duration / self.speed.ratio()
    }
}

/// The tracks that would be heard right now, in insertion order.
///
/// Any solo wins: once one track is soloed, only soloed tracks play and
/// their own mute flags are ignored.
pub fn audible_subset(tracks: &[LoopTrack]) -> Vec<&LoopTrack> {
    let any_solo = tracks.iter().any(|t| t.is_solo);
    tracks.iter().filter(|t| t.is_audible(any_solo)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str) -> LoopTrack {
        let mut track = LoopTrack::from_take(
            Take {
                payload: Vec::new(),
                duration: 1.0,
            },
            1,
        );
        track.name = name.to_string();
        track
    }

    fn names(tracks: &[&LoopTrack]) -> Vec<String> {
        tracks.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn test_solo_overrides_mute() {
        let a = track("A");
        let b = LoopTrack {
            is_solo: true,
            ..track("B")
        };
        let c = LoopTrack {
            is_muted: true,
            ..track("C")
        };
        let tracks = [a, b, c];
        assert_eq!(names(&audible_subset(&tracks)), vec!["B"]);
    }

    #[test]
    fn test_soloed_track_plays_even_if_muted() {
        let a = LoopTrack {
            is_solo: true,
            is_muted: true,
            ..track("A")
        };
        let b = track("B");
        let tracks = [a, b];
        assert_eq!(names(&audible_subset(&tracks)), vec!["A"]);
    }

    #[test]
    fn test_without_solo_mute_decides() {
        let a = track("A");
        let b = LoopTrack {
            is_muted: true,
            ..track("B")
        };
        let tracks = [a, b];
        assert_eq!(names(&audible_subset(&tracks)), vec!["A"]);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let first = track("A");
        let second = track("B");
        assert!(second.id > first.id);
        assert_eq!(first.name, "A");
        assert_eq!(track("x").speed, PlaybackSpeed::Normal);
    }

    #[test]
    fn test_balance_keeps_centre_at_unity() {
        let mut t = track("A");
        assert_eq!(t.pan_gains(), (1.0, 1.0));
        t.pan = -1.0;
        assert_eq!(t.pan_gains(), (1.0, 0.0));
        t.pan = 0.5;
        assert_eq!(t.pan_gains(), (0.5, 1.0));
        t.pan = f32::NAN;
        assert_eq!(t.pan_gains(), (1.0, 1.0));
    }

    #[test]
    fn test_speed_changes_playback_length() {
        let mut t = track("A");
        t.speed = PlaybackSpeed::Half;
        assert_eq!(t.playback_duration(), 2.0);
        t.speed = PlaybackSpeed::Double;
        assert_eq!(t.playback_duration(), 0.5);
    }
}
