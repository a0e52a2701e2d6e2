/*
Offline Mixdown
===============

Bounces the audible layers into one stereo file.

    for each audible track:
        decode payload → reverse? → varispeed → volume × balance
    output length = longest processed track
    shorter tracks: loop (like live playback) or fall silent after one pass
    clip to [-1, 1] → 16-bit PCM WAV

Runs on whatever thread calls it; `spawn_export` moves it to a worker.
*/

use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use super::track::{audible_subset, LoopTrack};
use super::wav::{self, StereoClip};
use crate::dsp;
use crate::EngineError;

/// What a track shorter than the mix does after it ends.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TailMode {
    #[default]
    Loop,
    Silence,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixdownOptions {
    pub tail: TailMode,
}

struct Layer {
    clip: StereoClip,
    gain_l: f32,
    gain_r: f32,
}

impl Layer {
    fn prepare(track: &LoopTrack, sample_rate: u32) -> Result<Self, EngineError> {
        let mut clip = wav::decode(&track.payload, sample_rate)?;
        if track.reversed {
            clip.reverse();
        }
        let ratio = track.speed.ratio();
        if ratio != 1.0 {
            clip = clip.stretched(ratio);
        }
        let volume = if track.volume.is_finite() {
            track.volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (pan_l, pan_r) = track.pan_gains();
        Ok(Self {
            clip,
            gain_l: volume * pan_l,
            gain_r: volume * pan_r,
        })
    }

    fn add_into(&self, mix: &mut StereoClip, tail: TailMode) {
        let len = self.clip.frames();
        if len == 0 {
            return;
        }
        let frames = match tail {
            TailMode::Loop => mix.frames(),
            TailMode::Silence => len.min(mix.frames()),
        };
        for i in 0..frames {
            let src = i % len;
            mix.left[i] += self.clip.left[src] * self.gain_l;
            mix.right[i] += self.clip.right[src] * self.gain_r;
        }
    }
}

/// Sum the audible tracks into a float stereo clip at `sample_rate`.
pub fn render_mix(
    tracks: &[LoopTrack],
    sample_rate: u32,
    options: MixdownOptions,
) -> Result<StereoClip, EngineError> {
    let layers = audible_subset(tracks)
        .into_iter()
        .map(|track| Layer::prepare(track, sample_rate))
        .collect::<Result<Vec<_>, _>>()?;

    let frames = layers.iter().map(|l| l.clip.frames()).max().unwrap_or(0);
    if frames == 0 {
        return Err(EngineError::ExportEmpty);
    }

    let mut mix = StereoClip::silent(frames, sample_rate);
    for layer in &layers {
        layer.add_into(&mut mix, options.tail);
    }
    for sample in mix.left.iter_mut().chain(mix.right.iter_mut()) {
        *sample = dsp::mix::clip(*sample);
    }
    debug!(layers = layers.len(), frames, "mix rendered");
    Ok(mix)
}

/// Bounce `tracks` with looping tails.
pub fn export_mix(tracks: &[LoopTrack], sample_rate: u32) -> Result<Vec<u8>, EngineError> {
    export_mix_with(tracks, sample_rate, MixdownOptions::default())
}

pub fn export_mix_with(
    tracks: &[LoopTrack],
    sample_rate: u32,
    options: MixdownOptions,
) -> Result<Vec<u8>, EngineError> {
    let mix = render_mix(tracks, sample_rate, options)?;
    let bytes = wav::encode_mix(&mix)?;
    info!(seconds = mix.duration(), bytes = bytes.len(), "mix exported");
    Ok(bytes)
}

/// Run the export on its own thread.
pub fn spawn_export(
    tracks: Vec<LoopTrack>,
    sample_rate: u32,
    options: MixdownOptions,
) -> JoinHandle<Result<Vec<u8>, EngineError>> {
    thread::spawn(move || export_mix_with(&tracks, sample_rate, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looper::capture::Take;
    use crate::looper::track::PlaybackSpeed;

    const SR: u32 = 1_000;

    fn constant(value: f32, seconds: f64, volume: f32) -> LoopTrack {
        let frames = (seconds * SR as f64) as usize;
        let interleaved = vec![value; frames * 2];
        let take = Take {
            payload: wav::encode_take(&interleaved, SR).unwrap(),
            duration: seconds,
        };
        LoopTrack {
            volume,
            ..LoopTrack::from_take(take, 1)
        }
    }

    fn ramp(frames: usize) -> LoopTrack {
        let interleaved: Vec<f32> = (0..frames)
            .flat_map(|i| {
                let v = i as f32 / frames as f32;
                [v, v]
            })
            .collect();
        let take = Take {
            payload: wav::encode_take(&interleaved, SR).unwrap(),
            duration: frames as f64 / SR as f64,
        };
        LoopTrack::from_take(take, 1)
    }

    #[test]
    fn test_short_track_loops_under_long_one() {
        let a = constant(0.2, 1.0, 0.5);
        let b = constant(0.3, 2.0, 1.0);
        let mix = render_mix(&[a, b], SR, MixdownOptions::default()).unwrap();

        assert_eq!(mix.frames(), 2_000);
        assert!((mix.left[500] - 0.4).abs() < 1e-6);
        assert!((mix.left[1_500] - 0.4).abs() < 1e-6);
        assert!((mix.right[1_999] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_silence_tail_plays_short_track_once() {
        let a = constant(0.2, 1.0, 0.5);
        let b = constant(0.3, 2.0, 1.0);
        let options = MixdownOptions {
            tail: TailMode::Silence,
        };
        let mix = render_mix(&[a, b], SR, options).unwrap();
        assert!((mix.left[999] - 0.4).abs() < 1e-6);
        assert!((mix.left[1_000] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_nothing_audible_is_an_error() {
        assert!(matches!(
            export_mix(&[], SR),
            Err(EngineError::ExportEmpty)
        ));
        let muted = LoopTrack {
            is_muted: true,
            ..constant(0.5, 1.0, 1.0)
        };
        assert!(matches!(
            export_mix(&[muted], SR),
            Err(EngineError::ExportEmpty)
        ));
        let empty = constant(0.5, 0.0, 1.0);
        assert!(matches!(
            export_mix(&[empty], SR),
            Err(EngineError::ExportEmpty)
        ));
    }

    #[test]
    fn test_sum_is_clipped() {
        let a = constant(0.9, 0.5, 1.0);
        let b = constant(0.9, 0.5, 1.0);
        let mix = render_mix(&[a, b], SR, MixdownOptions::default()).unwrap();
        assert!(mix.left.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_balance_and_solo() {
        let left = LoopTrack {
            pan: -1.0,
            is_solo: true,
            ..constant(0.5, 0.5, 1.0)
        };
        let ignored = constant(0.5, 1.0, 1.0);
        let mix = render_mix(&[left, ignored], SR, MixdownOptions::default()).unwrap();
        assert_eq!(mix.frames(), 500);
        assert!((mix.left[10] - 0.5).abs() < 1e-6);
        assert_eq!(mix.right[10], 0.0);
    }

    #[test]
    fn test_reverse_and_speed() {
        let reversed = LoopTrack {
            reversed: true,
            ..ramp(100)
        };
        let mix = render_mix(&[reversed], SR, MixdownOptions::default()).unwrap();
        assert!(mix.left[0] > mix.left[99]);

        let fast = LoopTrack {
            speed: PlaybackSpeed::Double,
            ..ramp(100)
        };
        assert_eq!(
            render_mix(&[fast], SR, MixdownOptions::default())
                .unwrap()
                .frames(),
            50
        );

        let slow = LoopTrack {
            speed: PlaybackSpeed::Half,
            ..ramp(100)
        };
        assert_eq!(
            render_mix(&[slow], SR, MixdownOptions::default())
                .unwrap()
                .frames(),
            200
        );
    }

    #[test]
    fn test_export_is_sixteen_bit_stereo() {
        let bytes = export_mix(&[constant(0.25, 1.0, 1.0)], SR).unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(&bytes[..])).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, SR);
        assert_eq!(reader.duration(), 1_000);
    }

    #[test]
    fn test_spawned_export_matches_inline() {
        let tracks = vec![constant(0.25, 0.5, 1.0)];
        let inline = export_mix(&tracks, SR).unwrap();
        let spawned = spawn_export(tracks, SR, MixdownOptions::default())
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(inline, spawned);
    }
}
