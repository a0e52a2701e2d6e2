//! WAV payloads for takes and mixdowns.
//!
//! Takes are stored as 32-bit float stereo so a recorded layer loses nothing
//! before it is mixed; bounces are 16-bit PCM stereo. Both are written into
//! memory, never to disk.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::dsp::mix;
use crate::EngineError;

/// Decoded stereo audio at a known rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoClip {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: u32,
}

impl StereoClip {
    pub fn silent(frames: usize, sample_rate: u32) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
            sample_rate,
        }
    }

    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn reverse(&mut self) {
        self.left.reverse();
        self.right.reverse();
    }

    /// Read the clip at `step` source frames per output frame.
    pub fn stretched(&self, step: f64) -> Self {
        Self {
            left: resample_linear(&self.left, step),
            right: resample_linear(&self.right, step),
            sample_rate: self.sample_rate,
        }
    }
}

/// Encode interleaved stereo as 32-bit float WAV.
pub fn encode_take(interleaved: &[f32], sample_rate: u32) -> Result<Vec<u8>, EngineError> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut bytes = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec)?;
    for &sample in interleaved {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(bytes)
}

/// Encode a stereo clip as 16-bit PCM WAV, clipping to [-1, 1].
pub fn encode_mix(clip: &StereoClip) -> Result<Vec<u8>, EngineError> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut bytes = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec)?;
    for (&l, &r) in clip.left.iter().zip(&clip.right) {
        writer.write_sample(to_i16(l))?;
        writer.write_sample(to_i16(r))?;
    }
    writer.finalize()?;
    Ok(bytes)
}

fn to_i16(sample: f32) -> i16 {
    (mix::clip(sample) * i16::MAX as f32).round() as i16
}

/// Decode a WAV payload into stereo at `target_rate`.
///
/// Integer and float payloads are accepted; mono is duplicated to both
/// channels and anything wider than stereo keeps its first two channels.
pub fn decode(payload: &[u8], target_rate: u32) -> Result<StereoClip, EngineError> {
    let mut reader = WavReader::new(Cursor::new(payload)).map_err(decode_error)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 || spec.sample_rate == 0 {
        return Err(EngineError::Decode(format!(
            "{channels} channels at {} Hz",
            spec.sample_rate
        )));
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decode_error)?,
        SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<Result<_, _>>()
                .map_err(decode_error)?
        }
    };

    let frames = samples.len() / channels;
    let mut clip = StereoClip {
        left: Vec::with_capacity(frames),
        right: Vec::with_capacity(frames),
        sample_rate: spec.sample_rate,
    };
    for frame in samples.chunks_exact(channels) {
        clip.left.push(frame[0]);
        clip.right.push(if channels == 1 { frame[0] } else { frame[1] });
    }

    if spec.sample_rate != target_rate {
        let step = spec.sample_rate as f64 / target_rate as f64;
        clip = clip.stretched(step);
        clip.sample_rate = target_rate;
    }
    Ok(clip)
}

fn decode_error(err: hound::Error) -> EngineError {
    EngineError::Decode(err.to_string())
}

/// Linear interpolation reading `step` input samples per output sample.
pub(crate) fn resample_linear(samples: &[f32], step: f64) -> Vec<f32> {
    if samples.is_empty() || step.is_nan() || step <= 0.0 {
        return Vec::new();
    }
    let out_len = (samples.len() as f64 / step).round().max(1.0) as usize;
    let last = samples.len() - 1;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64).clamp(0.0, 1.0) as f32;
            samples[idx] + (samples[next] - samples[idx]) * frac
        })
        .collect()
}
