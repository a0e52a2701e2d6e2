//! Offline bounce of several loop layers to 16-bit WAV.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use neuroamp_dsp::looper::wav::encode_take;
use neuroamp_dsp::looper::{export_mix, LoopTrack, PlaybackSpeed, Take};

const SAMPLE_RATE: u32 = 48_000;

fn layer(seconds: f64, freq: f32, index: usize) -> LoopTrack {
    let frames = (seconds * SAMPLE_RATE as f64) as usize;
    let interleaved: Vec<f32> = (0..frames)
        .flat_map(|i| {
            let s = (i as f32 * 2.0 * std::f32::consts::PI * freq / SAMPLE_RATE as f32).sin() * 0.3;
            [s, s]
        })
        .collect();
    let payload = encode_take(&interleaved, SAMPLE_RATE).unwrap_or_default();
    LoopTrack::from_take(Take { payload, duration: seconds }, index + 1)
}

pub fn bench_mixdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mixdown");
    group.sample_size(10);

    for layers in [1usize, 4] {
        let tracks: Vec<LoopTrack> = (0..layers)
            .map(|i| {
                let mut track = layer(2.0 + i as f64, 110.0 * (i + 1) as f32, i);
                track.pan = if i % 2 == 0 { -0.5 } else { 0.5 };
                if i == 3 {
                    track.reversed = true;
                    track.speed = PlaybackSpeed::Half;
                }
                track
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("export", layers), &layers, |b, _| {
            b.iter(|| export_mix(black_box(&tracks), SAMPLE_RATE))
        });
    }

    group.finish();
}
