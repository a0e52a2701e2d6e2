//! Benchmarks for transfer table build and lookup.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use neuroamp_dsp::curve::{CurveKey, TransferCurve};
use neuroamp_dsp::params::{DriveModel, EffectSettings};

use crate::BLOCK_SIZES;

fn key(model: DriveModel) -> CurveKey {
    CurveKey::from_settings(&EffectSettings {
        drive: 0.6,
        drive_model: model,
        ..EffectSettings::default()
    })
}

pub fn bench_shaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/shaper");

    // Rebuild cost on the control thread when drive changes
    for model in [DriveModel::Overdrive, DriveModel::Distortion, DriveModel::Fuzz] {
        let key = key(model);
        group.bench_function(format!("build_{model:?}").to_lowercase(), |b| {
            b.iter(|| TransferCurve::build(black_box(&key)))
        });
    }

    let curve = TransferCurve::build(&key(DriveModel::Fuzz));
    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.02).sin() * 1.2).collect();
        group.bench_with_input(BenchmarkId::new("lookup", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    sum += curve.lookup(black_box(x));
                }
                sum
            })
        });
    }

    group.finish();
}
