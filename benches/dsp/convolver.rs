//! Benchmarks for partitioned FFT convolution with the synthesized room.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use neuroamp_dsp::curve::ImpulseResponse;
use neuroamp_dsp::dsp::convolver::PartitionedConvolver;

use crate::BLOCK_SIZES;

pub fn bench_convolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolver");
    group.sample_size(20);

    let impulse = ImpulseResponse::synthesize(48_000);

    for &size in BLOCK_SIZES {
        // Impulse-like attack, then a quiet tone
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0)
                } else {
                    (i as f32 * 0.05).sin() * 0.1
                }
            })
            .collect();
        let mut output = vec![0.0f32; size];

        let mut convolver = PartitionedConvolver::new(&impulse.left);
        group.bench_with_input(BenchmarkId::new("two_second_room", size), &size, |b, _| {
            b.iter(|| {
                convolver.process(black_box(&input), black_box(&mut output));
            })
        });
    }

    group.finish();
}
