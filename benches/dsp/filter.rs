//! Benchmarks for the state-variable filter in its chain roles.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use neuroamp_dsp::dsp::filter::SVFilter;
use neuroamp_dsp::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::new(48_000.0, 0);

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let filters = [
            ("highpass", SVFilter::highpass(80.0)),
            ("low_shelf", SVFilter::low_shelf(320.0, 6.0)),
            ("peaking", SVFilter::peaking(1_000.0, 0.5, -4.0)),
            ("high_shelf", SVFilter::high_shelf(3_200.0, 3.0)),
            ("cabinet", SVFilter::lowpass(4_500.0)),
        ];

        for (name, mut filter) in filters {
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
