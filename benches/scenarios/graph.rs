//! The whole effects chain plus the rhythm bus, one callback block at a time.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use neuroamp_dsp::curve::{CurveKey, ImpulseResponse, TransferCurve};
use neuroamp_dsp::engine::RealtimeStats;
use neuroamp_dsp::graph::{SignalGraph, StageTargets};
use neuroamp_dsp::params::{find_preset, EffectSettings, KickType};
use neuroamp_dsp::sequencing::{DrumTimbre, DrumTrigger};
use neuroamp_dsp::voices::DrumBus;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: u32 = 48_000;

fn build(settings: &EffectSettings) -> (SignalGraph, rtrb::Producer<DrumTrigger>) {
    let (tx, rx) = rtrb::RingBuffer::new(256);
    let stats = Arc::new(RealtimeStats::new());
    let impulse = ImpulseResponse::synthesize(SAMPLE_RATE);
    let curve = Box::new(TransferCurve::build(&CurveKey::from_settings(settings)));
    let graph = SignalGraph::new(
        SAMPLE_RATE as f32,
        &impulse,
        &StageTargets::from_settings(settings),
        curve,
        DrumBus::new(rx, stats),
    );
    (graph, tx)
}

pub fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/graph");
    group.sample_size(20);

    let presets = [
        ("clean", EffectSettings::default()),
        (
            "shoegaze",
            find_preset("Shoegaze Wall")
                .map(|p| p.settings)
                .unwrap_or_default(),
        ),
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 2.0 * std::f32::consts::PI * 110.0 / 48_000.0).sin() * 0.5)
            .collect();
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        for (name, settings) in &presets {
            let (mut graph, _tx) = build(settings);
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    graph.render_into(black_box(&input), &mut left, &mut right);
                })
            });
        }

        // Kick retriggered every block so the drum voices stay busy
        let (mut graph, mut tx) = build(&EffectSettings::default());
        group.bench_with_input(BenchmarkId::new("with_drums", size), &size, |b, _| {
            b.iter(|| {
                let _ = tx.push(DrumTrigger {
                    timbre: DrumTimbre::Kick(KickType::Classic),
                    at_sample: graph.frame(),
                    gain: 0.6,
                    step: 0,
                });
                graph.render_into(black_box(&input), &mut left, &mut right);
            })
        });
    }

    group.finish();
}
