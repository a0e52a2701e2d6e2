//! Benchmarks for low-level DSP primitives.

mod convolver;
mod filter;
mod shaper;

pub use convolver::bench_convolver;
pub use filter::bench_filter;
pub use shaper::bench_shaper;
