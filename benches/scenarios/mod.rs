//! Real-world scenario benchmarks.
//!
//! The whole effects chain as the callback runs it, and the offline bounce
//! of a few loop layers.

mod graph;
mod mixdown;

pub use graph::bench_graph;
pub use mixdown::bench_mixdown;
