//! Greedy temporal bin-packing of power-drawing tasks onto a capacity step
//! function, with an efficacy harness for comparing placement heuristics.

pub mod alloc;
pub mod config;
pub mod error;
/// Efficacy scoring, summaries, the parallel trial harness and input statistics.
pub mod eval;
pub mod generators;
pub mod io;
pub mod reporting;
