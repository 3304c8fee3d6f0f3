//! Task placement onto a capacity profile.

pub mod engine;
/// Window search heuristics behind the [`strategy::PlacementStrategy`] trait.
pub mod strategy;
pub mod types;

pub use engine::{AllocationReport, allocate, allocate_with, validate};
pub use strategy::{BestFit, FirstFit, NextFit, PlacementStrategy, TrueBestFit, Window};
pub use types::{CapacityProfile, Heuristic, OrderKey, ParseSelectorError, Placement, Task};
