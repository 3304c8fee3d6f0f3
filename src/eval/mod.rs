//! Efficacy measurement, the randomized trial harness, and input statistics.

pub mod efficacy;
pub mod harness;
pub mod instances;
pub mod summary;

pub use efficacy::{compute_efficacy, efficacy_from_totals, total_task_area};
pub use harness::{CombinationResult, GridResult, Harness, TrialOutcome};
pub use instances::{InstanceStats, sample_instance_stats};
pub use summary::{EfficacySummary, HISTOGRAM_BINS};
