//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use stepfit::alloc::{CapacityProfile, Task};
use stepfit::eval::Harness;
use stepfit::generators::{ProfileConfig, TaskConfig};

/// Profile from literal slot values.
pub fn profile(values: &[f64]) -> CapacityProfile {
    CapacityProfile::new(values.to_vec()).unwrap()
}

/// Unplaced tasks from `(duration, power)` pairs, ids in slice order.
pub fn tasks(specs: &[(usize, f64)]) -> Vec<Task> {
    specs
        .iter()
        .enumerate()
        .map(|(id, &(duration, power))| Task::new(id, duration, power))
        .collect()
}

/// `(start, end)` of each task, `None` where unplaced.
pub fn windows(tasks: &[Task]) -> Vec<Option<(usize, usize)>> {
    tasks
        .iter()
        .map(|t| t.placement().map(|p| (p.start, p.end)))
        .collect()
}

/// Reference week with a smaller batch and few trials, for fast harness runs.
pub fn small_harness(trials: usize, seed: u64) -> Harness {
    let tasks = TaskConfig {
        count: 10,
        ..TaskConfig::default()
    };
    Harness::new(ProfileConfig::default(), tasks, trials, seed)
}
