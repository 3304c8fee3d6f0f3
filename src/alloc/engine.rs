//! Greedy allocation engine: validates input, then places tasks one by one.

use tracing::debug;

use crate::error::AllocError;

use super::strategy::{BestFit, FirstFit, NextFit, PlacementStrategy, TrueBestFit};
use super::types::{CapacityProfile, Heuristic, Placement, Task};

/// Outcome of one allocation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationReport {
    /// Name of the strategy that produced the placements.
    pub strategy: &'static str,
    /// Number of tasks that received a window.
    pub placed: usize,
    /// Ids of tasks left unplaced, in processing order.
    pub unplaced: Vec<usize>,
    /// Energy subtracted from the profile by all placements.
    pub consumed_energy: f64,
}

impl AllocationReport {
    pub fn total(&self) -> usize {
        self.placed + self.unplaced.len()
    }
}

/// Places `tasks` onto `profile` in the given order using `heuristic`.
///
/// Each placed task's power is subtracted from every slot of its window and
/// its placement is recorded on the task. Tasks without a feasible window stay
/// unplaced and leave the profile untouched. Decisions are never revisited.
///
/// # Errors
///
/// Returns an `AllocError` without touching the profile or any task if the
/// profile is empty or a task has a zero duration, an invalid power draw, or
/// an existing placement.
pub fn allocate(
    tasks: &mut [Task],
    profile: &mut CapacityProfile,
    heuristic: Heuristic,
) -> Result<AllocationReport, AllocError> {
    match heuristic {
        Heuristic::FirstFit => allocate_with(&mut FirstFit, tasks, profile),
        Heuristic::NextFit => allocate_with(&mut NextFit::new(), tasks, profile),
        Heuristic::BestFit => allocate_with(&mut BestFit, tasks, profile),
        Heuristic::TrueBestFit => allocate_with(&mut TrueBestFit, tasks, profile),
    }
}

/// Same as [`allocate`], with a caller-supplied strategy.
pub fn allocate_with<S: PlacementStrategy>(
    strategy: &mut S,
    tasks: &mut [Task],
    profile: &mut CapacityProfile,
) -> Result<AllocationReport, AllocError> {
    validate(tasks, profile)?;

    let mut report = AllocationReport {
        strategy: strategy.name(),
        placed: 0,
        unplaced: Vec::new(),
        consumed_energy: 0.0,
    };

    for task in tasks.iter_mut() {
        let Some(window) = strategy.find_window(profile, task) else {
            debug!(
                task = task.id,
                duration = task.duration,
                power = task.power,
                strategy = report.strategy,
                "no feasible window"
            );
            report.unplaced.push(task.id);
            continue;
        };

        let slack = profile.slack(window.start, window.end, task.power);
        profile.consume(window.start, window.end, task.power);
        task.place(Placement {
            start: window.start,
            end: window.end,
            slack,
        });
        strategy.on_placed(window, profile.len());

        report.placed += 1;
        report.consumed_energy += task.area();
    }

    debug!(
        strategy = report.strategy,
        placed = report.placed,
        unplaced = report.unplaced.len(),
        consumed = report.consumed_energy,
        "allocation finished"
    );

    Ok(report)
}

/// Checks the allocation inputs without mutating anything.
///
/// # Errors
///
/// See [`allocate`].
pub fn validate(tasks: &[Task], profile: &CapacityProfile) -> Result<(), AllocError> {
    if profile.is_empty() {
        return Err(AllocError::EmptyProfile);
    }

    for (index, task) in tasks.iter().enumerate() {
        if task.duration == 0 {
            return Err(AllocError::ZeroDuration { index, id: task.id });
        }
        if !task.power.is_finite() || task.power < 0.0 {
            return Err(AllocError::InvalidPower {
                index,
                id: task.id,
                power: task.power,
            });
        }
        if task.is_placed() {
            return Err(AllocError::AlreadyPlaced { index, id: task.id });
        }
    }

    Ok(())
}
