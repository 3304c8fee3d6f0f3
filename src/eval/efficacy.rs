//! Efficacy of an allocation pass.

use crate::alloc::{CapacityProfile, Task};

/// Energy demanded by all tasks, placed or not.
pub fn total_task_area(tasks: &[Task]) -> f64 {
    tasks.iter().map(Task::area).sum()
}

/// Share of the usable energy that placements actually consumed.
///
/// `(original - remaining) / min(total_task_area, original)`. The denominator
/// is the smaller of what the tasks asked for and what the profile offered,
/// so the value sits in `[0, 1]` for any valid allocation.
///
/// Returns `None` when the denominator is zero (no demand or no capacity),
/// where the ratio is undefined.
pub fn efficacy_from_totals(
    original_energy: f64,
    remaining_energy: f64,
    total_task_area: f64,
) -> Option<f64> {
    let denominator = total_task_area.min(original_energy);
    if denominator == 0.0 {
        return None;
    }
    Some((original_energy - remaining_energy) / denominator)
}

/// Computes efficacy from the profile before and after allocating `tasks`.
///
/// # Examples
///
/// ```
/// use stepfit::alloc::{CapacityProfile, Heuristic, Task, allocate};
/// use stepfit::eval::compute_efficacy;
///
/// let before = CapacityProfile::new(vec![4.0, 4.0, 4.0]).unwrap();
/// let mut after = before.clone();
/// let mut tasks = vec![Task::new(0, 2, 3.0)];
/// allocate(&mut tasks, &mut after, Heuristic::FirstFit).unwrap();
///
/// assert_eq!(compute_efficacy(&before, &after, &tasks), Some(1.0));
/// ```
pub fn compute_efficacy(
    before: &CapacityProfile,
    after: &CapacityProfile,
    tasks: &[Task],
) -> Option<f64> {
    efficacy_from_totals(before.total(), after.total(), total_task_area(tasks))
}
