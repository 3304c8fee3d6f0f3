//! Window search strategies used by the allocation engine.

use super::types::{CapacityProfile, Task};

/// A candidate window of consecutive slots, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

/// Contract between the allocation engine and a placement heuristic.
///
/// The engine asks for a window per task, in task order, and reports back each
/// window it actually commits. Strategies never mutate the profile themselves.
pub trait PlacementStrategy {
    /// Returns a window of exactly `task.duration` slots where every slot holds
    /// at least `task.power`, or `None` if the heuristic finds none.
    fn find_window(&mut self, profile: &CapacityProfile, task: &Task) -> Option<Window>;

    /// Called after the engine has committed `window` to the profile.
    fn on_placed(&mut self, _window: Window, _profile_len: usize) {}

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Earliest window that starts in `[from, start_limit)` and has every slot
/// holding at least `task.power`.
///
/// Tracks the start of the current run of feasible slots in a single
/// left-to-right pass and accepts as soon as the run is `task.duration` long.
fn first_window_from(
    values: &[f64],
    task: &Task,
    from: usize,
    start_limit: usize,
) -> Option<Window> {
    let mut run_start: Option<usize> = None;

    for (t, &capacity) in values.iter().enumerate().skip(from) {
        if capacity < task.power {
            run_start = None;
            continue;
        }

        let start = *run_start.get_or_insert(t);
        if start >= start_limit {
            return None;
        }
        if t - start + 1 == task.duration {
            return Some(Window { start, end: t });
        }
    }

    None
}

/// Always takes the earliest feasible window.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFit;

impl PlacementStrategy for FirstFit {
    fn find_window(&mut self, profile: &CapacityProfile, task: &Task) -> Option<Window> {
        first_window_from(profile.values(), task, 0, profile.len())
    }

    fn name(&self) -> &'static str {
        "first-fit"
    }
}

/// Resumes scanning where the previous placement ended.
///
/// Windows starting at or after the cursor are tried first; if none fits, the
/// scan wraps and tries windows starting before the cursor. A window never
/// wraps around the end of the profile.
#[derive(Debug, Default, Clone, Copy)]
pub struct NextFit {
    cursor: usize,
}

impl NextFit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl PlacementStrategy for NextFit {
    fn find_window(&mut self, profile: &CapacityProfile, task: &Task) -> Option<Window> {
        let values = profile.values();
        if self.cursor >= values.len() {
            self.cursor = 0;
        }

        first_window_from(values, task, self.cursor, values.len()).or_else(|| {
            if self.cursor == 0 {
                None
            } else {
                first_window_from(values, task, 0, self.cursor)
            }
        })
    }

    fn on_placed(&mut self, window: Window, profile_len: usize) {
        self.cursor = window.end + 1;
        if self.cursor >= profile_len {
            self.cursor = 0;
        }
    }

    fn name(&self) -> &'static str {
        "next-fit"
    }
}

/// Best-fit as found in the existing trial data.
///
/// The scan stops at the first feasible window instead of comparing slack
/// across all of them, so the chosen windows are exactly first-fit's. Kept
/// so new runs stay comparable with that data; see [`TrueBestFit`] for the
/// maximum-slack search.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestFit;

impl PlacementStrategy for BestFit {
    fn find_window(&mut self, profile: &CapacityProfile, task: &Task) -> Option<Window> {
        first_window_from(profile.values(), task, 0, profile.len())
    }

    fn name(&self) -> &'static str {
        "best-fit"
    }
}

/// Picks the feasible window with the largest slack, lowest start on ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrueBestFit;

impl PlacementStrategy for TrueBestFit {
    fn find_window(&mut self, profile: &CapacityProfile, task: &Task) -> Option<Window> {
        let mut best: Option<(Window, f64)> = None;
        let mut run_len = 0_usize;

        for (t, &capacity) in profile.values().iter().enumerate() {
            if capacity < task.power {
                run_len = 0;
                continue;
            }
            run_len += 1;
            if run_len < task.duration {
                continue;
            }

            let start = t + 1 - task.duration;
            let slack = profile.slack(start, t, task.power);
            if best.is_none_or(|(_, best_slack)| slack > best_slack) {
                best = Some((Window { start, end: t }, slack));
            }
        }

        best.map(|(window, _)| window)
    }

    fn name(&self) -> &'static str {
        "true-best-fit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(values: &[f64]) -> CapacityProfile {
        CapacityProfile::new(values.to_vec()).unwrap()
    }

    #[test]
    fn first_fit_takes_earliest_run() {
        let p = profile(&[5.0, 5.0, 5.0, 0.0, 0.0, 5.0, 5.0, 5.0]);
        let task = Task::new(0, 3, 5.0);
        assert_eq!(
            FirstFit.find_window(&p, &task),
            Some(Window { start: 0, end: 2 })
        );
    }

    #[test]
    fn first_fit_resets_run_on_short_slot() {
        let p = profile(&[5.0, 5.0, 1.0, 5.0, 5.0, 5.0]);
        let task = Task::new(0, 3, 4.0);
        assert_eq!(
            FirstFit.find_window(&p, &task),
            Some(Window { start: 3, end: 5 })
        );
    }

    #[test]
    fn first_fit_none_when_duration_exceeds_profile() {
        let p = profile(&[9.0, 9.0]);
        assert_eq!(FirstFit.find_window(&p, &Task::new(0, 3, 1.0)), None);
    }

    #[test]
    fn capacity_equal_to_power_is_feasible() {
        let p = profile(&[3.0]);
        assert_eq!(
            FirstFit.find_window(&p, &Task::new(0, 1, 3.0)),
            Some(Window { start: 0, end: 0 })
        );
    }

    #[test]
    fn next_fit_starts_at_cursor() {
        let p = profile(&[5.0; 6]);
        let mut nf = NextFit { cursor: 2 };
        assert_eq!(
            nf.find_window(&p, &Task::new(0, 2, 5.0)),
            Some(Window { start: 2, end: 3 })
        );
    }

    #[test]
    fn next_fit_wraps_to_front() {
        let p = profile(&[5.0, 5.0, 0.0, 0.0, 0.0, 0.0]);
        let mut nf = NextFit { cursor: 3 };
        assert_eq!(
            nf.find_window(&p, &Task::new(0, 2, 5.0)),
            Some(Window { start: 0, end: 1 })
        );
    }

    #[test]
    fn next_fit_wrapped_window_may_cross_cursor() {
        let p = profile(&[0.0, 5.0, 5.0, 5.0, 0.0]);
        let mut nf = NextFit { cursor: 2 };
        // Windows starting at 2.. need slots 2..=4 and fail on slot 4.
        assert_eq!(
            nf.find_window(&p, &Task::new(0, 3, 5.0)),
            Some(Window { start: 1, end: 3 })
        );
    }

    #[test]
    fn next_fit_cursor_wraps_at_profile_end() {
        let mut nf = NextFit::new();
        nf.on_placed(Window { start: 4, end: 5 }, 6);
        assert_eq!(nf.cursor(), 0);
        nf.on_placed(Window { start: 1, end: 2 }, 6);
        assert_eq!(nf.cursor(), 3);
    }

    #[test]
    fn reference_best_fit_matches_first_fit() {
        let p = profile(&[4.0, 4.0, 0.0, 9.0, 9.0]);
        let task = Task::new(0, 2, 3.0);
        assert_eq!(BestFit.find_window(&p, &task), FirstFit.find_window(&p, &task));
    }

    #[test]
    fn true_best_fit_prefers_larger_slack() {
        let p = profile(&[4.0, 4.0, 0.0, 9.0, 9.0]);
        let task = Task::new(0, 2, 3.0);
        assert_eq!(
            TrueBestFit.find_window(&p, &task),
            Some(Window { start: 3, end: 4 })
        );
    }

    #[test]
    fn true_best_fit_ties_break_on_lowest_start() {
        let p = profile(&[6.0, 6.0, 6.0, 6.0]);
        let task = Task::new(0, 2, 1.0);
        assert_eq!(
            TrueBestFit.find_window(&p, &task),
            Some(Window { start: 0, end: 1 })
        );
    }

    #[test]
    fn true_best_fit_considers_overlapping_windows_in_one_run() {
        let p = profile(&[2.0, 3.0, 8.0, 9.0]);
        let task = Task::new(0, 2, 2.0);
        assert_eq!(
            TrueBestFit.find_window(&p, &task),
            Some(Window { start: 2, end: 3 })
        );
    }
}
