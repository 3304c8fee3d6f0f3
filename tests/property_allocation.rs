//! Property tests for the placement heuristics.

use proptest::prelude::*;
use stepfit::alloc::{CapacityProfile, Heuristic, Task, allocate};

fn profile_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0_u32..20).prop_map(f64::from), 1..30)
}

fn tasks_strategy() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec((1_usize..6, (0_u32..15).prop_map(f64::from)), 0..12).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(id, (duration, power))| Task::new(id, duration, power))
                .collect()
        },
    )
}

fn heuristic_strategy() -> impl Strategy<Value = Heuristic> {
    prop::sample::select(Heuristic::ALL.to_vec())
}

fn run(values: &[f64], tasks: &[Task], heuristic: Heuristic) -> (Vec<Task>, CapacityProfile) {
    let mut profile = CapacityProfile::new(values.to_vec()).unwrap();
    let mut tasks = tasks.to_vec();
    allocate(&mut tasks, &mut profile, heuristic).unwrap();
    (tasks, profile)
}

proptest! {
    #[test]
    fn placements_have_task_length(
        values in profile_strategy(),
        tasks in tasks_strategy(),
        heuristic in heuristic_strategy(),
    ) {
        let (placed, _) = run(&values, &tasks, heuristic);
        for t in &placed {
            if let Some(p) = t.placement() {
                prop_assert_eq!(p.end - p.start + 1, t.duration);
                prop_assert!(p.end < values.len());
            }
        }
    }

    #[test]
    fn profile_never_goes_negative(
        values in profile_strategy(),
        tasks in tasks_strategy(),
        heuristic in heuristic_strategy(),
    ) {
        let (_, profile) = run(&values, &tasks, heuristic);
        prop_assert!(profile.values().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn consumed_energy_matches_profile_drop(
        values in profile_strategy(),
        tasks in tasks_strategy(),
        heuristic in heuristic_strategy(),
    ) {
        let before: f64 = values.iter().sum();
        let mut profile = CapacityProfile::new(values).unwrap();
        let mut tasks = tasks;
        let report = allocate(&mut tasks, &mut profile, heuristic).unwrap();
        prop_assert_eq!(before - profile.total(), report.consumed_energy);
    }

    #[test]
    fn reference_best_fit_equals_first_fit(
        values in profile_strategy(),
        tasks in tasks_strategy(),
    ) {
        let (first, p1) = run(&values, &tasks, Heuristic::FirstFit);
        let (best, p2) = run(&values, &tasks, Heuristic::BestFit);
        prop_assert_eq!(first, best);
        prop_assert_eq!(p1, p2);
    }

    #[test]
    fn true_best_fit_takes_a_maximum_slack_window(
        values in profile_strategy(),
        duration in 1_usize..6,
        power in (0_u32..15).prop_map(f64::from),
    ) {
        let profile = CapacityProfile::new(values.clone()).unwrap();
        let (placed, _) = run(&values, &[Task::new(0, duration, power)], Heuristic::TrueBestFit);

        let best_possible = (0..values.len())
            .filter(|&s| s + duration <= values.len())
            .filter(|&s| values[s..s + duration].iter().all(|&c| c >= power))
            .map(|s| profile.slack(s, s + duration - 1, power))
            .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.max(x))));

        match (placed[0].placement(), best_possible) {
            (Some(p), Some(best)) => prop_assert_eq!(p.slack, best),
            (None, None) => {}
            (got, want) => prop_assert!(false, "placement {:?} vs best slack {:?}", got, want),
        }
    }
}
