//! Repeated randomized trials over a grid of orderings and heuristics.
//!
//! Trial `i` of every combination draws its profile and tasks from the same
//! seed (`seed + i`), so combinations are compared on identical instances.
//! Trials run on a dedicated rayon pool and results are independent of the
//! thread count.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alloc::{Heuristic, OrderKey, allocate};
use crate::config::ExperimentConfig;
use crate::error::HarnessError;
use crate::generators::{ProfileConfig, TaskConfig, generate_capacity_profile, generate_tasks};

use super::efficacy::{efficacy_from_totals, total_task_area};
use super::summary::EfficacySummary;

/// Result of a single randomized trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialOutcome {
    pub order: OrderKey,
    pub heuristic: Heuristic,
    pub trial: usize,
    /// Seed the instance was generated from.
    pub seed: u64,
    pub original_energy: f64,
    pub remaining_energy: f64,
    pub total_task_area: f64,
    pub placed: usize,
    pub unplaced: usize,
    /// `None` when neither demand nor capacity was present.
    pub efficacy: Option<f64>,
}

/// All trials of one (order, heuristic) pair, in trial order.
#[derive(Debug, Clone)]
pub struct CombinationResult {
    pub order: OrderKey,
    pub heuristic: Heuristic,
    pub outcomes: Vec<TrialOutcome>,
    /// Set when the run was interrupted before every trial finished.
    pub cancelled: bool,
}

impl CombinationResult {
    pub fn efficacies(&self) -> Vec<Option<f64>> {
        self.outcomes.iter().map(|o| o.efficacy).collect()
    }

    pub fn summary(&self) -> EfficacySummary {
        EfficacySummary::from_values(&self.efficacies())
    }
}

/// Results for every requested combination, orders outermost.
#[derive(Debug, Clone)]
pub struct GridResult {
    pub combinations: Vec<CombinationResult>,
    /// Set when the run was interrupted; some trials are then missing.
    pub cancelled: bool,
}

/// Runs trials for (order, heuristic) combinations.
#[derive(Debug, Clone)]
pub struct Harness {
    pub profile: ProfileConfig,
    pub tasks: TaskConfig,
    /// Trials per combination.
    pub trials: usize,
    /// Base seed; trial `i` uses `seed.wrapping_add(i)`.
    pub seed: u64,
    /// Worker threads, 0 for rayon's default.
    pub threads: usize,
    cancel: Arc<AtomicBool>,
}

impl Harness {
    pub fn new(profile: ProfileConfig, tasks: TaskConfig, trials: usize, seed: u64) -> Self {
        Self {
            profile,
            tasks,
            trials,
            seed,
            threads: 0,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self::new(
            config.profile.clone(),
            config.tasks.clone(),
            config.trials.count,
            config.trials.seed,
        )
        .with_threads(config.trials.threads)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Shares a flag that stops the run when set. Trials already in flight
    /// finish; the rest are skipped.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs trial `trial` for one combination on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns a `HarnessError` if instance generation or allocation fails.
    pub fn run_trial(
        &self,
        order: OrderKey,
        heuristic: Heuristic,
        trial: usize,
    ) -> Result<TrialOutcome, HarnessError> {
        let seed = self.seed.wrapping_add(trial as u64);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut profile = generate_capacity_profile(&self.profile, &mut rng)?.weekly;
        let mut tasks = generate_tasks(&self.tasks, &mut rng)?;
        order.sort(&mut tasks);

        let original_energy = profile.total();
        let report = allocate(&mut tasks, &mut profile, heuristic)?;
        let remaining_energy = profile.total();
        let area = total_task_area(&tasks);

        Ok(TrialOutcome {
            order,
            heuristic,
            trial,
            seed,
            original_energy,
            remaining_energy,
            total_task_area: area,
            placed: report.placed,
            unplaced: report.unplaced.len(),
            efficacy: efficacy_from_totals(original_energy, remaining_energy, area),
        })
    }

    /// Runs all trials for a single combination.
    ///
    /// # Errors
    ///
    /// See [`Harness::run_grid`].
    pub fn run_combination(
        &self,
        order: OrderKey,
        heuristic: Heuristic,
    ) -> Result<CombinationResult, HarnessError> {
        let mut grid = self.run_grid(&[order], &[heuristic])?;
        Ok(grid.combinations.pop().unwrap_or(CombinationResult {
            order,
            heuristic,
            outcomes: Vec::new(),
            cancelled: grid.cancelled,
        }))
    }

    /// Runs every trial of every `orders × heuristics` combination.
    ///
    /// # Errors
    ///
    /// Returns a `HarnessError` if the generator parameters are invalid, the
    /// worker pool cannot be built, or any trial fails. Parameters are checked
    /// before any trial starts.
    pub fn run_grid(
        &self,
        orders: &[OrderKey],
        heuristics: &[Heuristic],
    ) -> Result<GridResult, HarnessError> {
        self.profile.validate()?;
        self.tasks.validate()?;

        let mut combinations: Vec<CombinationResult> = orders
            .iter()
            .flat_map(|&order| {
                heuristics.iter().map(move |&heuristic| CombinationResult {
                    order,
                    heuristic,
                    outcomes: Vec::with_capacity(self.trials),
                    cancelled: false,
                })
            })
            .collect();

        let specs: Vec<(usize, usize)> = (0..combinations.len())
            .flat_map(|combo| (0..self.trials).map(move |trial| (combo, trial)))
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;

        info!(
            combinations = combinations.len(),
            trials = self.trials,
            threads = pool.current_num_threads(),
            seed = self.seed,
            "running trial grid"
        );

        let outcomes = pool.install(|| {
            specs
                .par_iter()
                .filter_map(|&(combo, trial)| {
                    if self.cancel.load(Ordering::Relaxed) {
                        return None;
                    }
                    let c = &combinations[combo];
                    Some(
                        self.run_trial(c.order, c.heuristic, trial)
                            .map(|outcome| (combo, outcome)),
                    )
                })
                .collect::<Result<Vec<_>, HarnessError>>()
        })?;

        let completed = outcomes.len();
        for (combo, outcome) in outcomes {
            combinations[combo].outcomes.push(outcome);
        }

        let cancelled = self.cancel.load(Ordering::Relaxed);
        for c in &mut combinations {
            c.cancelled = cancelled;
        }
        if cancelled {
            warn!(
                completed,
                requested = specs.len(),
                "trial grid cancelled"
            );
        } else {
            info!(completed, "trial grid finished");
        }

        for c in &combinations {
            debug!(
                order = %c.order,
                heuristic = %c.heuristic,
                summary = %c.summary(),
                "combination summary"
            );
        }

        Ok(GridResult {
            combinations,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_harness() -> Harness {
        let tasks = TaskConfig {
            count: 8,
            ..TaskConfig::default()
        };
        Harness::new(ProfileConfig::default(), tasks, 12, 3)
    }

    #[test]
    fn same_trial_index_shares_instance_across_combinations() {
        let h = small_harness();
        let a = h.run_trial(OrderKey::Area, Heuristic::FirstFit, 4).unwrap();
        let b = h.run_trial(OrderKey::Power, Heuristic::NextFit, 4).unwrap();
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.original_energy, b.original_energy);
        assert_eq!(a.total_task_area, b.total_task_area);
    }

    #[test]
    fn grid_has_one_entry_per_combination_in_order() {
        let h = small_harness();
        let grid = h
            .run_grid(&OrderKey::ALL, &[Heuristic::FirstFit, Heuristic::TrueBestFit])
            .unwrap();
        assert_eq!(grid.combinations.len(), 6);
        assert!(!grid.cancelled);
        assert_eq!(grid.combinations[0].order, OrderKey::Duration);
        assert_eq!(grid.combinations[1].heuristic, Heuristic::TrueBestFit);
        for c in &grid.combinations {
            let trials: Vec<usize> = c.outcomes.iter().map(|o| o.trial).collect();
            assert_eq!(trials, (0..12).collect::<Vec<_>>());
        }
    }

    #[test]
    fn results_do_not_depend_on_thread_count() {
        let one = small_harness().with_threads(1);
        let four = small_harness().with_threads(4);
        let a = one.run_combination(OrderKey::Area, Heuristic::NextFit).unwrap();
        let b = four.run_combination(OrderKey::Area, Heuristic::NextFit).unwrap();
        assert_eq!(a.outcomes, b.outcomes);
    }

    #[test]
    fn efficacy_stays_in_unit_interval() {
        let h = small_harness();
        let grid = h.run_grid(&OrderKey::ALL, &Heuristic::ALL).unwrap();
        for c in &grid.combinations {
            for e in c.efficacies().into_iter().flatten() {
                assert!((0.0..=1.0 + 1e-9).contains(&e), "efficacy {e} out of range");
            }
        }
    }

    #[test]
    fn preset_cancel_flag_skips_all_trials() {
        let cancel = Arc::new(AtomicBool::new(true));
        let h = small_harness().with_cancel_flag(Arc::clone(&cancel));
        let grid = h.run_grid(&[OrderKey::Area], &[Heuristic::FirstFit]).unwrap();
        assert!(grid.cancelled);
        assert!(grid.combinations[0].outcomes.is_empty());
    }

    #[test]
    fn cancelled_combination_reports_the_interruption() {
        let cancel = Arc::new(AtomicBool::new(true));
        let h = small_harness().with_cancel_flag(cancel);
        let result = h.run_combination(OrderKey::Power, Heuristic::NextFit).unwrap();
        assert!(result.cancelled);
        assert!(result.outcomes.is_empty());
        assert_eq!(result.summary().trials, 0);
    }

    #[test]
    fn completed_combination_is_not_cancelled() {
        let result = small_harness()
            .run_combination(OrderKey::Area, Heuristic::FirstFit)
            .unwrap();
        assert!(!result.cancelled);
        assert_eq!(result.outcomes.len(), 12);
    }

    #[test]
    fn invalid_parameters_fail_before_running() {
        let mut h = small_harness();
        h.tasks.sigma_power = -1.0;
        let err = h.run_grid(&[OrderKey::Area], &[Heuristic::FirstFit]);
        assert!(matches!(err, Err(HarnessError::Generate(_))));
    }
}
