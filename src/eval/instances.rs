//! Distributions of the generated inputs themselves.
//!
//! Sample `i` is drawn exactly as trial `i` of the harness draws its instance,
//! so these figures describe what the efficacy trials were run against.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::GenerateError;
use crate::generators::{ProfileConfig, TaskConfig, generate_capacity_profile, generate_tasks};

use super::efficacy::total_task_area;
use super::summary::EfficacySummary;

/// Energy figures of one generated instance.
#[derive(Debug, Clone, PartialEq)]
struct InstanceSample {
    weekly: f64,
    daily: Vec<f64>,
    active_hours: Vec<f64>,
    task_area: f64,
}

/// Summaries over many generated instances.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceStats {
    pub samples: usize,
    pub seed: u64,
    /// Total capacity of each profile.
    pub weekly_energy: EfficacySummary,
    /// Capacity summed per day, across all days of all profiles.
    pub daily_energy: EfficacySummary,
    /// Every nonzero slot value.
    pub active_slot_capacity: EfficacySummary,
    /// Summed `duration × power` of each task batch.
    pub task_area: EfficacySummary,
}

fn sample(
    profile: &ProfileConfig,
    tasks: &TaskConfig,
    seed: u64,
) -> Result<InstanceSample, GenerateError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let generated = generate_capacity_profile(profile, &mut rng)?;
    let batch = generate_tasks(tasks, &mut rng)?;

    Ok(InstanceSample {
        weekly: generated.weekly.total(),
        daily: generated.daily.iter().map(|d| d.iter().sum()).collect(),
        active_hours: generated
            .weekly
            .values()
            .iter()
            .copied()
            .filter(|&v| v > 0.0)
            .collect(),
        task_area: total_task_area(&batch),
    })
}

/// Generates `samples` instances from seeds `seed, seed + 1, …` and
/// summarizes their energy distributions.
///
/// # Errors
///
/// Returns a `GenerateError` if either configuration is invalid or task
/// sampling is exhausted.
pub fn sample_instance_stats(
    profile: &ProfileConfig,
    tasks: &TaskConfig,
    samples: usize,
    seed: u64,
) -> Result<InstanceStats, GenerateError> {
    profile.validate()?;
    tasks.validate()?;

    let drawn = (0..samples)
        .into_par_iter()
        .map(|i| sample(profile, tasks, seed.wrapping_add(i as u64)))
        .collect::<Result<Vec<_>, GenerateError>>()?;

    let weekly: Vec<f64> = drawn.iter().map(|s| s.weekly).collect();
    let daily: Vec<f64> = drawn.iter().flat_map(|s| s.daily.iter().copied()).collect();
    let active: Vec<f64> = drawn
        .iter()
        .flat_map(|s| s.active_hours.iter().copied())
        .collect();
    let area: Vec<f64> = drawn.iter().map(|s| s.task_area).collect();

    info!(samples, seed, "sampled instance distributions");

    Ok(InstanceStats {
        samples,
        seed,
        weekly_energy: EfficacySummary::from_samples(&weekly),
        daily_energy: EfficacySummary::from_samples(&daily),
        active_slot_capacity: EfficacySummary::from_samples(&active),
        task_area: EfficacySummary::from_samples(&area),
    })
}
