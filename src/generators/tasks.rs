use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::alloc::Task;
use crate::error::GenerateError;

use super::profile::normal;

/// Upper bound on rejection-sampling draws for a single value.
pub const MAX_DRAWS: usize = 10_000;

/// Parameters for synthetic task batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskConfig {
    /// Number of tasks per batch.
    pub count: usize,
    /// Mean of the power draw distribution.
    pub mean_power: f64,
    /// Standard deviation of the power draw distribution.
    pub sigma_power: f64,
    /// Mean of the duration distribution (slots).
    pub duration_mean: f64,
    /// Standard deviation of the duration distribution (slots).
    pub duration_sigma: f64,
    /// Samples below this value are discarded and redrawn.
    pub min_sample: f64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            count: 20,
            mean_power: 20.0,
            sigma_power: 100.0,
            duration_mean: 1.0,
            duration_sigma: 2.5,
            min_sample: 0.5,
        }
    }
}

impl TaskConfig {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::InvalidParameter` naming the first bad field.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let checks: [(&'static str, f64, bool); 5] = [
            ("mean_power", self.mean_power, false),
            ("sigma_power", self.sigma_power, true),
            ("duration_mean", self.duration_mean, false),
            ("duration_sigma", self.duration_sigma, true),
            ("min_sample", self.min_sample, false),
        ];
        for (field, value, non_negative) in checks {
            if !value.is_finite() {
                return Err(GenerateError::InvalidParameter {
                    field,
                    message: format!("must be finite, got {value}"),
                });
            }
            if non_negative && value < 0.0 {
                return Err(GenerateError::InvalidParameter {
                    field,
                    message: format!("must be >= 0, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Draws from `dist` until a value of at least `min` comes up.
fn sample_at_least<R: Rng + ?Sized>(
    dist: &Normal<f64>,
    min: f64,
    rng: &mut R,
) -> Result<f64, GenerateError> {
    for _ in 0..MAX_DRAWS {
        let x = dist.sample(rng);
        if x >= min {
            return Ok(x);
        }
    }
    Err(GenerateError::RejectionExhausted {
        mean: dist.mean(),
        sigma: dist.std_dev(),
        min,
        attempts: MAX_DRAWS,
    })
}

/// Synthesizes `config.count` unplaced tasks with ids `0..count`.
///
/// Durations and power draws are rejection-sampled from their normal
/// distributions, rounded half to even and floored at 1.
///
/// # Errors
///
/// Returns a `GenerateError` for invalid parameters or if a distribution
/// yields no acceptable sample within [`MAX_DRAWS`] draws.
pub fn generate_tasks<R: Rng + ?Sized>(
    config: &TaskConfig,
    rng: &mut R,
) -> Result<Vec<Task>, GenerateError> {
    config.validate()?;
    let duration_dist = normal(config.duration_mean, config.duration_sigma)?;
    let power_dist = normal(config.mean_power, config.sigma_power)?;

    (0..config.count)
        .map(|id| {
            let duration = sample_at_least(&duration_dist, config.min_sample, &mut *rng)?
                .round_ties_even()
                .max(1.0);
            let power = sample_at_least(&power_dist, config.min_sample, &mut *rng)?
                .round_ties_even()
                .max(1.0);
            Ok(Task::new(id, duration as usize, power))
        })
        .collect()
}
