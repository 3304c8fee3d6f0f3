use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::alloc::CapacityProfile;
use crate::error::GenerateError;

/// Shape of a synthetic production curve.
///
/// Each day gets a random peak. Inside the active window the expected value
/// climbs linearly to the peak over the first half and falls away from it over
/// the second half, with Gaussian noise whose spread grows towards the middle
/// of the window. Outside the window the capacity is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// Number of days in the horizon.
    pub days: usize,
    /// Slots per day.
    pub hours_per_day: usize,
    /// First productive hour (inclusive).
    pub active_start_hour: usize,
    /// End of the productive window (exclusive).
    pub active_end_hour: usize,
    /// Lower bound of the daily peak (inclusive).
    pub peak_min: u32,
    /// Upper bound of the daily peak (exclusive).
    pub peak_max: u32,
    /// Noise standard deviation in the first active hour.
    pub sigma_base: f64,
    /// Change in noise standard deviation per hour.
    pub sigma_step: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            days: 7,
            hours_per_day: 24,
            active_start_hour: 8,
            active_end_hour: 21,
            peak_min: 100,
            peak_max: 400,
            sigma_base: 20.0,
            sigma_step: 6.0,
        }
    }
}

impl ProfileConfig {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::InvalidParameter` naming the first bad field.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let invalid = |field, message: &str| {
            Err(GenerateError::InvalidParameter {
                field,
                message: message.to_string(),
            })
        };

        if self.days == 0 {
            return invalid("days", "must be > 0");
        }
        if self.hours_per_day == 0 {
            return invalid("hours_per_day", "must be > 0");
        }
        if self.active_start_hour >= self.active_end_hour {
            return invalid("active_start_hour", "must be < active_end_hour");
        }
        if self.active_end_hour > self.hours_per_day {
            return invalid("active_end_hour", "must be <= hours_per_day");
        }
        if self.peak_min >= self.peak_max {
            return invalid("peak_min", "must be < peak_max");
        }
        if !self.sigma_base.is_finite() || self.sigma_base < 0.0 {
            return invalid("sigma_base", "must be a finite number >= 0");
        }
        if !self.sigma_step.is_finite() || self.sigma_step < 0.0 {
            return invalid("sigma_step", "must be a finite number >= 0");
        }
        Ok(())
    }

    /// Total number of slots produced: `days × hours_per_day`.
    pub fn total_slots(&self) -> usize {
        self.days * self.hours_per_day
    }

    /// Hour at which the expected value stops rising and starts falling.
    pub fn peak_hour(&self) -> usize {
        self.active_start_hour + (self.active_end_hour - self.active_start_hour) / 2
    }

    /// Expected value and noise spread for `hour` of a day peaking at `peak`,
    /// or `None` outside the active window.
    fn phase(&self, hour: usize, peak: f64) -> Option<(f64, f64)> {
        if hour < self.active_start_hour || hour >= self.active_end_hour {
            return None;
        }

        let peak_hour = self.peak_hour();
        let rise_hours = (peak_hour - self.active_start_hour).max(1);
        let per_hour = peak / rise_hours as f64;

        if hour < peak_hour {
            let offset = (hour - self.active_start_hour) as f64;
            let mean = per_hour * (offset + 1.0);
            let sigma = self.sigma_base + self.sigma_step * offset;
            Some((mean, sigma))
        } else {
            let offset = (hour - peak_hour) as f64;
            let mean = peak - per_hour * (offset + 1.0);
            let top_sigma = self.sigma_base + self.sigma_step * rise_hours as f64;
            let sigma = (top_sigma - self.sigma_step * offset).max(0.0);
            Some((mean, sigma))
        }
    }
}

/// A generated horizon, flat and split by day.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProfile {
    /// All slots in time order.
    pub weekly: CapacityProfile,
    /// The same values, one vector per day.
    pub daily: Vec<Vec<f64>>,
}

/// Synthesizes a capacity profile from `config`, drawing all randomness
/// from `rng`.
///
/// Values are whole numbers: samples are clamped at zero and rounded half to
/// even.
///
/// # Errors
///
/// Returns a `GenerateError` if `config` fails [`ProfileConfig::validate`].
pub fn generate_capacity_profile<R: Rng + ?Sized>(
    config: &ProfileConfig,
    rng: &mut R,
) -> Result<GeneratedProfile, GenerateError> {
    config.validate()?;

    let mut weekly = Vec::with_capacity(config.total_slots());
    let mut daily = Vec::with_capacity(config.days);

    for _ in 0..config.days {
        let peak = f64::from(rng.random_range(config.peak_min..config.peak_max));
        let mut day = Vec::with_capacity(config.hours_per_day);

        for hour in 0..config.hours_per_day {
            let value = match config.phase(hour, peak) {
                None => 0.0,
                Some((mean, sigma)) => {
                    let y = normal(mean, sigma)?.sample(rng);
                    if y > 0.0 { y.round_ties_even() } else { 0.0 }
                }
            };
            day.push(value);
        }

        weekly.extend_from_slice(&day);
        daily.push(day);
    }

    Ok(GeneratedProfile {
        weekly: CapacityProfile::from_trusted(weekly),
        daily,
    })
}

pub(crate) fn normal(mean: f64, sigma: f64) -> Result<Normal<f64>, GenerateError> {
    Normal::new(mean, sigma).map_err(|e| GenerateError::InvalidParameter {
        field: "sigma",
        message: format!("N({mean}, {sigma}): {e}"),
    })
}
