//! TOML-based experiment configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alloc::{Heuristic, OrderKey};
use crate::error::GenerateError;
use crate::generators::{ProfileConfig, TaskConfig};

/// Top-level experiment configuration parsed from TOML.
///
/// All sections have defaults matching the `reference` preset. Load from
/// TOML with [`ExperimentConfig::from_toml_file`] or pick a preset with
/// [`ExperimentConfig::from_preset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Synthetic capacity profile shape.
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Synthetic task batch parameters.
    #[serde(default)]
    pub tasks: TaskConfig,
    /// Trial count, seeding and parallelism.
    #[serde(default)]
    pub trials: TrialsConfig,
    /// Orderings and heuristics to evaluate.
    #[serde(default)]
    pub grid: GridConfig,
}

/// Trial count, seeding and parallelism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrialsConfig {
    /// Trials per (order, heuristic) combination (must be > 0).
    pub count: usize,
    /// Base seed; trial `i` uses `seed + i`.
    pub seed: u64,
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
}

impl Default for TrialsConfig {
    fn default() -> Self {
        Self {
            count: 5000,
            seed: 42,
            threads: 0,
        }
    }
}

/// Orderings and heuristics to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub orders: Vec<OrderKey>,
    pub heuristics: Vec<Heuristic>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            orders: OrderKey::ALL.to_vec(),
            heuristics: vec![Heuristic::FirstFit, Heuristic::NextFit, Heuristic::BestFit],
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"trials.count"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn from_generate(section: &str, err: GenerateError) -> Self {
        match err {
            GenerateError::InvalidParameter { field, message } => {
                Self::new(format!("{section}.{field}"), message)
            }
            other => Self::new(section, other.to_string()),
        }
    }
}

impl ExperimentConfig {
    /// Returns the reference experiment: 20 tasks with power ~ N(20, 100)
    /// against a week of hourly capacity, 5000 trials, first/next/best-fit.
    pub fn reference() -> Self {
        Self::default()
    }

    /// Returns a short smoke-test run over all four heuristics.
    pub fn quick() -> Self {
        Self {
            trials: TrialsConfig {
                count: 200,
                ..TrialsConfig::default()
            },
            grid: GridConfig {
                heuristics: Heuristic::ALL.to_vec(),
                ..GridConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns a crowded workload: many mid-sized tasks competing for a
    /// weaker week.
    pub fn dense() -> Self {
        Self {
            profile: ProfileConfig {
                peak_min: 60,
                peak_max: 250,
                ..ProfileConfig::default()
            },
            tasks: TaskConfig {
                count: 60,
                mean_power: 40.0,
                sigma_power: 60.0,
                ..TaskConfig::default()
            },
            trials: TrialsConfig {
                count: 1000,
                ..TrialsConfig::default()
            },
            grid: GridConfig {
                heuristics: Heuristic::ALL.to_vec(),
                ..GridConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["reference", "quick", "dense"];

    /// Loads an experiment from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "reference" => Ok(Self::reference()),
            "quick" => Ok(Self::quick()),
            "dense" => Ok(Self::dense()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses an experiment from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses an experiment from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.profile.validate() {
            errors.push(ConfigError::from_generate("profile", e));
        }
        if let Err(e) = self.tasks.validate() {
            errors.push(ConfigError::from_generate("tasks", e));
        }

        if self.trials.count == 0 {
            errors.push(ConfigError::new("trials.count", "must be > 0"));
        }

        let grid = &self.grid;
        if grid.orders.is_empty() {
            errors.push(ConfigError::new("grid.orders", "must list at least one order"));
        }
        if grid.heuristics.is_empty() {
            errors.push(ConfigError::new(
                "grid.heuristics",
                "must list at least one heuristic",
            ));
        }
        if has_duplicates(&grid.orders) {
            errors.push(ConfigError::new("grid.orders", "contains duplicates"));
        }
        if has_duplicates(&grid.heuristics) {
            errors.push(ConfigError::new("grid.heuristics", "contains duplicates"));
        }

        errors
    }
}

fn has_duplicates<T: Ord + Copy>(items: &[T]) -> bool {
    let mut sorted = items.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).any(|w| w[0] == w[1])
}
