//! Error types shared across the crate.

use thiserror::Error;

/// Input rejected by [`crate::alloc::allocate`] before any mutation happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocError {
    #[error("capacity profile is empty")]
    EmptyProfile,

    #[error("task {id} (position {index}): duration must be > 0")]
    ZeroDuration { index: usize, id: usize },

    #[error("task {id} (position {index}): power draw must be a finite number >= 0, got {power}")]
    InvalidPower { index: usize, id: usize, power: f64 },

    #[error("task {id} (position {index}) is already placed")]
    AlreadyPlaced { index: usize, id: usize },
}

/// A capacity value that cannot appear in a profile.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("slot {slot}: capacity must be a finite number >= 0, got {value}")]
pub struct ProfileError {
    pub slot: usize,
    pub value: f64,
}

/// Failure while synthesizing profiles or tasks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("invalid generator parameter `{field}`: {message}")]
    InvalidParameter { field: &'static str, message: String },

    #[error("no sample >= {min} after {attempts} draws from N({mean}, {sigma})")]
    RejectionExhausted {
        mean: f64,
        sigma: f64,
        min: f64,
        attempts: usize,
    },
}

/// Failure while running a batch of trials.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Failure reading a newline-separated numeric series.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: cannot parse \"{value}\" as a number")]
    Parse { line: usize, value: String },

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Failure reading a task CSV file.
#[derive(Debug, Error)]
pub enum TaskFileError {
    #[error("task file record {record}: {source}")]
    Record { record: usize, source: csv::Error },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
