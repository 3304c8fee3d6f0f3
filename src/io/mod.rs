//! File formats: numeric series, task lists, and result exports.

pub mod export;
pub mod series;
pub mod task_file;

pub use series::{
    read_profile_file, read_series, read_series_file, write_efficacy_series, write_series,
    write_series_file,
};
pub use task_file::{read_tasks, read_tasks_file, write_tasks, write_tasks_file};
