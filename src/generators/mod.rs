//! Synthetic inputs for trials: capacity profiles and task batches.
//!
//! Both generators take the random source as a parameter so callers control
//! seeding.

/// Bell-shaped daily production curves.
pub mod profile;
/// Randomized task batches.
pub mod tasks;

pub use profile::{GeneratedProfile, ProfileConfig, generate_capacity_profile};
pub use tasks::{TaskConfig, generate_tasks};
