//! Core allocation types: capacity profile, tasks, placements, and the
//! ordering/heuristic selectors.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Available power per discrete time slot.
///
/// Values are validated on construction and only ever decrease afterwards,
/// through placements made by the allocation engine. A placement never
/// drives a slot below zero.
///
/// # Examples
///
/// ```
/// use stepfit::alloc::CapacityProfile;
///
/// let profile = CapacityProfile::new(vec![5.0, 5.0, 0.0, 3.0]).unwrap();
/// assert_eq!(profile.len(), 4);
/// assert_eq!(profile.total(), 13.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityProfile {
    values: Vec<f64>,
}

impl CapacityProfile {
    /// Builds a profile from raw slot values.
    ///
    /// # Errors
    ///
    /// Returns a `ProfileError` naming the first slot that is negative or
    /// not finite.
    pub fn new(values: Vec<f64>) -> Result<Self, ProfileError> {
        if let Some((slot, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ProfileError { slot, value });
        }
        Ok(Self { values })
    }

    /// Wraps values the caller has already produced as finite and `>= 0`.
    pub(crate) fn from_trusted(values: Vec<f64>) -> Self {
        debug_assert!(values.iter().all(|v| v.is_finite() && *v >= 0.0));
        Self { values }
    }

    /// Remaining capacity per slot.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of the remaining capacity over all slots.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Groups the slots into consecutive days of `slots_per_day` slots.
    ///
    /// The last group is shorter when the length is not a whole number of days.
    /// A zero day length yields no groups.
    pub fn by_day(&self, slots_per_day: usize) -> Vec<&[f64]> {
        if slots_per_day == 0 {
            return Vec::new();
        }
        self.values.chunks(slots_per_day).collect()
    }

    /// Sum of `capacity - power` over the inclusive window `[start, end]`.
    pub fn slack(&self, start: usize, end: usize, power: f64) -> f64 {
        self.values[start..=end].iter().map(|c| c - power).sum()
    }

    /// Subtracts `power` from every slot in `[start, end]`.
    ///
    /// Callers must have checked that every slot in the window holds at
    /// least `power`.
    pub(crate) fn consume(&mut self, start: usize, end: usize, power: f64) {
        for slot in &mut self.values[start..=end] {
            debug_assert!(*slot >= power);
            *slot -= power;
        }
    }
}

impl TryFrom<Vec<f64>> for CapacityProfile {
    type Error = ProfileError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

/// A placed task's window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub start: usize,
    pub end: usize,
    /// Excess capacity above the task's power summed over the window, measured
    /// just before the task was placed.
    pub slack: f64,
}

impl Placement {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// A unit of demand: `power` held for `duration` consecutive slots.
///
/// The placement is written once by the allocation engine; everything else is
/// fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Stable identity, preserved across sorting.
    pub id: usize,
    /// Number of contiguous slots required (the task "width").
    pub duration: usize,
    /// Power drawn in every slot of the window (the task "height").
    pub power: f64,
    placement: Option<Placement>,
}

impl Task {
    /// Creates an unplaced task.
    pub fn new(id: usize, duration: usize, power: f64) -> Self {
        Self {
            id,
            duration,
            power,
            placement: None,
        }
    }

    /// `times` unplaced copies sharing this task's id, for demand that must
    /// run several times over the horizon. Each copy is placed on its own.
    pub fn repeated(self, times: usize) -> impl Iterator<Item = Task> {
        std::iter::repeat_n(
            Task {
                placement: None,
                ..self
            },
            times,
        )
    }

    /// Energy demanded by the task: `duration × power`.
    pub fn area(&self) -> f64 {
        self.duration as f64 * self.power
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    pub(crate) fn place(&mut self, placement: Placement) {
        debug_assert!(self.placement.is_none(), "task {} placed twice", self.id);
        debug_assert_eq!(placement.len(), self.duration);
        self.placement = Some(placement);
    }
}

/// Error returned when parsing an [`OrderKey`] or [`Heuristic`] from text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {kind} \"{value}\", expected one of: {expected}")]
pub struct ParseSelectorError {
    kind: &'static str,
    value: String,
    expected: String,
}

/// Key used to sort tasks (descending) before allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderKey {
    Duration,
    Power,
    Area,
}

impl OrderKey {
    pub const ALL: [OrderKey; 3] = [OrderKey::Duration, OrderKey::Power, OrderKey::Area];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderKey::Duration => "duration",
            OrderKey::Power => "power",
            OrderKey::Area => "area",
        }
    }

    fn key(self, task: &Task) -> f64 {
        match self {
            OrderKey::Duration => task.duration as f64,
            OrderKey::Power => task.power,
            OrderKey::Area => task.area(),
        }
    }

    /// Compares two tasks so that larger keys sort first.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        self.key(b).total_cmp(&self.key(a))
    }

    /// Sorts tasks in place, descending by this key. Ties keep input order.
    pub fn sort(self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderKey {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "duration" | "width" => Ok(OrderKey::Duration),
            "power" | "height" => Ok(OrderKey::Power),
            "area" => Ok(OrderKey::Area),
            _ => Err(ParseSelectorError {
                kind: "order",
                value: s.to_string(),
                expected: "duration, power, area".to_string(),
            }),
        }
    }
}

/// Greedy placement heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Heuristic {
    /// Earliest feasible window, scanning from slot 0.
    FirstFit,
    /// Earliest feasible window at or after a cursor carried across tasks,
    /// wrapping to the front of the profile.
    NextFit,
    /// Reference best-fit: stops at the first feasible window and records
    /// its slack, so its placements match first-fit.
    BestFit,
    /// Feasible window with the largest slack, lowest start on ties.
    TrueBestFit,
}

impl Heuristic {
    pub const ALL: [Heuristic; 4] = [
        Heuristic::FirstFit,
        Heuristic::NextFit,
        Heuristic::BestFit,
        Heuristic::TrueBestFit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Heuristic::FirstFit => "first-fit",
            Heuristic::NextFit => "next-fit",
            Heuristic::BestFit => "best-fit",
            Heuristic::TrueBestFit => "true-best-fit",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Heuristic {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").as_str() {
            "first-fit" => Ok(Heuristic::FirstFit),
            "next-fit" => Ok(Heuristic::NextFit),
            "best-fit" => Ok(Heuristic::BestFit),
            "true-best-fit" => Ok(Heuristic::TrueBestFit),
            _ => Err(ParseSelectorError {
                kind: "heuristic",
                value: s.to_string(),
                expected: "first-fit, next-fit, best-fit, true-best-fit".to_string(),
            }),
        }
    }
}
