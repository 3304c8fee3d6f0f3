//! Human-readable reports for single allocations, trial grids and input
//! distributions.

use std::fmt;

use crate::alloc::{AllocationReport, Heuristic, OrderKey, Task};
use crate::eval::{EfficacySummary, GridResult, InstanceStats};

/// Outcome of allocating one task list onto one profile.
#[derive(Debug)]
pub struct PlanReport<'a> {
    pub order: OrderKey,
    pub heuristic: Heuristic,
    /// Tasks in processing order, with their placements.
    pub tasks: &'a [Task],
    pub report: &'a AllocationReport,
    pub original_energy: f64,
    pub remaining_energy: f64,
    pub efficacy: Option<f64>,
}

impl fmt::Display for PlanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Allocation Report ---")?;
        writeln!(f, "Order / heuristic:   {} / {}", self.order, self.heuristic)?;
        writeln!(
            f,
            "Tasks placed:        {} of {}",
            self.report.placed,
            self.report.total()
        )?;
        writeln!(f, "Original energy:     {:.2}", self.original_energy)?;
        writeln!(f, "Remaining energy:    {:.2}", self.remaining_energy)?;
        writeln!(f, "Consumed energy:     {:.2}", self.report.consumed_energy)?;
        match self.efficacy {
            Some(e) => writeln!(f, "Efficacy:            {e:.4}")?,
            None => writeln!(f, "Efficacy:            undefined")?,
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:>6} {:>8} {:>10} {:>6} {:>6} {:>10}",
            "id", "duration", "power", "start", "end", "slack"
        )?;
        for t in self.tasks {
            match t.placement() {
                Some(p) => writeln!(
                    f,
                    "{:>6} {:>8} {:>10.2} {:>6} {:>6} {:>10.2}",
                    t.id, t.duration, t.power, p.start, p.end, p.slack
                )?,
                None => writeln!(
                    f,
                    "{:>6} {:>8} {:>10.2} {:>6} {:>6} {:>10}",
                    t.id, t.duration, t.power, "-", "-", "unplaced"
                )?,
            }
        }

        if self.report.unplaced.is_empty() {
            write!(f, "Unplaced:            none")
        } else {
            let ids: Vec<String> = self.report.unplaced.iter().map(usize::to_string).collect();
            write!(f, "Unplaced:            {}", ids.join(", "))
        }
    }
}

/// Summary table with one row per combination.
#[derive(Debug)]
pub struct GridTable<'a>(pub &'a GridResult);

impl fmt::Display for GridTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<9} {:<14} {:>7} {:>5} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "order", "heuristic", "trials", "undef", "mean", "sd", "min", "median", "max", "mode"
        )?;
        for c in &self.0.combinations {
            let s = c.summary();
            writeln!(
                f,
                "{:<9} {:<14} {:>7} {:>5} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
                c.order.as_str(),
                c.heuristic.as_str(),
                s.trials,
                s.undefined,
                s.mean,
                s.std_dev,
                s.min,
                s.median,
                s.max,
                s.mode_bin_start,
            )?;
        }
        if self.0.cancelled {
            write!(f, "(cancelled: results are partial)")?;
        }
        Ok(())
    }
}

/// One row per input distribution.
#[derive(Debug)]
pub struct StatsTable<'a>(pub &'a InstanceStats);

impl fmt::Display for StatsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: [(&str, &EfficacySummary); 4] = [
            ("weekly", &self.0.weekly_energy),
            ("daily", &self.0.daily_energy),
            ("active-slot", &self.0.active_slot_capacity),
            ("task-area", &self.0.task_area),
        ];
        writeln!(f, "{} instances from seed {}", self.0.samples, self.0.seed)?;
        write!(
            f,
            "{:<12} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "series", "n", "mean", "sd", "min", "median", "max", "mode"
        )?;
        for (name, s) in rows {
            write!(
                f,
                "\n{:<12} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                name, s.trials, s.mean, s.std_dev, s.min, s.median, s.max, s.mode_bin_start,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{CapacityProfile, allocate};
    use crate::eval::{CombinationResult, compute_efficacy};

    #[test]
    fn plan_report_lists_placed_and_unplaced() {
        let before = CapacityProfile::new(vec![5.0, 5.0, 5.0]).unwrap();
        let mut after = before.clone();
        let mut tasks = vec![Task::new(0, 2, 4.0), Task::new(1, 1, 8.0)];
        let report = allocate(&mut tasks, &mut after, Heuristic::FirstFit).unwrap();

        let text = PlanReport {
            order: OrderKey::Area,
            heuristic: Heuristic::FirstFit,
            tasks: &tasks,
            report: &report,
            original_energy: before.total(),
            remaining_energy: after.total(),
            efficacy: compute_efficacy(&before, &after, &tasks),
        }
        .to_string();

        assert!(text.contains("Tasks placed:        1 of 2"));
        assert!(text.contains("unplaced"));
        assert!(text.ends_with("Unplaced:            1"));
    }

    #[test]
    fn undefined_efficacy_is_spelled_out() {
        let report = AllocationReport {
            strategy: "first-fit",
            placed: 0,
            unplaced: Vec::new(),
            consumed_energy: 0.0,
        };
        let text = PlanReport {
            order: OrderKey::Power,
            heuristic: Heuristic::FirstFit,
            tasks: &[],
            report: &report,
            original_energy: 0.0,
            remaining_energy: 0.0,
            efficacy: None,
        }
        .to_string();
        assert!(text.contains("undefined"));
        assert!(text.ends_with("none"));
    }

    #[test]
    fn grid_table_has_header_and_row_per_combination() {
        let grid = GridResult {
            combinations: vec![
                CombinationResult {
                    order: OrderKey::Area,
                    heuristic: Heuristic::FirstFit,
                    outcomes: Vec::new(),
                    cancelled: true,
                },
                CombinationResult {
                    order: OrderKey::Area,
                    heuristic: Heuristic::NextFit,
                    outcomes: Vec::new(),
                    cancelled: true,
                },
            ],
            cancelled: true,
        };
        let text = GridTable(&grid).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("order"));
        assert!(lines[2].contains("next-fit"));
        assert!(lines[3].contains("cancelled"));
    }

    #[test]
    fn stats_table_has_row_per_distribution() {
        let stats = crate::eval::sample_instance_stats(
            &crate::generators::ProfileConfig::default(),
            &crate::generators::TaskConfig::default(),
            4,
            0,
        )
        .unwrap();
        let text = StatsTable(&stats).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("4 instances"));
        assert!(lines[2].starts_with("weekly"));
        assert!(lines[5].starts_with("task-area"));
    }
}
