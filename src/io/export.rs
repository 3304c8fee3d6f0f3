//! CSV and JSON export for placements, trial outcomes, grid summaries and
//! input statistics.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::alloc::{Heuristic, OrderKey, Task};
use crate::eval::{CombinationResult, GridResult, InstanceStats, TrialOutcome};

/// One row per task; placement columns are empty for unplaced tasks.
#[derive(Debug, Serialize)]
struct PlacementRow {
    id: usize,
    duration: usize,
    power: f64,
    start: Option<usize>,
    end: Option<usize>,
    slack: Option<f64>,
}

/// Flat per-combination summary shared by the CSV and JSON exports.
#[derive(Debug, Serialize)]
pub struct SummaryRow {
    pub order: OrderKey,
    pub heuristic: Heuristic,
    pub trials: usize,
    pub undefined: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
    pub mode_bin_start: f64,
}

impl From<&CombinationResult> for SummaryRow {
    fn from(c: &CombinationResult) -> Self {
        let s = c.summary();
        Self {
            order: c.order,
            heuristic: c.heuristic,
            trials: s.trials,
            undefined: s.undefined,
            mean: s.mean,
            std_dev: s.std_dev,
            min: s.min,
            median: s.median,
            max: s.max,
            mode_bin_start: s.mode_bin_start,
        }
    }
}

#[derive(Serialize)]
struct SummaryDocument {
    cancelled: bool,
    combinations: Vec<SummaryRow>,
}

/// Writes the placement of every task, in slice order.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_placements_csv(tasks: &[Task], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for t in tasks {
        let placement = t.placement();
        wtr.serialize(PlacementRow {
            id: t.id,
            duration: t.duration,
            power: t.power,
            start: placement.map(|p| p.start),
            end: placement.map(|p| p.end),
            slack: placement.map(|p| p.slack),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one row per trial. Undefined efficacy is an empty cell.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_outcomes_csv(outcomes: &[TrialOutcome], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for o in outcomes {
        wtr.serialize(o)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one summary row per combination.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summary_csv(combinations: &[CombinationResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for c in combinations {
        wtr.serialize(SummaryRow::from(c))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the grid summary as pretty-printed JSON. `NaN` statistics become
/// `null`.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_summary_json(grid: &GridResult, mut writer: impl Write) -> io::Result<()> {
    let doc = SummaryDocument {
        cancelled: grid.cancelled,
        combinations: grid.combinations.iter().map(SummaryRow::from).collect(),
    };
    serde_json::to_writer_pretty(&mut writer, &doc)?;
    writeln!(writer)?;
    writer.flush()
}

/// Writes input-distribution summaries as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_stats_json(stats: &InstanceStats, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, stats)?;
    writeln!(writer)?;
    writer.flush()
}

/// Opens `path` for buffered writing, truncating any existing file.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be created.
pub fn create(path: &Path) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// File name used for a combination's per-trial CSV inside an output
/// directory.
pub fn outcomes_file_name(order: OrderKey, heuristic: Heuristic) -> String {
    format!("{order}_{heuristic}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{CapacityProfile, allocate};

    fn outcome(trial: usize, efficacy: Option<f64>) -> TrialOutcome {
        TrialOutcome {
            order: OrderKey::Area,
            heuristic: Heuristic::NextFit,
            trial,
            seed: 10 + trial as u64,
            original_energy: 100.0,
            remaining_energy: 40.0,
            total_task_area: 80.0,
            placed: 3,
            unplaced: 1,
            efficacy,
        }
    }

    fn grid() -> GridResult {
        GridResult {
            combinations: vec![CombinationResult {
                order: OrderKey::Area,
                heuristic: Heuristic::NextFit,
                outcomes: vec![outcome(0, Some(0.75)), outcome(1, None)],
                cancelled: false,
            }],
            cancelled: false,
        }
    }

    #[test]
    fn unplaced_tasks_have_empty_placement_cells() {
        let mut profile = CapacityProfile::new(vec![4.0, 4.0]).unwrap();
        let mut tasks = vec![Task::new(0, 2, 3.0), Task::new(1, 1, 9.0)];
        allocate(&mut tasks, &mut profile, Heuristic::FirstFit).unwrap();

        let mut buf = Vec::new();
        write_placements_csv(&tasks, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,duration,power,start,end,slack");
        assert_eq!(lines[1], "0,2,3.0,0,1,2.0");
        assert_eq!(lines[2], "1,1,9.0,,,");
    }

    #[test]
    fn outcomes_csv_has_one_row_per_trial() {
        let mut buf = Vec::new();
        write_outcomes_csv(&grid().combinations[0].outcomes, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("order,heuristic,trial,seed"));
        assert!(lines[1].starts_with("area,next-fit,0,10"));
        assert!(lines[2].ends_with(','), "undefined efficacy is empty");
    }

    #[test]
    fn summary_csv_round_trip_parseable() {
        let mut buf = Vec::new();
        write_summary_csv(&grid().combinations, &mut buf).unwrap();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().unwrap();
        assert_eq!(headers.len(), 10);
        let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "area");
        assert_eq!(&rows[0][2], "2");
        assert_eq!(&rows[0][3], "1");
        assert_eq!(rows[0][4].parse::<f64>().ok(), Some(0.75));
    }

    #[test]
    fn summary_json_structure() {
        let mut buf = Vec::new();
        write_summary_json(&grid(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["cancelled"], false);
        assert_eq!(value["combinations"][0]["heuristic"], "next-fit");
        assert_eq!(value["combinations"][0]["undefined"], 1);
    }

    #[test]
    fn stats_json_names_each_distribution() {
        let stats = crate::eval::sample_instance_stats(
            &crate::generators::ProfileConfig::default(),
            &crate::generators::TaskConfig::default(),
            3,
            1,
        )
        .unwrap();
        let mut buf = Vec::new();
        write_stats_json(&stats, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["samples"], 3);
        assert_eq!(value["weekly_energy"]["trials"], 3);
        assert_eq!(value["daily_energy"]["trials"], 21);
        assert!(value["task_area"]["mean"].is_number());
    }

    #[test]
    fn deterministic_output() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        write_summary_json(&grid(), &mut a).unwrap();
        write_summary_json(&grid(), &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn file_names_use_selector_names() {
        assert_eq!(
            outcomes_file_name(OrderKey::Power, Heuristic::TrueBestFit),
            "power_true-best-fit.csv"
        );
    }
}
