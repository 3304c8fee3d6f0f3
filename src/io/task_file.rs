//! Task lists as CSV with an `id,duration,power` header.
//!
//! An optional `repeats` column schedules a row several times; each repeat
//! becomes its own task with the row's id.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alloc::Task;
use crate::error::TaskFileError;

#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    id: usize,
    duration: usize,
    power: f64,
    #[serde(default = "one", skip_serializing)]
    repeats: usize,
}

fn one() -> usize {
    1
}

/// Writes tasks in their current order.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_tasks(tasks: &[Task], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for t in tasks {
        wtr.serialize(TaskRecord {
            id: t.id,
            duration: t.duration,
            power: t.power,
            repeats: 1,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads unplaced tasks, expanding each row into `repeats` tasks (one when
/// the column is absent, none when it is zero). Values are not range-checked
/// here; allocation rejects zero durations and invalid power draws.
///
/// # Errors
///
/// Returns a `TaskFileError` naming the 1-based data record that failed to
/// parse.
pub fn read_tasks(reader: impl Read) -> Result<Vec<Task>, TaskFileError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut tasks = Vec::new();
    for (i, rec) in rdr.deserialize::<TaskRecord>().enumerate() {
        let r = rec.map_err(|source| TaskFileError::Record {
            record: i + 1,
            source,
        })?;
        tasks.extend(Task::new(r.id, r.duration, r.power).repeated(r.repeats));
    }
    Ok(tasks)
}

pub fn write_tasks_file(path: &Path, tasks: &[Task]) -> io::Result<()> {
    write_tasks(tasks, BufWriter::new(File::create(path)?))
}

pub fn read_tasks_file(path: &Path) -> Result<Vec<Task>, TaskFileError> {
    let file = File::open(path).map_err(csv::Error::from)?;
    read_tasks(file)
}
