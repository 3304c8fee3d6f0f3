//! Newline-separated numeric series: one value per line, `NaN` for missing.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::alloc::CapacityProfile;
use crate::error::SeriesError;

/// Writes one value per line using the shortest representation that parses
/// back to the same `f64`.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_series(
    values: impl IntoIterator<Item = f64>,
    mut writer: impl Write,
) -> io::Result<()> {
    for v in values {
        writeln!(writer, "{v}")?;
    }
    writer.flush()
}

/// Writes an efficacy series, with `NaN` standing in for undefined trials.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_efficacy_series(values: &[Option<f64>], writer: impl Write) -> io::Result<()> {
    write_series(values.iter().map(|v| v.unwrap_or(f64::NAN)), writer)
}

/// Reads a series, skipping blank lines.
///
/// # Errors
///
/// Returns a `SeriesError` naming the 1-based line of the first value that
/// does not parse.
pub fn read_series(reader: impl BufRead) -> Result<Vec<f64>, SeriesError> {
    let mut values = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed.parse::<f64>().map_err(|_| SeriesError::Parse {
            line: i + 1,
            value: trimmed.to_string(),
        })?;
        values.push(value);
    }
    Ok(values)
}

pub fn write_series_file(path: &Path, values: impl IntoIterator<Item = f64>) -> io::Result<()> {
    write_series(values, BufWriter::new(File::create(path)?))
}

pub fn read_series_file(path: &Path) -> Result<Vec<f64>, SeriesError> {
    read_series(BufReader::new(File::open(path)?))
}

/// Reads a capacity profile from a series file.
///
/// # Errors
///
/// Returns a `SeriesError` if the file cannot be read or parsed, or if a
/// value is not a valid capacity.
pub fn read_profile_file(path: &Path) -> Result<CapacityProfile, SeriesError> {
    Ok(CapacityProfile::new(read_series_file(path)?)?)
}
