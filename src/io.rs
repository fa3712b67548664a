//! CSV file I/O for observation and result tables.
//!
//! - [`read_observations_csv`] loads an input file with a header row
//! - [`write_results_csv`] writes a [`ResultTable`] with a header row
//!
//! Input fields are not judged here: numbers become numeric cells, anything
//! else (including empty fields) is kept as text so that validation can report
//! it with its row and column.

use crate::table::{Cell, Number, Observation, ObservationTable, ResultTable};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::{File, create_dir_all};
use std::path::Path;

/// Read an input CSV file into an [`ObservationTable`].
///
/// Every column of the file becomes a column of every row.
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid CSV.
pub fn read_observations_csv(path: impl AsRef<Path>) -> Result<ObservationTable> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_observations(f).with_context(|| format!("read {}", path.display()))
}

/// Read input CSV from any reader. See [`read_observations_csv`].
///
/// # Errors
/// Returns an error if the input is not valid CSV.
pub fn read_observations<R: std::io::Read>(reader: R) -> Result<ObservationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .context("read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = ObservationTable::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("parse CSV record #{}", i + 1))?;
        let row: Observation = headers
            .iter()
            .zip(rec.iter())
            .map(|(h, field)| (h.clone(), to_cell(field)))
            .collect();
        table.push(row);
    }
    Ok(table)
}

fn to_cell(field: &str) -> Cell {
    match Number::parse(field) {
        Some(Number::Int(i)) => Cell::Int(i),
        Some(Number::Float(f)) => Cell::Float(f),
        None => Cell::Text(field.to_string()),
    }
}

/// Write a [`ResultTable`] to a CSV file, creating parent directories.
///
/// # Returns
/// The number of rows written.
///
/// # Errors
/// Returns an error if the file/dirs cannot be created or a row fails to write.
pub fn write_results_csv(path: impl AsRef<Path>, table: &ResultTable) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(f);
    wtr.write_record(table.columns())
        .context("write CSV header")?;
    for (i, row) in table.rows().iter().enumerate() {
        wtr.write_record(row.iter().map(ToString::to_string))
            .with_context(|| format!("write CSV row #{}", i + 1))?;
    }
    wtr.flush()?;
    Ok(table.len())
}
