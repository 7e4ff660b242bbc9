//! CSV format for load profiles.
//!
//! The first column is `timestep`; every further column is one named load
//! series in kW:
//!
//! ```text
//! timestep,winter,summer
//! 0,4.5,3.8
//! 1,4.2,3.5
//! ```

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::stores::LoadProfile;

/// Name of the mandatory first column.
pub const TIMESTEP_COLUMN: &str = "timestep";

/// Errors raised while reading or writing a load profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("first column must be \"timestep\", found \"{0}\"")]
    MissingTimestep(String),

    #[error("profile has no load series")]
    NoSeries,

    #[error("series \"{0}\" appears more than once")]
    DuplicateSeries(String),

    #[error("series name \"{0}\" is reserved")]
    ReservedSeries(String),

    #[error("profile has no rows")]
    Empty,

    #[error("row {row}, column \"{column}\": \"{value}\" is not a number")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("series \"{name}\" has {actual} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Parses a load profile from CSV.
///
/// # Errors
///
/// Returns [`ProfileError`] if the header is wrong or repeats a series name,
/// a cell is not numeric, or the file has no data rows.
pub fn read_profile(reader: impl Read) -> Result<LoadProfile, ProfileError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some(TIMESTEP_COLUMN) => {}
        other => return Err(ProfileError::MissingTimestep(other.unwrap_or("").to_string())),
    }
    let names: Vec<String> = columns.map(str::to_string).collect();
    if names.is_empty() {
        return Err(ProfileError::NoSeries);
    }
    // Series sit next to `timestep` in the submitted object, keyed by name.
    for (i, name) in names.iter().enumerate() {
        if name == TIMESTEP_COLUMN {
            return Err(ProfileError::ReservedSeries(name.clone()));
        }
        if names[..i].contains(name) {
            return Err(ProfileError::DuplicateSeries(name.clone()));
        }
    }

    let mut profile = LoadProfile::empty(&names);
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Row numbers are 1-based and count the header.
        let row = i + 2;
        let cell = |col: usize| record.get(col).unwrap_or("");

        let raw = cell(0);
        let step = raw.parse::<u32>().map_err(|_| ProfileError::InvalidCell {
            row,
            column: TIMESTEP_COLUMN.to_string(),
            value: raw.to_string(),
        })?;
        profile.timestep.push(step);

        for (j, name) in names.iter().enumerate() {
            let raw = cell(j + 1);
            let value = raw.parse::<f64>().map_err(|_| ProfileError::InvalidCell {
                row,
                column: name.clone(),
                value: raw.to_string(),
            })?;
            if let Some(series) = profile.series.get_mut(name) {
                series.push(value);
            }
        }
    }

    if profile.timestep.is_empty() {
        return Err(ProfileError::Empty);
    }
    Ok(profile)
}

/// Opens `path` and parses it with [`read_profile`].
///
/// # Errors
///
/// See [`read_profile`]; also fails if the file cannot be opened.
pub fn read_profile_path(path: &Path) -> Result<LoadProfile, ProfileError> {
    let file = File::open(path)?;
    read_profile(io::BufReader::new(file))
}

/// Writes a load profile as CSV to any writer.
///
/// # Errors
///
/// Returns [`ProfileError::LengthMismatch`] if a series is not as long as
/// the timestep column, or a CSV/IO error if writing fails.
pub fn write_profile(profile: &LoadProfile, writer: impl Write) -> Result<(), ProfileError> {
    let expected = profile.timestep.len();
    for (name, values) in &profile.series {
        if values.len() != expected {
            return Err(ProfileError::LengthMismatch {
                name: name.clone(),
                expected,
                actual: values.len(),
            });
        }
    }

    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(
        std::iter::once(TIMESTEP_COLUMN).chain(profile.series.keys().map(String::as_str)),
    )?;

    for (i, step) in profile.timestep.iter().enumerate() {
        let mut row = Vec::with_capacity(profile.series.len() + 1);
        row.push(step.to_string());
        row.extend(profile.series.values().map(|v| v[i].to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a load profile to a CSV file at the given path.
///
/// # Errors
///
/// See [`write_profile`]; also fails if the file cannot be created.
pub fn export_profile(profile: &LoadProfile, path: &Path) -> Result<(), ProfileError> {
    let file = File::create(path)?;
    write_profile(profile, io::BufWriter::new(file))
}
