//! CSV output formatter.
//!
//! One row per file in a duplicate group.
//!
//! # Columns
//!
//! - `group_id`: 1-based group number
//! - `hash`: group key (hex digest, size, name or date, depending on mode)
//! - `path`: file path
//! - `size`: group size in bytes
//! - `original`: `true` for the first file of each group
//! - `modified`: last modified time (RFC 3339), or `unknown`

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    hash: &'a str,
    path: String,
    size: u64,
    original: bool,
    modified: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the CSV document, header included.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            for (position, path) in group.files.iter().enumerate() {
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    hash: &group.hash,
                    path: path.to_string_lossy().into_owned(),
                    size: group.size,
                    original: position == 0,
                    modified: modified_time(path),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Render the CSV document as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn modified_time(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|m| DateTime::<Utc>::from(m).to_rfc3339())
        .unwrap_or_else(|_| "unknown".to_string())
}
