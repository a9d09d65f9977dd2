//! Output formatters for scan reports.
//!
//! - [`text`]: human-readable summary for the terminal
//! - [`json`]: the completion report plus a summary, for scripting
//! - [`csv`]: one row per file, for spreadsheets
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Instant;
//! use dupesweep::duplicates::ScanMode;
//! use dupesweep::error::ExitCode;
//! use dupesweep::output::{json::JsonOutput, ScanSummary};
//! use dupesweep::progress::NoopObserver;
//! use dupesweep::session::{ScanOptions, ScanRequest, ScanSession};
//!
//! let started = Instant::now();
//! let session = ScanSession::new(
//!     ScanRequest::new(vec![".".into()], ScanMode::Exact),
//!     ScanOptions::default(),
//! );
//! let handle = session.handle();
//! let report = session.run(Arc::new(NoopObserver));
//!
//! let summary = ScanSummary::new(&report, handle.counters(), started.elapsed());
//! let output = JsonOutput::new(&report, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::time::Duration;

use serde::Serialize;

use crate::session::{CounterSnapshot, ScanReport};

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// Figures describing one finished scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Regular files found by the walk
    pub total_files: usize,
    /// Files selected for hashing
    pub files_to_hash: usize,
    /// Files the hash pool attempted
    pub files_hashed: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files in duplicate groups beyond the first of each
    pub duplicate_files: usize,
    /// Bytes freed by keeping one file per group
    pub reclaimable_space: u64,
    /// Wall-clock duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was cancelled
    pub cancelled: bool,
}

impl ScanSummary {
    #[must_use]
    pub fn new(report: &ScanReport, counters: CounterSnapshot, elapsed: Duration) -> Self {
        Self {
            total_files: counters.files_found,
            files_to_hash: counters.files_to_hash,
            files_hashed: counters.files_hashed,
            duplicate_groups: report.duplicates.len(),
            duplicate_files: report
                .duplicates
                .iter()
                .map(|g| g.duplicate_count())
                .sum(),
            reclaimable_space: report.reclaimable_bytes(),
            scan_duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            cancelled: report.cancelled,
        }
    }
}
