//! JSON output formatter.
//!
//! The document is the completion report with a summary added:
//!
//! ```json
//! {
//!   "success": true,
//!   "cancelled": false,
//!   "duplicates": [
//!     { "hash": "af13…", "size": 1024, "files": ["/a/x.bin", "/b/x.bin"] }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "duplicate_groups": 1,
//!     "reclaimable_space": 1024,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::ScanSummary;
use crate::error::ExitCode;
use crate::session::ScanReport;

/// Summary block with the process exit code attached.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    #[serde(flatten)]
    pub summary: ScanSummary,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    #[serde(flatten)]
    pub report: &'a ScanReport,
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    #[must_use]
    pub fn new(report: &'a ScanReport, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            report,
            summary: JsonSummary {
                summary: summary.clone(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
