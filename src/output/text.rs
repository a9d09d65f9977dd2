//! Human-readable report for the terminal.

use std::io::{self, Write};

use bytesize::ByteSize;

use super::ScanSummary;
use crate::session::ScanReport;

/// Plain-text rendering of a report.
pub struct TextOutput<'a> {
    report: &'a ScanReport,
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    #[must_use]
    pub fn new(report: &'a ScanReport, summary: &'a ScanSummary) -> Self {
        Self { report, summary }
    }

    /// Write every group followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(error) = &self.report.error {
            writeln!(writer, "Scan failed: {error}")?;
            return Ok(());
        }

        for (idx, group) in self.report.duplicates.iter().enumerate() {
            writeln!(
                writer,
                "Group {} ({} files, {} each) [{}]",
                idx + 1,
                group.len(),
                ByteSize::b(group.size),
                group.hash
            )?;
            for (position, path) in group.files.iter().enumerate() {
                let marker = if position == 0 { "keep" } else { "dup " };
                writeln!(writer, "  {marker} {}", path.display())?;
            }
            writeln!(writer)?;
        }

        self.write_summary(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let s = self.summary;
        if self.report.cancelled {
            writeln!(writer, "Scan cancelled; results cover the files hashed so far.")?;
        }
        if s.duplicate_groups == 0 {
            writeln!(writer, "No duplicates found among {} files.", s.total_files)?;
        } else {
            writeln!(
                writer,
                "{} duplicate group(s), {} redundant file(s), {} reclaimable.",
                s.duplicate_groups,
                s.duplicate_files,
                ByteSize::b(s.reclaimable_space)
            )?;
        }
        writeln!(
            writer,
            "Scanned {} files, hashed {} of {} candidates in {} ms.",
            s.total_files, s.files_hashed, s.files_to_hash, s.scan_duration_ms
        )
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
