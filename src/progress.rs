//! Scan events and the observers that receive them.
//!
//! A scan emits zero or more [`ScanProgress`] events while hashing and
//! exactly one [`ScanReport`] when it finishes. Callers receive them through
//! a [`ScanObserver`]:
//!
//! - [`NoopObserver`] discards everything.
//! - [`ChannelObserver`] forwards [`ScanEvent`]s over a channel, for callers
//!   that consume events on another thread (a UI event loop, a socket).
//! - [`Progress`] draws an indicatif progress bar on the terminal.

use std::path::PathBuf;
use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;

use crate::session::ScanReport;

/// Live progress of the hashing phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    /// Regular files found by the walk
    pub total_files_found: usize,
    /// Files selected for hashing
    pub total_to_hash: usize,
    /// Files attempted so far (hashed or skipped)
    pub hashed: usize,
    /// File whose result produced this event
    pub current_file: Option<PathBuf>,
}

/// Event stream delivered to an external caller.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ScanEvent {
    /// Hashing progress
    Progress(ScanProgress),
    /// Terminal report, sent exactly once
    Done(ScanReport),
}

/// Receives scan events.
///
/// `on_progress` is called from the thread aggregating hash results, one
/// call per event, in increasing `hashed` order. `on_complete` is called
/// exactly once per scan.
pub trait ScanObserver: Send + Sync {
    /// Called for each progress event.
    fn on_progress(&self, progress: &ScanProgress);

    /// Called once with the terminal report.
    fn on_complete(&self, _report: &ScanReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_progress(&self, _progress: &ScanProgress) {}
}

/// Observer forwarding events over a crossbeam channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: Sender<ScanEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<ScanEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl ScanObserver for ChannelObserver {
    fn on_progress(&self, progress: &ScanProgress) {
        // A caller that dropped its receiver no longer wants events.
        let _ = self.sender.send(ScanEvent::Progress(progress.clone()));
    }

    fn on_complete(&self, report: &ScanReport) {
        let _ = self.sender.send(ScanEvent::Done(report.clone()));
    }
}

/// Terminal progress reporter using indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bar will be displayed.
    /// # Examples
    ///
    /// ```
    /// use dupesweep::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix} [{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ScanObserver for Progress {
    fn on_progress(&self, progress: &ScanProgress) {
        if self.quiet {
            return;
        }

        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let bar = guard.get_or_insert_with(|| {
            let pb = ProgressBar::with_draw_target(
                Some(progress.total_to_hash as u64),
                ProgressDrawTarget::stderr(),
            );
            pb.set_style(Self::style());
            pb.set_prefix(format!("{} files found", progress.total_files_found));
            pb
        });

        bar.set_position(progress.hashed as u64);
        match &progress.current_file {
            Some(path) => bar.set_message(truncate_path(&path.to_string_lossy(), 30)),
            None => bar.set_message("Hashing"),
        }
    }

    fn on_complete(&self, report: &ScanReport) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = guard.take() {
            if report.cancelled {
                pb.abandon_with_message("Cancelled");
            } else {
                pb.finish_with_message("Hashing complete");
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
