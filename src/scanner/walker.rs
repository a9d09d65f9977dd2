//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which turns a list of root
//! directories into one flat, ordered list of regular-file paths. Roots are
//! walked in the order given; within a directory, entries keep the order the
//! operating system returns them in, and subdirectories are descended into
//! as soon as they are encountered (depth-first, pre-order).
//!
//! A root or subtree that cannot be listed is reported as a [`ScanError`]
//! item and skipped. The walk itself never aborts.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("/home/user/Downloads"), PathBuf::from("/mnt/backup")];
//! let (files, summary) = Walker::new(roots, WalkerConfig::default()).collect_files();
//! println!("{} files, {} unreadable entries", files.len(), summary.errors.len());
//! ```

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{ScanError, WalkerConfig};

/// Outcome of a complete walk.
#[derive(Debug, Default)]
pub struct WalkSummary {
    /// Number of regular files found
    pub files: usize,
    /// Roots and subtrees that were skipped
    pub errors: Vec<ScanError>,
}

/// Directory walker over one or more roots.
#[derive(Debug)]
pub struct Walker {
    roots: Vec<PathBuf>,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given roots.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self { roots, config }
    }

    /// Roots in walk order.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walk every root, yielding regular-file paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        self.roots.iter().flat_map(move |root| self.walk_root(root))
    }

    /// Walk every root and collect the file list, logging skipped entries.
    #[must_use]
    pub fn collect_files(&self) -> (Vec<PathBuf>, WalkSummary) {
        let mut files = Vec::new();
        let mut summary = WalkSummary::default();

        for result in self.walk() {
            match result {
                Ok(path) => files.push(path),
                Err(e) => summary.errors.push(e),
            }
        }

        summary.files = files.len();
        log::info!(
            "Walk complete: {} files under {} root(s), {} skipped",
            summary.files,
            self.roots.len(),
            summary.errors.len()
        );
        (files, summary)
    }

    fn walk_root<'a>(
        &'a self,
        root: &'a Path,
    ) -> Box<dyn Iterator<Item = Result<PathBuf, ScanError>> + 'a> {
        match std::fs::metadata(root) {
            Ok(m) if m.is_dir() => {}
            Ok(_) => {
                log::warn!("Skipping root that is not a directory: {}", root.display());
                return Box::new(std::iter::once(Err(ScanError::NotADirectory(
                    root.to_path_buf(),
                ))));
            }
            Err(e) => {
                log::warn!("Skipping unreadable root {}: {}", root.display(), e);
                return Box::new(std::iter::once(Err(ScanError::from_io(root, e))));
            }
        }

        log::debug!("Walking {}", root.display());
        let gitignore = self.build_gitignore(root);
        let skip_hidden = self.config.skip_hidden;

        let entries = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .min_depth(1)
            .into_iter()
            .filter_entry(move |entry| {
                if skip_hidden && is_hidden(entry) {
                    log::trace!("Skipping hidden entry: {}", entry.path().display());
                    return false;
                }
                !should_ignore(root, entry, gitignore.as_ref())
            });

        Box::new(entries.filter_map(move |entry| match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    Some(Ok(entry.into_path()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(self.handle_walk_error(root, e))),
        }))
    }

    /// Build gitignore matcher from the configured patterns.
    fn build_gitignore(&self, root: &Path) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Convert a walkdir error into a skipped-subtree error.
    fn handle_walk_error(&self, root: &Path, error: walkdir::Error) -> ScanError {
        let path = error.path().unwrap_or(root).to_path_buf();
        log::warn!("Skipping unreadable entry {}: {}", path.display(), error);

        match error.into_io_error() {
            Some(io) => ScanError::from_io(&path, io),
            // Symlink loops carry no I/O error.
            None => ScanError::Io {
                path,
                source: std::io::Error::other("filesystem loop"),
            },
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Check if an entry should be ignored based on configured patterns.
fn should_ignore(root: &Path, entry: &DirEntry, gitignore: Option<&Gitignore>) -> bool {
    let Some(gi) = gitignore else {
        return false;
    };

    let path = entry.path();
    let relative_path = path.strip_prefix(root).unwrap_or(path);
    let ignored = gi
        .matched(relative_path, entry.file_type().is_dir())
        .is_ignore();
    if ignored {
        log::trace!("Ignoring: {}", path.display());
    }
    ignored
}
