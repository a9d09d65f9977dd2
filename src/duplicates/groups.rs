//! Candidate grouping and duplicate group types.
//!
//! # Overview
//!
//! Grouping is the first phase of every scan. Each file gets one cheap key,
//! computed once, according to the selected [`ScanMode`]:
//!
//! | Mode | Key |
//! |---|---|
//! | `exact`, `content`, `sizeOnly` | byte size from stat |
//! | `filename` | case-sensitive base name |
//! | `date` | modification time truncated to the local day |
//!
//! Files sharing a key form a [`CandidateBucket`]. Only buckets with two or
//! more members survive. For `sizeOnly`, `filename` and `date` the surviving
//! buckets are already the final answer; the hashing modes pass them on to
//! the concurrent hasher.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::{group_candidates, ScanMode};
//! use std::path::PathBuf;
//!
//! let files = vec![PathBuf::from("/a/report.txt"), PathBuf::from("/b/report.txt")];
//! let (buckets, stats) = group_candidates(&files, ScanMode::Filename);
//!
//! assert_eq!(buckets.len(), 1);
//! assert_eq!(stats.potential_duplicates, 2);
//! ```

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::scanner::FileRecord;

/// Equivalence strategy selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanMode {
    /// Same size and same content digest.
    #[default]
    Exact,
    /// Same digest, refined by text equality for text files.
    Content,
    /// Same size only.
    SizeOnly,
    /// Same base name.
    Filename,
    /// Same modification day.
    Date,
}

impl ScanMode {
    /// All modes, in display order.
    pub const ALL: [ScanMode; 5] = [
        ScanMode::Exact,
        ScanMode::Content,
        ScanMode::SizeOnly,
        ScanMode::Filename,
        ScanMode::Date,
    ];

    /// Wire name of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScanMode::Exact => "exact",
            ScanMode::Content => "content",
            ScanMode::SizeOnly => "sizeOnly",
            ScanMode::Filename => "filename",
            ScanMode::Date => "date",
        }
    }

    /// Whether candidates must be confirmed by content hashing.
    #[must_use]
    pub fn uses_hashing(self) -> bool {
        matches!(self, ScanMode::Exact | ScanMode::Content)
    }

    /// Compute the cheap grouping key for `path`.
    ///
    /// Returns `None` when the key cannot be computed (stat failure, no
    /// modification time, no file name); the file is then left out.
    #[must_use]
    pub fn candidate_key(self, path: &Path) -> Option<BucketKey> {
        match self {
            ScanMode::Exact | ScanMode::Content | ScanMode::SizeOnly => {
                stat_or_skip(path).map(|record| BucketKey::Size(record.size))
            }
            ScanMode::Filename => path.file_name().map(|name| BucketKey::Name(name.to_owned())),
            ScanMode::Date => {
                let modified = stat_or_skip(path)?.modified?;
                let day = DateTime::<Local>::from(modified).date_naive();
                Some(BucketKey::Day(day))
            }
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scan mode '{0}' (expected exact, content, sizeOnly, filename or date)")]
pub struct ParseModeError(pub String);

impl FromStr for ScanMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(ScanMode::Exact),
            "content" => Ok(ScanMode::Content),
            "sizeOnly" | "size-only" | "size" => Ok(ScanMode::SizeOnly),
            "filename" | "name" => Ok(ScanMode::Filename),
            "date" => Ok(ScanMode::Date),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

fn stat_or_skip(path: &Path) -> Option<FileRecord> {
    match FileRecord::stat(path) {
        Ok(record) => Some(record),
        Err(e) => {
            log::debug!("Excluding from grouping: {}", e);
            None
        }
    }
}

/// Cheap key shared by the members of a candidate bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BucketKey {
    /// File size in bytes
    Size(u64),
    /// Base name, compared case-sensitively
    Name(OsString),
    /// Local calendar day of the last modification
    Day(NaiveDate),
}

impl BucketKey {
    /// Key reported for a group built directly from this bucket.
    #[must_use]
    pub fn surrogate(&self) -> String {
        match self {
            BucketKey::Size(size) => size.to_string(),
            BucketKey::Name(name) => name.to_string_lossy().into_owned(),
            BucketKey::Day(day) => day.format("%Y-%m-%d").to_string(),
        }
    }

    /// Size reported for a group built directly from this bucket.
    ///
    /// Name and date buckets may mix sizes, so they report 0.
    #[must_use]
    pub fn reported_size(&self) -> u64 {
        match self {
            BucketKey::Size(size) => *size,
            BucketKey::Name(_) | BucketKey::Day(_) => 0,
        }
    }
}

/// Files sharing one cheap key, in walk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBucket {
    /// Shared key
    pub key: BucketKey,
    /// Member paths in walk order
    pub files: Vec<PathBuf>,
}

impl CandidateBucket {
    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Convert into a final group without any content check.
    #[must_use]
    pub fn into_group(self) -> DuplicateGroup {
        DuplicateGroup::new(self.key.surrogate(), self.key.reported_size(), self.files)
    }
}

/// Confirmed duplicate group of files.
///
/// This is the shape reported to callers: `{ hash, size, files }`. The first
/// path is, by convention, the one to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Group key: hex digest, stringified size, base name or ISO date
    pub hash: String,
    /// Size in bytes shared by the members, or 0 when sizes may differ
    pub size: u64,
    /// Member paths, at least two
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: String, size: u64, files: Vec<PathBuf>) -> Self {
        debug_assert!(files.len() >= 2, "duplicate group needs at least two files");
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file treated as the original.
    #[must_use]
    pub fn original(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    /// Removable candidates: every member except the original.
    #[must_use]
    pub fn duplicates(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space freed by removing every copy but the original.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Statistics from the grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files considered
    pub total_files: usize,
    /// Files left out because their key could not be computed
    pub excluded: usize,
    /// Number of distinct keys
    pub unique_keys: usize,
    /// Number of buckets with 2+ files
    pub buckets: usize,
    /// Number of files in buckets with 2+ files
    pub potential_duplicates: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            let eliminated = self.total_files - self.potential_duplicates;
            (eliminated as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Partition `files` into candidate buckets for `mode`.
///
/// Each file's key is computed exactly once, so the buckets are disjoint.
/// Buckets come back in first-seen key order, members in input order, and
/// only buckets with at least two members are returned.
#[must_use]
pub fn group_candidates(
    files: &[PathBuf],
    mode: ScanMode,
) -> (Vec<CandidateBucket>, GroupingStats) {
    let mut all: IndexMap<BucketKey, Vec<PathBuf>> = IndexMap::new();
    let mut stats = GroupingStats {
        total_files: files.len(),
        ..Default::default()
    };

    for path in files {
        match mode.candidate_key(path) {
            Some(key) => all.entry(key).or_default().push(path.clone()),
            None => stats.excluded += 1,
        }
    }

    stats.unique_keys = all.len();

    let buckets: Vec<CandidateBucket> = all
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(key, files)| {
            stats.potential_duplicates += files.len();
            log::trace!("Bucket {:?}: {} candidates", key, files.len());
            CandidateBucket { key, files }
        })
        .collect();
    stats.buckets = buckets.len();

    log::info!(
        "Grouping ({}) complete: {} files → {} candidates in {} buckets ({:.1}% eliminated, {} excluded)",
        mode,
        stats.total_files,
        stats.potential_duplicates,
        stats.buckets,
        stats.elimination_rate(),
        stats.excluded
    );

    (buckets, stats)
}

/// Turn buckets into final groups without hashing.
///
/// Used by `sizeOnly`, `filename` and `date` modes.
#[must_use]
pub fn direct_groups(buckets: Vec<CandidateBucket>) -> Vec<DuplicateGroup> {
    buckets.into_iter().map(CandidateBucket::into_group).collect()
}

/// Flatten buckets into the list of files to hash, in bucket order.
#[must_use]
pub fn files_to_hash(buckets: &[CandidateBucket]) -> Vec<PathBuf> {
    buckets
        .iter()
        .flat_map(|bucket| bucket.files.iter().cloned())
        .collect()
}
