//! Turning hash buckets into duplicate groups.
//!
//! `exact` mode reports every hash bucket with two or more members as one
//! group. `content` mode additionally verifies text files: when every member
//! of a bucket has a known text extension, the members are read as UTF-8
//! and split by exact text equality. A bucket that is not all-text, or has a
//! member that cannot be read as text, is reported whole as a hash group.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::groups::DuplicateGroup;
use super::pool::HashBucket;
use crate::scanner::{hash_text, hash_to_hex, read_text};

/// Extensions treated as text by default, lowercase and without the dot.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "js", "json", "html", "css", "xml", "md", "py", "java", "c", "cpp", "h", "cs",
];

/// Case-insensitive set of text file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextExtensions {
    extensions: HashSet<String>,
}

impl Default for TextExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_EXTENSIONS.iter().copied())
    }
}

impl TextExtensions {
    /// Build a set; entries may be given with or without a leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Check whether `path` has a text extension.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

/// Best-effort size of `path`, 0 if the stat fails.
fn size_of(path: &Path) -> u64 {
    match std::fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) => {
            log::debug!("Could not re-stat {}: {}", path.display(), e);
            0
        }
    }
}

fn hash_group(bucket: HashBucket) -> DuplicateGroup {
    let size = bucket.files.first().map_or(0, |f| size_of(f));
    DuplicateGroup::new(hash_to_hex(&bucket.digest), size, bucket.files)
}

/// Resolve hash buckets for `exact` mode.
///
/// Buckets with fewer than two members are dropped.
#[must_use]
pub fn resolve_exact(buckets: impl IntoIterator<Item = HashBucket>) -> Vec<DuplicateGroup> {
    buckets
        .into_iter()
        .filter(HashBucket::has_duplicates)
        .map(hash_group)
        .collect()
}

/// Resolve hash buckets for `content` mode.
#[must_use]
pub fn resolve_content(
    buckets: impl IntoIterator<Item = HashBucket>,
    text_extensions: &TextExtensions,
) -> Vec<DuplicateGroup> {
    let mut groups = Vec::new();

    for bucket in buckets.into_iter().filter(HashBucket::has_duplicates) {
        if !bucket.files.iter().all(|f| text_extensions.matches(f)) {
            groups.push(hash_group(bucket));
            continue;
        }

        match split_by_text(&bucket.files) {
            Some(sub_groups) => groups.extend(sub_groups),
            None => groups.push(hash_group(bucket)),
        }
    }

    groups
}

/// Partition `files` by exact text content.
///
/// Returns `None` if any member cannot be read as text, so the caller can
/// keep the bucket whole.
fn split_by_text(files: &[PathBuf]) -> Option<Vec<DuplicateGroup>> {
    let mut by_text: IndexMap<String, Vec<PathBuf>> = IndexMap::new();

    for file in files {
        match read_text(file) {
            Ok(text) => by_text.entry(text).or_default().push(file.clone()),
            Err(e) => {
                log::debug!("Text verification fell back to hash grouping: {}", e);
                return None;
            }
        }
    }

    if by_text.len() > 1 {
        log::debug!(
            "Digest bucket of {} files split into {} text groups",
            files.len(),
            by_text.len()
        );
    }

    Some(
        by_text
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(text, members)| {
                let size = size_of(&members[0]);
                DuplicateGroup::new(hash_to_hex(&hash_text(&text)), size, members)
            })
            .collect(),
    )
}
