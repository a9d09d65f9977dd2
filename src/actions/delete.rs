//! File deletion.
//!
//! Files go to the system trash by default (recoverable) or are removed
//! permanently on request. Every call checks that the target still exists
//! and is a regular file before touching it, and batches keep going after
//! a failure so one locked file does not block the rest.
//!
//! ```no_run
//! use dupesweep::actions::delete::{delete_file, DeleteMethod};
//! use std::path::Path;
//!
//! match delete_file(Path::new("/tmp/copy of report.txt"), DeleteMethod::Trash) {
//!     Ok(result) => println!("Freed {} bytes", result.size),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Target is a directory or special file.
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Trash operation failed.
    #[error("could not move {path} to trash: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Any other I/O failure.
    #[error("could not delete {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }

    /// Path the failed operation targeted.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAFile(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// How files are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteMethod {
    /// Move to the system trash
    #[default]
    Trash,
    /// Remove from the filesystem
    Permanent,
}

/// A completed deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    /// Path that was deleted
    pub path: PathBuf,
    /// Size of the file before deletion
    pub size: u64,
    /// How it was removed
    pub method: DeleteMethod,
}

/// Per-file outcome in the shape reported to callers:
/// `{ path, success, message | error }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub path: PathBuf,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteOutcome {
    fn from_result(path: &Path, result: &Result<DeleteResult, DeleteError>) -> Self {
        match result {
            Ok(del) => Self {
                path: path.to_path_buf(),
                success: true,
                message: Some(match del.method {
                    DeleteMethod::Trash => "File moved to trash".to_string(),
                    DeleteMethod::Permanent => "File deleted successfully".to_string(),
                }),
                error: None,
            },
            Err(e) => Self {
                path: path.to_path_buf(),
                success: false,
                message: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Results of a batch deletion.
#[derive(Debug, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files
    pub successes: Vec<DeleteResult>,
    /// Failed deletions
    pub failures: Vec<DeleteError>,
    /// One outcome per requested path, in request order
    pub outcomes: Vec<DeleteOutcome>,
}

impl BatchDeleteResult {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total bytes freed.
    #[must_use]
    pub fn bytes_freed(&self) -> u64 {
        self.successes.iter().map(|r| r.size).sum()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize::b(self.bytes_freed());
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Delete one regular file.
///
/// # Errors
///
/// - `NotFound` / `PermissionDenied` / `Io` if the file cannot be stat'ed
///   or removed
/// - `NotAFile` if the path is a directory or special file (FIFO, socket,
///   device). Symlinks are removed themselves, never their target.
/// - `TrashFailed` if the trash backend refuses the file
pub fn delete_file(path: &Path, method: DeleteMethod) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
    let file_type = metadata.file_type();
    if !(file_type.is_file() || file_type.is_symlink()) {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }
    let size = metadata.len();

    match method {
        DeleteMethod::Trash => {
            trash::delete(path).map_err(|e| DeleteError::TrashFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
        }
        DeleteMethod::Permanent => {
            fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;
            log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
        }
    }

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        method,
    })
}

/// Delete `paths` one after another, continuing past failures.
pub fn delete_batch(paths: &[PathBuf], method: DeleteMethod) -> BatchDeleteResult {
    let mut batch = BatchDeleteResult::default();

    for path in paths {
        let result = delete_file(path, method);
        batch.outcomes.push(DeleteOutcome::from_result(path, &result));
        match result {
            Ok(del) => batch.successes.push(del),
            Err(e) => {
                log::warn!("{}", e);
                batch.failures.push(e);
            }
        }
    }

    log::debug!("{}", batch.summary());
    batch
}

/// Delete every member of `group` except the first.
pub fn delete_duplicates(group: &DuplicateGroup, method: DeleteMethod) -> BatchDeleteResult {
    delete_batch(group.duplicates(), method)
}
