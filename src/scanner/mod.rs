//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Recursive directory walking using walkdir
//! - Streaming content hashing with BLAKE3
//! - Reading candidate files as UTF-8 text for content verification
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming) and text reads
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

// Re-export main types
pub use hasher::{hash_text, hash_to_hex, read_text, Digest, Hasher, READ_BUFFER_SIZE};
pub use walker::{WalkSummary, Walker};

/// Metadata for a discovered file.
///
/// Built from a single stat call. Files whose stat fails never become a
/// `FileRecord` and are left out of size and date grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<SystemTime>,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }

    /// Stat `path` and build a record from its metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the metadata cannot be read or the path
    /// is not a regular file.
    pub fn stat(path: &Path) -> Result<Self, ScanError> {
        let metadata = std::fs::metadata(path).map_err(|e| ScanError::from_io(path, e))?;
        if !metadata.is_file() {
            return Err(ScanError::NotAFile(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Configuration for directory walking.
///
/// The default walk lists every regular file, in OS order, without
/// following symlinks.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style).
    pub ignore_patterns: Vec<String>,
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
            ignore_patterns,
        }
    }
}

/// Errors that can occur while walking or stat-ing files.
///
/// None of these abort a scan: the affected subtree or file is skipped.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The path exists but is not a regular file.
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::NotAFile(p)
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Errors that can occur when reading a candidate as text.
#[derive(thiserror::Error, Debug)]
pub enum TextError {
    /// The file could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file contents are not valid UTF-8.
    #[error("Not valid UTF-8 text: {0}")]
    Decode(PathBuf),
}
