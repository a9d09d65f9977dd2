//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//! This module provides the [`Hasher`] struct for computing BLAKE3 digests
//! of file contents through a fixed-size read buffer, so a file is never
//! held in memory as a whole. It also provides [`read_text`], used by the
//! content-verification pass to compare candidate text files.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::{HashError, TextError};

/// Size of the read buffer used while streaming a file into the hasher.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// 32-byte BLAKE3 digest.
pub type Digest = [u8; 32];

/// Streaming file hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default read buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: READ_BUFFER_SIZE,
        }
    }

    /// Use a different read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Hash the full contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Digest of an in-memory text, used to key text-verified groups.
#[must_use]
pub fn hash_text(text: &str) -> Digest {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Read the whole file at `path` as UTF-8 text.
///
/// # Errors
///
/// Returns [`TextError::Decode`] when the bytes are not valid UTF-8 and
/// [`TextError::Io`] for any read failure.
pub fn read_text(path: &Path) -> Result<String, TextError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::InvalidData => Err(TextError::Decode(path.to_path_buf())),
        Err(e) => Err(TextError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Render a digest as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Digest) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}
