//! File actions module.
//!
//! Deleting the copies a scan found: move to the system trash (default,
//! recoverable) or remove permanently, one file at a time, reporting an
//! outcome per file.
//!
//! ```no_run
//! use dupesweep::actions::{delete_batch, DeleteMethod};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/dup1.txt"), PathBuf::from("/dup2.txt")];
//! let result = delete_batch(&paths, DeleteMethod::Trash);
//! println!("{}", result.summary());
//! ```

pub mod delete;

pub use delete::{
    delete_batch, delete_duplicates, delete_file, BatchDeleteResult, DeleteError, DeleteMethod,
    DeleteOutcome, DeleteResult,
};
