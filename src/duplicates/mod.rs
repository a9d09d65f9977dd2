//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Candidate grouping by a cheap per-mode key ([`groups`])
//! - Concurrent content hashing of the surviving candidates ([`pool`])
//! - Resolving hash buckets into duplicate groups, with text
//!   verification in `content` mode ([`resolver`])

pub mod groups;
pub mod pool;
pub mod resolver;

pub use groups::{
    direct_groups, files_to_hash, group_candidates, BucketKey, CandidateBucket, DuplicateGroup,
    GroupingStats, ParseModeError, ScanMode,
};
pub use pool::{
    default_worker_count, hash_candidates, worker_count_for, HashBucket, HashOutcome,
    HashPoolConfig, MAX_WORKERS, MIN_WORKERS,
};
pub use resolver::{resolve_content, resolve_exact, TextExtensions, DEFAULT_TEXT_EXTENSIONS};
