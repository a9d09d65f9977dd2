//! Concurrent content hashing.
//!
//! # Overview
//!
//! The hashing phase runs a fixed number of workers on a dedicated rayon
//! thread pool. Workers share one atomic cursor into the list of files to
//! hash. Each worker loops:
//!
//! 1. poll the [`CancelToken`]; stop if it is set,
//! 2. claim the next index from the cursor; stop if the list is exhausted,
//! 3. hash that file and send one message to the aggregator.
//!
//! The aggregator runs on the calling thread and is the only writer of the
//! digest map and of the `files_hashed` counter, so every attempted file
//! contributes exactly one counter increment and at most one map entry. It
//! also emits one [`ScanProgress`] event per message.
//!
//! A file that cannot be read is skipped; it is never retried and never
//! stops the pool. Cancellation does not interrupt a read in flight.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use indexmap::IndexMap;

use crate::error::ScanFailure;
use crate::progress::{ScanObserver, ScanProgress};
use crate::scanner::{Digest, HashError, Hasher};
use crate::session::{CancelToken, ScanCounters};

/// Lower bound of the default worker count.
pub const MIN_WORKERS: usize = 4;

/// Upper bound of the default worker count.
pub const MAX_WORKERS: usize = 16;

/// Worker count for a machine with `cores` logical cores:
/// `clamp(2 × cores, 4, 16)`.
#[must_use]
pub fn worker_count_for(cores: usize) -> usize {
    cores.saturating_mul(2).clamp(MIN_WORKERS, MAX_WORKERS)
}

/// Worker count for this machine.
#[must_use]
pub fn default_worker_count() -> usize {
    let cores = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    worker_count_for(cores)
}

/// Files sharing one content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashBucket {
    /// BLAKE3 digest shared by every member
    pub digest: Digest,
    /// Members, in the order they appeared in the input list
    pub files: Vec<PathBuf>,
}

impl HashBucket {
    /// Check if this bucket holds duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Result of a hashing run.
#[derive(Debug, Clone, Default)]
pub struct HashOutcome {
    /// Every digest seen, including single-member buckets
    pub buckets: Vec<HashBucket>,
    /// Files attempted (hashed or skipped)
    pub attempted: usize,
    /// Files skipped because they could not be read
    pub skipped: usize,
    /// Whether the pool drained because of cancellation
    pub cancelled: bool,
}

impl HashOutcome {
    /// Buckets with two or more members.
    pub fn duplicate_buckets(self) -> impl Iterator<Item = HashBucket> {
        self.buckets.into_iter().filter(HashBucket::has_duplicates)
    }
}

/// Configuration for the hashing pool.
#[derive(Clone)]
pub struct HashPoolConfig {
    /// Number of hash workers (at least 1).
    pub workers: usize,
    /// Cancellation token polled before each claim.
    pub cancel: CancelToken,
    /// Counters shared with the owning session.
    pub counters: Arc<ScanCounters>,
    /// Receives one progress event per attempted file.
    pub observer: Option<Arc<dyn ScanObserver>>,
}

impl std::fmt::Debug for HashPoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashPoolConfig")
            .field("workers", &self.workers)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("counters", &self.counters.snapshot())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for HashPoolConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            cancel: CancelToken::new(),
            counters: Arc::new(ScanCounters::default()),
            observer: None,
        }
    }
}

impl HashPoolConfig {
    /// Set the number of workers.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Share counters with a session.
    #[must_use]
    pub fn with_counters(mut self, counters: Arc<ScanCounters>) -> Self {
        self.counters = counters;
        self
    }

    /// Set the progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// One worker result.
struct HashMessage {
    index: usize,
    result: Result<Digest, HashError>,
}

/// Hash `files` concurrently and bucket them by digest.
///
/// Buckets are ordered by the position of their first member in `files`,
/// members by their own position, so the outcome does not depend on which
/// worker finished first.
///
/// # Errors
///
/// Returns [`ScanFailure::ThreadPool`] if the worker pool cannot be started.
pub fn hash_candidates(
    files: Vec<PathBuf>,
    hasher: &Hasher,
    config: &HashPoolConfig,
) -> Result<HashOutcome, ScanFailure> {
    let mut outcome = HashOutcome::default();
    if files.is_empty() {
        log::debug!("Hashing: no files to process");
        outcome.cancelled = config.cancel.is_cancelled();
        return Ok(outcome);
    }

    let workers = config.workers.max(1);
    log::info!("Hashing {} files with {} workers", files.len(), workers);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("dupesweep-hash-{i}"))
        .build()?;

    let cursor = AtomicUsize::new(0);
    let (tx, rx) = crossbeam_channel::unbounded::<HashMessage>();
    let mut by_digest: IndexMap<Digest, Vec<usize>> = IndexMap::new();

    pool.in_place_scope(|scope| {
        for worker in 0..workers {
            let tx = tx.clone();
            let files = &files;
            let cursor = &cursor;
            let cancel = &config.cancel;
            scope.spawn(move |_| hash_worker(worker, files, cursor, hasher, cancel, &tx));
        }
        // Workers hold the only senders now; the loop below ends once
        // every worker has stopped.
        drop(tx);

        for HashMessage { index, result } in rx.iter() {
            let hashed = config.counters.record_hashed();
            outcome.attempted += 1;

            match result {
                Ok(digest) => by_digest.entry(digest).or_default().push(index),
                Err(e) => {
                    log::warn!("Skipping unreadable file: {}", e);
                    outcome.skipped += 1;
                }
            }

            if let Some(observer) = &config.observer {
                observer.on_progress(&ScanProgress {
                    total_files_found: config.counters.files_found(),
                    total_to_hash: config.counters.files_to_hash(),
                    hashed,
                    current_file: Some(files[index].clone()),
                });
            }
        }
    });

    outcome.cancelled = config.cancel.is_cancelled();
    let mut ordered: Vec<(usize, HashBucket)> = by_digest
        .into_iter()
        .map(|(digest, mut indices)| {
            indices.sort_unstable();
            let first = indices[0];
            let members = indices.into_iter().map(|i| files[i].clone()).collect();
            (first, HashBucket { digest, files: members })
        })
        .collect();
    ordered.sort_by_key(|(first, _)| *first);
    outcome.buckets = ordered.into_iter().map(|(_, bucket)| bucket).collect();

    log::info!(
        "Hashing {}: {} of {} files attempted, {} skipped, {} distinct digests",
        if outcome.cancelled { "cancelled" } else { "complete" },
        outcome.attempted,
        files.len(),
        outcome.skipped,
        outcome.buckets.len()
    );

    Ok(outcome)
}

fn hash_worker(
    worker: usize,
    files: &[PathBuf],
    cursor: &AtomicUsize,
    hasher: &Hasher,
    cancel: &CancelToken,
    tx: &Sender<HashMessage>,
) {
    let mut claimed = 0usize;
    loop {
        if cancel.is_cancelled() {
            log::debug!("Hash worker {}: cancellation observed", worker);
            break;
        }

        let index = cursor.fetch_add(1, Ordering::SeqCst);
        let Some(path) = files.get(index) else {
            break;
        };

        log::trace!("Hash worker {}: {}", worker, path.display());
        let result = hasher.full_hash(path);
        claimed += 1;

        if tx.send(HashMessage { index, result }).is_err() {
            break;
        }
    }
    log::trace!("Hash worker {} finished after {} file(s)", worker, claimed);
}
