//! Scan sessions.
//!
//! A [`ScanSession`] owns everything one scan needs: its identity, the
//! [`CancelToken`], the shared [`ScanCounters`] and its [`ScanState`]. It is
//! created from a [`ScanRequest`] and consumed by [`ScanSession::run`], which
//! drives the pipeline and delivers exactly one [`ScanReport`].
//!
//! ```text
//! Idle ──run──▶ Scanning ──▶ Completed | Cancelled | Failed
//! ```
//!
//! Callers that need to cancel or observe a running session keep a
//! [`SessionHandle`], obtained before `run` is called. [`Scanner`] wraps
//! this for callers that want scans on a background thread, one at a time.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dupesweep::duplicates::ScanMode;
//! use dupesweep::progress::NoopObserver;
//! use dupesweep::session::{ScanOptions, ScanRequest, ScanSession};
//!
//! let request = ScanRequest::new(vec!["/home/user/photos".into()], ScanMode::Exact);
//! let session = ScanSession::new(request, ScanOptions::default());
//! let report = session.run(Arc::new(NoopObserver));
//!
//! for group in &report.duplicates {
//!     println!("{} files share {}", group.len(), group.hash);
//! }
//! ```

pub mod cancel;

pub use cancel::CancelToken;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use crate::duplicates::{
    default_worker_count, direct_groups, files_to_hash, group_candidates, hash_candidates,
    resolve_content, resolve_exact, DuplicateGroup, HashPoolConfig, ScanMode, TextExtensions,
};
use crate::error::ScanFailure;
use crate::progress::{ScanObserver, ScanProgress};
use crate::scanner::{Hasher, Walker, WalkerConfig};

/// Counters shared between a session, its hash pool and its handles.
#[derive(Debug, Default)]
pub struct ScanCounters {
    files_found: AtomicUsize,
    files_to_hash: AtomicUsize,
    files_hashed: AtomicUsize,
}

/// Point-in-time copy of [`ScanCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSnapshot {
    /// Regular files found by the walk
    pub files_found: usize,
    /// Files selected for hashing
    pub files_to_hash: usize,
    /// Files attempted by the hash pool
    pub files_hashed: usize,
}

impl ScanCounters {
    /// Record the number of files found by the walk.
    pub fn set_files_found(&self, n: usize) {
        self.files_found.store(n, Ordering::SeqCst);
    }

    /// Record the number of files selected for hashing.
    pub fn set_files_to_hash(&self, n: usize) {
        self.files_to_hash.store(n, Ordering::SeqCst);
    }

    /// Count one attempted file and return the new total.
    pub fn record_hashed(&self) -> usize {
        self.files_hashed.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn files_found(&self) -> usize {
        self.files_found.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn files_to_hash(&self) -> usize {
        self.files_to_hash.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn files_hashed(&self) -> usize {
        self.files_hashed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            files_found: self.files_found(),
            files_to_hash: self.files_to_hash(),
            files_hashed: self.files_hashed(),
        }
    }
}

/// Process-unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scan-{}", self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum ScanState {
    Idle = 0,
    Scanning = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl ScanState {
    /// Check whether the session has finished.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Scanning,
            2 => Self::Completed,
            3 => Self::Cancelled,
            _ => Self::Failed,
        }
    }
}

/// What to scan and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Directories to walk, in order
    #[serde(rename = "rootPaths")]
    pub roots: Vec<PathBuf>,
    /// Equivalence strategy
    #[serde(default)]
    pub mode: ScanMode,
}

impl ScanRequest {
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, mode: ScanMode) -> Self {
        Self { roots, mode }
    }
}

/// Engine settings that are not part of the request itself.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Number of hash workers
    pub workers: usize,
    /// Directory walking options
    pub walker: WalkerConfig,
    /// Extensions refined by text equality in `content` mode
    pub text_extensions: TextExtensions,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            walker: WalkerConfig::default(),
            text_extensions: TextExtensions::default(),
        }
    }
}

impl ScanOptions {
    /// Set the number of hash workers (at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the walker options.
    #[must_use]
    pub fn with_walker(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    /// Set the text extensions used by `content` mode.
    #[must_use]
    pub fn with_text_extensions(mut self, text_extensions: TextExtensions) -> Self {
        self.text_extensions = text_extensions;
        self
    }
}

/// Terminal outcome of a scan, delivered exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// False only for fatal failures
    pub success: bool,
    /// Whether cancellation was requested before the scan finished
    pub cancelled: bool,
    /// Duplicate groups, each with two or more members
    pub duplicates: Vec<DuplicateGroup>,
    /// Failure message, present only when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanReport {
    /// Report for a scan that ran to completion or was cancelled.
    #[must_use]
    pub fn completed(duplicates: Vec<DuplicateGroup>, cancelled: bool) -> Self {
        Self {
            success: true,
            cancelled,
            duplicates,
            error: None,
        }
    }

    /// Report for a scan that failed.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            cancelled: false,
            duplicates: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Total number of files in all groups.
    #[must_use]
    pub fn duplicate_file_count(&self) -> usize {
        self.duplicates.iter().map(DuplicateGroup::len).sum()
    }

    /// Bytes freed by keeping only the first file of every group.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.duplicates.iter().map(DuplicateGroup::reclaimable_bytes).sum()
    }

    /// State a session ends in after producing this report.
    #[must_use]
    pub fn state(&self) -> ScanState {
        if !self.success {
            ScanState::Failed
        } else if self.cancelled {
            ScanState::Cancelled
        } else {
            ScanState::Completed
        }
    }
}

#[derive(Debug)]
struct Shared {
    id: SessionId,
    cancel: CancelToken,
    counters: Arc<ScanCounters>,
    state: AtomicU8,
}

impl Shared {
    fn state(&self) -> ScanState {
        ScanState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: ScanState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

/// Cloneable view of a session for cancelling and polling it.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.shared.id
    }

    /// Request cancellation. Returns `true` if this call set the flag.
    pub fn cancel(&self) -> bool {
        let first = self.shared.cancel.cancel();
        if first {
            log::info!("{}: cancellation requested", self.shared.id);
        }
        first
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    #[must_use]
    pub fn state(&self) -> ScanState {
        self.shared.state()
    }

    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.shared.counters.snapshot()
    }

    /// The session's cancellation token, e.g. for a signal handler.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.shared.cancel.clone()
    }
}

/// One scan, from request to report.
#[derive(Debug)]
pub struct ScanSession {
    request: ScanRequest,
    options: ScanOptions,
    shared: Arc<Shared>,
}

impl ScanSession {
    #[must_use]
    pub fn new(request: ScanRequest, options: ScanOptions) -> Self {
        Self::with_cancel_token(request, options, CancelToken::new())
    }

    /// Create a session polling an existing cancellation token.
    #[must_use]
    pub fn with_cancel_token(
        request: ScanRequest,
        options: ScanOptions,
        cancel: CancelToken,
    ) -> Self {
        Self {
            request,
            options,
            shared: Arc::new(Shared {
                id: SessionId::next(),
                cancel,
                counters: Arc::new(ScanCounters::default()),
                state: AtomicU8::new(ScanState::Idle as u8),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.shared.id
    }

    #[must_use]
    pub fn request(&self) -> &ScanRequest {
        &self.request
    }

    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run the scan to its end.
    ///
    /// The observer receives progress events during hashing and exactly one
    /// `on_complete` call with the same report this method returns. A panic
    /// anywhere in the pipeline is caught and reported as a failed scan.
    pub fn run(self, observer: Arc<dyn ScanObserver>) -> ScanReport {
        let id = self.shared.id;
        self.shared.set_state(ScanState::Scanning);
        log::info!(
            "{}: scanning {} root(s) in {} mode",
            id,
            self.request.roots.len(),
            self.request.mode
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(&observer)));
        let report = match outcome {
            Ok(Ok(duplicates)) => {
                ScanReport::completed(duplicates, self.shared.cancel.is_cancelled())
            }
            Ok(Err(failure)) => {
                log::error!("{}: scan failed: {}", id, failure);
                ScanReport::failed(failure.to_string())
            }
            Err(payload) => {
                let failure = ScanFailure::from_panic(payload.as_ref());
                log::error!("{}: scan failed: {}", id, failure);
                ScanReport::failed(failure.to_string())
            }
        };

        self.shared.set_state(report.state());
        log::info!(
            "{}: {:?} with {} group(s)",
            id,
            report.state(),
            report.duplicates.len()
        );
        observer.on_complete(&report);
        report
    }

    fn execute(
        &self,
        observer: &Arc<dyn ScanObserver>,
    ) -> Result<Vec<DuplicateGroup>, ScanFailure> {
        let mode = self.request.mode;
        let counters = &self.shared.counters;

        let walker = Walker::new(self.request.roots.clone(), self.options.walker.clone());
        let (files, summary) = walker.collect_files();
        counters.set_files_found(files.len());
        if !summary.errors.is_empty() {
            log::debug!("{}: {} path(s) could not be read", self.shared.id, summary.errors.len());
        }

        let (buckets, stats) = group_candidates(&files, mode);
        log::info!(
            "{}: {} candidate bucket(s) covering {} of {} files",
            self.shared.id,
            stats.buckets,
            stats.potential_duplicates,
            stats.total_files
        );

        if !mode.uses_hashing() {
            return Ok(direct_groups(buckets));
        }

        let to_hash = files_to_hash(&buckets);
        counters.set_files_to_hash(to_hash.len());
        observer.on_progress(&ScanProgress {
            total_files_found: counters.files_found(),
            total_to_hash: to_hash.len(),
            hashed: 0,
            current_file: None,
        });

        let config = HashPoolConfig::default()
            .with_workers(self.options.workers)
            .with_cancel_token(self.shared.cancel.clone())
            .with_counters(Arc::clone(counters))
            .with_observer(Arc::clone(observer));
        let outcome = hash_candidates(to_hash, &Hasher::new(), &config)?;

        let groups = match mode {
            ScanMode::Content => {
                resolve_content(outcome.duplicate_buckets(), &self.options.text_extensions)
            }
            _ => resolve_exact(outcome.duplicate_buckets()),
        };
        Ok(groups)
    }
}

/// A session running on a background thread.
#[derive(Debug)]
pub struct ScanHandle {
    session: SessionHandle,
    thread: Option<JoinHandle<ScanReport>>,
}

impl ScanHandle {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    pub fn cancel(&self) -> bool {
        self.session.cancel()
    }

    #[must_use]
    pub fn state(&self) -> ScanState {
        self.session.state()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Block until the scan finishes and return its report.
    ///
    /// # Errors
    ///
    /// Returns [`ScanFailure::Panicked`] if the scan thread died or was
    /// already joined.
    pub fn wait(mut self) -> Result<ScanReport, ScanFailure> {
        let thread = self
            .thread
            .take()
            .ok_or_else(|| ScanFailure::Panicked("scan thread already joined".to_string()))?;
        thread
            .join()
            .map_err(|payload| ScanFailure::from_panic(payload.as_ref()))
    }
}

/// Runs scans on background threads, at most one active at a time.
///
/// Starting a scan while the previous one is still running cancels the
/// previous one first.
#[derive(Debug, Default)]
pub struct Scanner {
    options: ScanOptions,
    active: Mutex<Option<SessionHandle>>,
}

impl Scanner {
    #[must_use]
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            active: Mutex::new(None),
        }
    }

    /// Start a scan on a new thread.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn start(
        &self,
        request: ScanRequest,
        observer: Arc<dyn ScanObserver>,
    ) -> std::io::Result<ScanHandle> {
        let session = ScanSession::new(request, self.options.clone());
        let handle = session.handle();

        {
            let mut active = self
                .active
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(previous) = active.take() {
                if !previous.state().is_terminal() && previous.cancel() {
                    log::info!("{} replaced by {}", previous.id(), handle.id());
                }
            }
            *active = Some(handle.clone());
        }

        let thread = std::thread::Builder::new()
            .name(format!("dupesweep-{}", handle.id()))
            .spawn(move || session.run(observer))?;

        Ok(ScanHandle {
            session: handle,
            thread: Some(thread),
        })
    }

    /// Cancel the active scan, if any.
    pub fn cancel_active(&self) -> bool {
        let active = self
            .active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        active.as_ref().is_some_and(SessionHandle::cancel)
    }

    /// Handle of the most recently started scan.
    #[must_use]
    pub fn active(&self) -> Option<SessionHandle> {
        self.active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
