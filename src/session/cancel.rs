//! Cooperative cancellation.
//!
//! A [`CancelToken`] wraps an `AtomicBool` shared by everything taking part
//! in one scan. Setting it is a request, not an interrupt: hash workers poll
//! it before claiming the next file and finish any read already in flight.
//!
//! ```
//! use dupesweep::session::CancelToken;
//!
//! let token = CancelToken::new();
//! let worker_view = token.clone();
//!
//! token.cancel();
//! assert!(worker_view.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Write-once cancellation flag shared across threads.
///
/// Once cancelled, a token stays cancelled; there is no reset.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// Returns `true` if this call was the one that set the flag.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
