//! Ctrl+C handling.
//!
//! The process-wide Ctrl+C hook is installed once. It does not stop
//! anything itself; it records the interrupt and cancels whichever scan the
//! caller asked it to watch, so the scan drains cooperatively and still
//! delivers its report.
//!
//! ```rust,no_run
//! use dupesweep::session::CancelToken;
//! use dupesweep::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let token = CancelToken::new();
//! handler.watch(&token);
//!
//! // ... run the scan polling `token` ...
//!
//! if handler.was_interrupted() {
//!     std::process::exit(dupesweep::signal::EXIT_CODE_INTERRUPTED);
//! }
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::session::CancelToken;

/// Exit code for SIGINT (Ctrl+C) interruption.
/// This follows Unix convention: 128 + signal number (SIGINT = 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Forwards Ctrl+C to the cancellation token of the running scan.
///
/// Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandler {
    interrupted: Arc<AtomicBool>,
    target: Arc<Mutex<Option<CancelToken>>>,
}

impl InterruptHandler {
    /// Create a handler that is not hooked to any signal.
    #[must_use]
    pub fn unhooked() -> Self {
        Self::default()
    }

    /// Cancel `token` when an interrupt arrives.
    ///
    /// Replaces any previously watched token. If an interrupt already
    /// arrived, `token` is cancelled immediately.
    pub fn watch(&self, token: &CancelToken) {
        let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        *target = Some(token.clone());
        if self.was_interrupted() {
            token.cancel();
        }
    }

    /// Check whether an interrupt has been received.
    #[must_use]
    pub fn was_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Record an interrupt and cancel the watched token.
    ///
    /// This is what the Ctrl+C hook runs.
    pub fn trigger(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        let target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = target.as_ref() {
            token.cancel();
        }
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<InterruptHandler> = OnceLock::new();

/// Install the Ctrl+C hook, or return the one already installed.
///
/// When Ctrl+C is pressed the watched token is cancelled and
/// "Interrupted. Finishing current files..." is printed to stderr.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if another Ctrl+C handler owns
/// the signal in this process.
pub fn install_handler() -> Result<InterruptHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        return Ok(handler.clone());
    }

    let handler = GLOBAL_HANDLER.get_or_init(InterruptHandler::default).clone();
    let hook = handler.clone();

    match ctrlc::set_handler(move || {
        hook.trigger();

        // stderr is unbuffered but flush anyway in case it was redirected
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing current files...");
        let _ = std::io::stderr().flush();

        log::info!("Interrupt received, cancelling scan");
    }) {
        Ok(()) => Ok(handler),
        Err(ctrlc::Error::MultipleHandlers) => {
            // Another caller in this process won the race through
            // `get_or_init` and installed the hook with the same state.
            log::debug!("Ctrl+C handler already registered");
            Ok(handler)
        }
        Err(e) => Err(e.into()),
    }
}
