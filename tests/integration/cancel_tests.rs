use dupesweep::duplicates::ScanMode;
use dupesweep::progress::{ChannelObserver, NoopObserver, ScanEvent, ScanObserver, ScanProgress};
use dupesweep::session::{
    ScanOptions, ScanReport, ScanRequest, ScanSession, ScanState, Scanner, SessionHandle,
};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn populate(root: &Path, count: usize) {
    for i in 0..count {
        fs::write(root.join(format!("f{i:04}")), b"identical payload").unwrap();
    }
}

/// Cancels its session once `after` files have been hashed and records
/// every event.
struct CancelAfter {
    after: usize,
    handle: SessionHandle,
    progress: Mutex<Vec<ScanProgress>>,
    completions: Mutex<Vec<ScanReport>>,
}

impl ScanObserver for CancelAfter {
    fn on_progress(&self, progress: &ScanProgress) {
        self.progress.lock().unwrap().push(progress.clone());
        if progress.hashed >= self.after {
            self.handle.cancel();
        }
    }

    fn on_complete(&self, report: &ScanReport) {
        self.completions.lock().unwrap().push(report.clone());
    }
}

#[test]
fn test_cancel_mid_hash_reports_partial_results() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 300);

    let session = ScanSession::new(
        ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
        ScanOptions::default().with_workers(4),
    );
    let observer = Arc::new(CancelAfter {
        after: 3,
        handle: session.handle(),
        progress: Mutex::new(Vec::new()),
        completions: Mutex::new(Vec::new()),
    });
    let handle = session.handle();

    let report = session.run(observer.clone());

    assert!(report.success);
    assert!(report.cancelled);
    assert_eq!(handle.state(), ScanState::Cancelled);

    let progress = observer.progress.lock().unwrap();
    let last = progress.last().unwrap();
    assert!(last.hashed <= last.total_to_hash);
    assert_eq!(last.total_to_hash, 300);
    assert!(progress.windows(2).all(|w| w[0].hashed < w[1].hashed));

    // Partial results: every hashed file shares one digest.
    let hashed = handle.counters().files_hashed;
    assert!(hashed >= 3);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].files.len(), hashed);

    let completions = observer.completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0], report);
}

#[test]
fn test_cancel_is_idempotent_and_never_resets() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 2);

    let session = ScanSession::new(
        ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
        ScanOptions::default(),
    );
    let handle = session.handle();

    assert!(handle.cancel());
    assert!(!handle.cancel());
    let report = session.run(Arc::new(NoopObserver));

    assert!(report.cancelled);
    assert!(handle.is_cancelled());
}

#[test]
fn test_cancelled_non_hash_scan_still_reports_groups() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 4);

    let session = ScanSession::new(
        ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::SizeOnly),
        ScanOptions::default(),
    );
    session.handle().cancel();
    let report = session.run(Arc::new(NoopObserver));

    assert!(report.success);
    assert!(report.cancelled);
    assert_eq!(report.duplicates.len(), 1);
}

#[test]
fn test_background_scan_cancel_delivers_single_done() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 500);

    let scanner = Scanner::new(ScanOptions::default().with_workers(2));
    let (observer, rx) = ChannelObserver::new();
    let handle = scanner
        .start(
            ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
            Arc::new(observer),
        )
        .unwrap();

    // Wait for hashing to begin, then cancel.
    for event in rx.iter() {
        if matches!(event, ScanEvent::Progress(_)) {
            break;
        }
    }
    handle.cancel();
    let report = handle.wait().unwrap();

    let done: Vec<ScanReport> = rx
        .try_iter()
        .filter_map(|e| match e {
            ScanEvent::Done(r) => Some(r),
            ScanEvent::Progress(_) => None,
        })
        .collect();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0], report);
    assert!(report.success);
}

#[test]
fn test_starting_new_scan_cancels_previous() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 400);

    let scanner = Scanner::new(ScanOptions::default().with_workers(2));
    let (observer, rx) = ChannelObserver::new();
    let first = scanner
        .start(
            ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
            Arc::new(observer),
        )
        .unwrap();
    let first_session = first.session().clone();

    // Make sure the first scan is running before replacing it.
    for event in rx.iter() {
        if matches!(event, ScanEvent::Progress(_)) {
            break;
        }
    }

    let second = scanner
        .start(
            ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::SizeOnly),
            Arc::new(NoopObserver),
        )
        .unwrap();
    let second_id = second.id();

    let second_report = second.wait().unwrap();
    let first_report = first.wait().unwrap();

    assert!(first_session.is_cancelled() || first_report.duplicates[0].files.len() == 400);
    assert!(!second_report.cancelled);
    assert_eq!(second_report.duplicates.len(), 1);
    assert_eq!(scanner.active().unwrap().id(), second_id);
}
