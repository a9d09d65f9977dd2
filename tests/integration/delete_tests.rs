use dupesweep::actions::{delete_duplicates, DeleteMethod};
use dupesweep::duplicates::ScanMode;
use dupesweep::progress::NoopObserver;
use dupesweep::session::{ScanOptions, ScanRequest, ScanSession};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_scan_then_delete_duplicates() {
    let dir = tempdir().unwrap();
    for name in ["one", "two", "three"] {
        fs::write(dir.path().join(name), b"shared bytes").unwrap();
    }
    fs::write(dir.path().join("unique"), b"unique bytes!").unwrap();

    let report = ScanSession::new(
        ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
        ScanOptions::default(),
    )
    .run(Arc::new(NoopObserver));
    assert_eq!(report.duplicates.len(), 1);

    let group = &report.duplicates[0];
    let batch = delete_duplicates(group, DeleteMethod::Permanent);

    assert!(batch.all_succeeded());
    assert_eq!(batch.success_count(), 2);
    assert_eq!(batch.bytes_freed(), report.reclaimable_bytes());
    assert!(group.files[0].exists());

    let rescan = ScanSession::new(
        ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
        ScanOptions::default(),
    )
    .run(Arc::new(NoopObserver));
    assert!(rescan.duplicates.is_empty());
}

#[test]
fn test_delete_after_file_vanished_reports_error() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"x").unwrap();
    fs::write(&b, b"x").unwrap();

    let report = ScanSession::new(
        ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
        ScanOptions::default(),
    )
    .run(Arc::new(NoopObserver));
    let group = &report.duplicates[0];
    fs::remove_file(&group.files[1]).unwrap();

    let batch = delete_duplicates(group, DeleteMethod::Permanent);

    assert_eq!(batch.failure_count(), 1);
    assert!(!batch.outcomes[0].success);
    assert!(batch.outcomes[0].error.as_deref().unwrap().contains("not found"));
}
