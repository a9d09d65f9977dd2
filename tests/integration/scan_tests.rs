use dupesweep::duplicates::ScanMode;
use dupesweep::progress::NoopObserver;
use dupesweep::session::{ScanOptions, ScanReport, ScanRequest, ScanSession};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn scan(roots: Vec<PathBuf>, mode: ScanMode) -> ScanReport {
    ScanSession::new(ScanRequest::new(roots, mode), ScanOptions::default())
        .run(Arc::new(NoopObserver))
}

fn membership(report: &ScanReport) -> BTreeSet<BTreeSet<PathBuf>> {
    report
        .duplicates
        .iter()
        .map(|g| g.files.iter().cloned().collect())
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let report = scan(vec![dir.path().to_path_buf()], ScanMode::Exact);

    assert!(report.success);
    assert!(!report.cancelled);
    assert!(report.duplicates.is_empty());
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content bb");
    write(dir.path(), "c.txt", b"content ccc");

    for mode in [ScanMode::Exact, ScanMode::Content, ScanMode::SizeOnly] {
        let report = scan(vec![dir.path().to_path_buf()], mode);
        assert!(report.duplicates.is_empty(), "mode {mode}");
    }
}

#[test]
fn test_scan_equal_size_different_bytes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"AAAAAAAAAA");
    write(dir.path(), "b", b"BBBBBBBBBB");

    let report = scan(vec![dir.path().to_path_buf()], ScanMode::Exact);
    assert!(report.duplicates.is_empty());

    let by_size = scan(vec![dir.path().to_path_buf()], ScanMode::SizeOnly);
    assert_eq!(by_size.duplicates.len(), 1);
}

#[test]
fn test_scan_nested_duplicates() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a/deep/one.bin", b"duplicate payload");
    let b = write(dir.path(), "b/two.bin", b"duplicate payload");
    write(dir.path(), "c/three.bin", b"something else entirely");

    let report = scan(vec![dir.path().to_path_buf()], ScanMode::Exact);

    assert_eq!(report.duplicates.len(), 1);
    let group = &report.duplicates[0];
    assert_eq!(group.size, 17);
    assert_eq!(group.hash.len(), 64);
    let files: BTreeSet<_> = group.files.iter().cloned().collect();
    assert_eq!(files, [a, b].into_iter().collect());
    assert_eq!(report.reclaimable_bytes(), 17);
}

#[test]
fn test_scan_multiple_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let a = write(first.path(), "photo.jpg", b"jpeg bytes");
    let b = write(second.path(), "copy.jpg", b"jpeg bytes");

    let report = scan(
        vec![first.path().to_path_buf(), second.path().to_path_buf()],
        ScanMode::Exact,
    );

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].files, vec![a, b]);
}

#[test]
fn test_scan_missing_root_is_skipped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");
    let missing = dir.path().join("does-not-exist");

    let report = scan(vec![missing, dir.path().to_path_buf()], ScanMode::Exact);

    assert!(report.success);
    assert_eq!(report.duplicates.len(), 1);
}

#[test]
fn test_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let report = scan(vec![dir.path().to_path_buf()], ScanMode::Exact);

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].size, 0);
}

#[test]
fn test_repeated_scans_have_same_membership() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(dir.path(), &format!("d{}/f{}", i % 4, i), format!("v{}", i % 6).as_bytes());
    }

    let first = scan(vec![dir.path().to_path_buf()], ScanMode::Exact);
    for _ in 0..3 {
        let again = scan(vec![dir.path().to_path_buf()], ScanMode::Exact);
        assert_eq!(membership(&again), membership(&first));
        assert_eq!(again.duplicates, first.duplicates);
    }
    assert_eq!(first.duplicates.len(), 6);
}

#[test]
fn test_every_group_has_two_members() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("f{i}.txt"), format!("{}", i % 7).as_bytes());
    }

    for mode in ScanMode::ALL {
        let report = scan(vec![dir.path().to_path_buf()], mode);
        assert!(report.duplicates.iter().all(|g| g.files.len() >= 2), "mode {mode}");
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_does_not_fail_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");
    let locked = dir.path().join("locked");
    write(dir.path(), "locked/c", b"same");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let report = scan(vec![dir.path().to_path_buf()], ScanMode::Exact);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    assert!(report.success);
    assert_eq!(report.duplicates.len(), 1);
    // Root can still read the locked directory.
    assert!(report.duplicates[0].files.len() >= 2);
}
