use dupesweep::duplicates::ScanMode;
use dupesweep::progress::NoopObserver;
use dupesweep::session::{ScanOptions, ScanReport, ScanRequest, ScanSession};
use filetime::FileTime;
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

fn scan(root: &Path, mode: ScanMode) -> ScanReport {
    ScanSession::new(
        ScanRequest::new(vec![root.to_path_buf()], mode),
        ScanOptions::default(),
    )
    .run(Arc::new(NoopObserver))
}

#[test]
fn test_size_only_groups_by_size() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", &[1; 10]);
    write(dir.path(), "b", &[2; 10]);
    write(dir.path(), "c", &[3; 20]);

    let report = scan(dir.path(), ScanMode::SizeOnly);

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].size, 10);
    assert_eq!(report.duplicates[0].hash, "10");
    assert_eq!(report.duplicates[0].files.len(), 2);
}

#[test]
fn test_filename_mode_groups_across_directories() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "x/report.txt", b"first version");
    let b = write(dir.path(), "y/report.txt", b"second, longer version");
    write(dir.path(), "z/Report.txt", b"different case");

    let report = scan(dir.path(), ScanMode::Filename);

    assert_eq!(report.duplicates.len(), 1);
    let group = &report.duplicates[0];
    assert_eq!(group.hash, "report.txt");
    assert_eq!(group.size, 0);
    let mut files = group.files.clone();
    files.sort();
    assert_eq!(files, vec![a, b]);
}

#[test]
fn test_date_mode_groups_by_local_day() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"1");
    let b = write(dir.path(), "b", b"22");
    let c = write(dir.path(), "c", b"333");

    let noon = chrono::NaiveDate::from_ymd_opt(2021, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_local_timezone(chrono::Local)
        .unwrap();
    let same_day = noon + chrono::Duration::minutes(30);
    let later = noon + chrono::Duration::days(3);

    filetime::set_file_mtime(&a, FileTime::from_unix_time(noon.timestamp(), 0)).unwrap();
    filetime::set_file_mtime(&b, FileTime::from_unix_time(same_day.timestamp(), 0)).unwrap();
    filetime::set_file_mtime(&c, FileTime::from_unix_time(later.timestamp(), 0)).unwrap();

    let report = scan(dir.path(), ScanMode::Date);

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].hash, "2021-06-15");
    assert_eq!(report.duplicates[0].size, 0);
    let mut files = report.duplicates[0].files.clone();
    files.sort();
    assert_eq!(files, vec![a, b]);
}

#[test]
fn test_non_hash_modes_leave_hash_counters_at_zero() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");

    for mode in [ScanMode::SizeOnly, ScanMode::Filename, ScanMode::Date] {
        let session = ScanSession::new(
            ScanRequest::new(vec![dir.path().to_path_buf()], mode),
            ScanOptions::default(),
        );
        let handle = session.handle();
        session.run(Arc::new(NoopObserver));

        let counters = handle.counters();
        assert_eq!(counters.files_found, 2);
        assert_eq!(counters.files_to_hash, 0);
        assert_eq!(counters.files_hashed, 0);
    }
}

#[test]
fn test_exact_hashes_only_size_candidates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");
    write(dir.path(), "lonely", b"a unique length");

    let session = ScanSession::new(
        ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
        ScanOptions::default(),
    );
    let handle = session.handle();
    session.run(Arc::new(NoopObserver));

    let counters = handle.counters();
    assert_eq!(counters.files_found, 3);
    assert_eq!(counters.files_to_hash, 2);
    assert_eq!(counters.files_hashed, 2);
}
