use dupesweep::duplicates::{ScanMode, TextExtensions};
use dupesweep::progress::NoopObserver;
use dupesweep::scanner::{hash_text, hash_to_hex, Hasher};
use dupesweep::session::{ScanOptions, ScanReport, ScanRequest, ScanSession};
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

fn scan_with(root: &Path, options: ScanOptions) -> ScanReport {
    ScanSession::new(
        ScanRequest::new(vec![root.to_path_buf()], ScanMode::Content),
        options,
    )
    .run(Arc::new(NoopObserver))
}

#[test]
fn test_identical_text_files_form_one_group() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "notes/a.txt", b"meeting at noon\n");
    let b = write(dir.path(), "backup/a copy.txt", b"meeting at noon\n");
    write(dir.path(), "other.txt", b"meeting at one!\n");

    let report = scan_with(dir.path(), ScanOptions::default());

    assert_eq!(report.duplicates.len(), 1);
    let group = &report.duplicates[0];
    assert_eq!(group.files.len(), 2);
    assert!(group.files.contains(&a) && group.files.contains(&b));
    assert_eq!(group.hash, hash_to_hex(&hash_text("meeting at noon\n")));
    assert_eq!(group.size, 16);
}

#[test]
fn test_binary_duplicates_keyed_by_digest() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.bin", &[0, 1, 2, 3, 255]);
    write(dir.path(), "b.bin", &[0, 1, 2, 3, 255]);

    let report = scan_with(dir.path(), ScanOptions::default());
    let digest = Hasher::new().full_hash(&a).unwrap();

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].hash, hash_to_hex(&digest));
}

#[test]
fn test_mixed_text_and_binary_bucket_is_kept_whole() {
    let dir = tempdir().unwrap();
    write(dir.path(), "readme.md", b"# Title");
    write(dir.path(), "readme.bak", b"# Title");

    let report = scan_with(dir.path(), ScanOptions::default());

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].files.len(), 2);
    assert_eq!(report.duplicates[0].hash.len(), 64);
}

#[test]
fn test_undecodable_text_bucket_is_kept_whole() {
    let dir = tempdir().unwrap();
    let bytes = [0xc3, 0x28, 0xa0, 0xa1];
    let a = write(dir.path(), "a.txt", &bytes);
    write(dir.path(), "b.txt", &bytes);
    write(dir.path(), "c.txt", &bytes);

    let report = scan_with(dir.path(), ScanOptions::default());
    let digest = Hasher::new().full_hash(&a).unwrap();

    assert!(report.success);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].files.len(), 3);
    assert_eq!(report.duplicates[0].hash, hash_to_hex(&digest));
}

#[test]
fn test_custom_text_extensions() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.log", b"line");
    write(dir.path(), "b.log", b"line");

    let options = ScanOptions::default().with_text_extensions(TextExtensions::new(["log"]));
    let report = scan_with(dir.path(), options);

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].hash, hash_to_hex(&hash_text("line")));
}

#[test]
fn test_content_and_exact_agree_on_membership() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        let ext = if i % 2 == 0 { "txt" } else { "dat" };
        write(dir.path(), &format!("f{i}.{ext}"), format!("body {}", i % 3).as_bytes());
    }

    let content = scan_with(dir.path(), ScanOptions::default());
    let exact = ScanSession::new(
        ScanRequest::new(vec![dir.path().to_path_buf()], ScanMode::Exact),
        ScanOptions::default(),
    )
    .run(Arc::new(NoopObserver));

    let sets = |r: &ScanReport| {
        let mut v: Vec<Vec<PathBuf>> = r
            .duplicates
            .iter()
            .map(|g| {
                let mut f = g.files.clone();
                f.sort();
                f
            })
            .collect();
        v.sort();
        v
    };
    assert_eq!(sets(&content), sets(&exact));
}
