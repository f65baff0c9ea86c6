//! Integration tests for sequence discovery.

mod common;

use common::{test_config, write_frames, StubHeaderProvider};
use plateflow::scanner::Scanner;

#[test]
fn scan_groups_finds_ranges_per_directory() {
    let root = tempfile::tempdir().unwrap();
    write_frames(&root.path().join("20250516_2/shotA"), "plate", 1, 10);
    write_frames(&root.path().join("20250516_2/shotB"), "plate", 5, 3);
    // A directory without frame files is not a sequence.
    std::fs::create_dir_all(root.path().join("20250516_2/notes")).unwrap();
    std::fs::write(root.path().join("20250516_2/notes/readme.txt"), b"x").unwrap();

    let config = test_config();
    let provider = StubHeaderProvider::new();
    let scanner = Scanner::new(&config, &provider);

    let groups = scanner.scan_groups(root.path()).unwrap();
    assert_eq!(groups.len(), 2);

    let shot_a = groups.iter().find(|g| g.dir.ends_with("shotA")).unwrap();
    assert_eq!(shot_a.base_name, "plate");
    assert_eq!((shot_a.start_frame, shot_a.end_frame), (1, 10));
    assert_eq!(shot_a.files.len(), 10);

    let shot_b = groups.iter().find(|g| g.dir.ends_with("shotB")).unwrap();
    assert_eq!((shot_b.start_frame, shot_b.end_frame), (5, 7));
}

#[test]
fn scan_groups_skips_unparseable_directories() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("seq/shotX");
    std::fs::create_dir_all(&dir).unwrap();
    // Frame extension but no digits anywhere: not a sequence member.
    std::fs::write(dir.join("noframes.exr"), b"x").unwrap();

    let config = test_config();
    let provider = StubHeaderProvider::new();
    let scanner = Scanner::new(&config, &provider);

    let groups = scanner.scan_groups(root.path()).unwrap();
    assert!(groups.is_empty());
}

#[test]
fn scan_builds_rows_with_metadata() {
    let root = tempfile::tempdir().unwrap();
    write_frames(&root.path().join("20250516_2/shotA"), "plate", 1, 10);

    let mut config = test_config();
    config.editorial.shots = vec!["shotA".to_string()];
    let provider = StubHeaderProvider::new();
    let scanner = Scanner::new(&config, &provider);

    let rows = scanner.scan(root.path()).unwrap();
    assert_eq!(rows.len(), 1);

    let row = rows.get(0).unwrap();
    assert_eq!(row.shot, "shotA");
    assert_eq!(row.sequence, "20250516_2");
    assert_eq!(row.frame_range(), "1-10");
    assert_eq!(row.timecode, "00:00:01:01");
    assert_eq!(row.colorspace, "ACES - ACEScg");
    assert!(row.editorial);
    assert!(row.selected);
    // No version directories exist next to the scan folder yet.
    assert_eq!(row.version_label(), "v001");
    assert!(!row.modified.is_empty());
}

#[test]
fn scan_rows_pick_up_existing_versions() {
    let root = tempfile::tempdir().unwrap();
    let seq_dir = root.path().join("20250516_2");
    write_frames(&seq_dir.join("shotA"), "plate", 1, 4);
    for v in ["v001", "v003"] {
        std::fs::create_dir_all(seq_dir.join(v)).unwrap();
    }

    let config = test_config();
    let provider = StubHeaderProvider::empty();
    let scanner = Scanner::new(&config, &provider);

    let rows = scanner.scan(root.path()).unwrap();
    let row = rows.get(0).unwrap();
    assert_eq!(row.version_label(), "v004");
    // Empty header degrades to empty descriptive fields, not an error.
    assert_eq!(row.timecode, "");
    assert_eq!(row.colorspace, "");
}

#[test]
fn scan_is_restartable() {
    let root = tempfile::tempdir().unwrap();
    write_frames(&root.path().join("seq/shotA"), "plate", 1, 3);

    let config = test_config();
    let provider = StubHeaderProvider::new();
    let scanner = Scanner::new(&config, &provider);

    let first = scanner.scan_groups(root.path()).unwrap();
    let second = scanner.scan_groups(root.path()).unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].files, second[0].files);
}
