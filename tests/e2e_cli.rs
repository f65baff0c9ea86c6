//! End-to-end CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_frames(dir: &std::path::Path, base: &str, start: i64, count: i64) {
    std::fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        std::fs::write(
            dir.join(format!("{base}_{n:04}.exr", n = start + i)),
            b"frame",
        )
        .unwrap();
    }
}

#[test]
fn version_prints_package_version() {
    Command::cargo_bin("plateflow")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn scan_lists_discovered_rows() {
    let tmp = tempfile::tempdir().unwrap();
    write_frames(&tmp.path().join("20250516_2/shotA"), "plate", 1, 3);

    Command::cargo_bin("plateflow")
        .unwrap()
        .arg("scan")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("20250516_2/shotA"))
        .stdout(predicate::str::contains("frames 1-3"));
}

#[test]
fn scan_exports_a_versioned_sheet() {
    let tmp = tempfile::tempdir().unwrap();
    write_frames(&tmp.path().join("20250516_2/shotA"), "plate", 1, 3);
    let sheet_dir = tmp.path().join("sheets");

    Command::cargo_bin("plateflow")
        .unwrap()
        .arg("scan")
        .arg(tmp.path())
        .arg("--sheet-dir")
        .arg(&sheet_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("metadata_20250516_2_v001.xlsx"));

    assert!(sheet_dir.join("metadata_20250516_2_v001.xlsx").is_file());
}

#[test]
fn scan_of_empty_root_reports_nothing_found() {
    let tmp = tempfile::tempdir().unwrap();

    Command::cargo_bin("plateflow")
        .unwrap()
        .arg("scan")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No frame sequences found"));
}

#[test]
fn validate_fails_on_bad_frame_ranges() {
    let tmp = tempfile::tempdir().unwrap();
    let scan_root = tmp.path().join("scandata_project/product/scan");
    // Starts at frame 5, so the timecode check must fail.
    write_frames(&scan_root.join("20250516_2/shotA"), "plate", 5, 3);

    Command::cargo_bin("plateflow")
        .unwrap()
        .arg("validate")
        .arg(&scan_root)
        .arg("--checks")
        .arg("timecode")
        .assert()
        .failure()
        .stdout(predicate::str::contains("start frame 5 != 1"));
}

#[test]
fn validate_version_check_bootstraps_v001() {
    let tmp = tempfile::tempdir().unwrap();
    let scan_root = tmp.path().join("scandata_project/product/scan");
    write_frames(&scan_root.join("20250516_2/shotA"), "plate", 1, 3);

    Command::cargo_bin("plateflow")
        .unwrap()
        .arg("validate")
        .arg(&scan_root)
        .arg("--checks")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation passed."));

    assert!(tmp
        .path()
        .join("scandata_project/seq/20250516_2/shotA/org/plate/org/v001")
        .is_dir());
}

#[test]
fn unknown_check_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    write_frames(&tmp.path().join("seq/shotA"), "plate", 1, 3);

    Command::cargo_bin("plateflow")
        .unwrap()
        .arg("validate")
        .arg(tmp.path())
        .arg("--checks")
        .arg("bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown check"));
}
