//! Integration tests for publish orchestration.

mod common;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use common::{test_config, write_frames, StubHeaderProvider};
use plateflow::publish::{find_frame_folder, PublishOrchestrator};
use plateflow::rules::{CheckKind, ValidationEngine};
use plateflow::scanner::Scanner;
use plateflow::tracking::{PublishedVersion, TrackingService, VersionPublish};

/// Records every publish handed to the tracking boundary.
#[derive(Default)]
struct MockTracker {
    calls: Mutex<Vec<VersionPublish>>,
}

impl TrackingService for MockTracker {
    fn publish_version(&self, publish: &VersionPublish) -> anyhow::Result<PublishedVersion> {
        self.calls.lock().unwrap().push(publish.clone());
        Ok(PublishedVersion {
            version_id: 42,
            version_name: publish.version_name(),
        })
    }
}

#[test]
fn frame_folder_search_prefers_name_matches() {
    let tmp = tempfile::tempdir().unwrap();
    // "aaa" sorts (and is therefore visited) first, but carries no name match.
    write_frames(&tmp.path().join("aaa"), "plate", 1, 2);
    write_frames(&tmp.path().join("zz_shotA"), "plate", 1, 2);

    let (dir, fallback) = find_frame_folder(tmp.path(), "20250516_2", "shotA").unwrap();
    assert!(dir.ends_with("zz_shotA"));
    assert!(!fallback);
}

#[test]
fn frame_folder_search_reports_fallback() {
    let tmp = tempfile::tempdir().unwrap();
    write_frames(&tmp.path().join("aaa"), "plate", 1, 2);

    let (dir, fallback) = find_frame_folder(tmp.path(), "20250516_2", "ghost").unwrap();
    assert!(dir.ends_with("aaa"));
    assert!(fallback, "name-blind matches must be reported");

    assert!(find_frame_folder(&tmp.path().join("empty"), "x", "y").is_none());
}

/// Pre-create every conversion output so the publish run needs no external
/// tools (the stages skip, the archive copies for real).
fn prefill_outputs(dest: &Path, still_base: &str, count: i64) {
    let jpg_dir = dest.join("jpg");
    std::fs::create_dir_all(&jpg_dir).unwrap();
    for i in 0..count {
        std::fs::write(
            jpg_dir.join(format!("{still_base}_{n:04}.jpg", n = 1001 + i)),
            b"jpeg",
        )
        .unwrap();
    }
    std::fs::write(jpg_dir.join("thumb_1080.jpg"), b"thumb").unwrap();
    for (dir, file) in [
        ("webm", "output_video.webm"),
        ("mp4", "output_video.mp4"),
        ("mov", "output_video.mov"),
    ] {
        let dir = dest.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), b"media").unwrap();
    }
}

#[test]
fn publish_converts_updates_rows_and_calls_tracker() {
    let tmp = tempfile::tempdir().unwrap();
    let scan_root = tmp.path().join("scandata_project/product/scan");
    write_frames(&scan_root.join("20250516_2").join("shotA"), "plate", 1, 3);

    let mut config = test_config();
    config.tools.env_launcher = PathBuf::from("/no/such/launcher_xyz");
    let provider = StubHeaderProvider::new();
    let mut rows = Scanner::new(&config, &provider).scan(&scan_root).unwrap();

    // Validation resolves the version directory (bootstrap v001).
    let report = ValidationEngine::new(&config).run(&mut rows, &[CheckKind::Version]);
    assert!(report.passed(), "{}", report.render());
    let dest = rows.get(0).unwrap().resolved_version_dir.clone().unwrap();
    prefill_outputs(&dest, "plate", 3);

    let tracker = MockTracker::default();
    let orchestrator = PublishOrchestrator::new(&config, &tracker);
    let publish_report = orchestrator.publish(&mut rows, &scan_root);
    assert!(publish_report.all_ok(), "{:?}", publish_report);
    assert!(!publish_report.rows[0].used_fallback_folder);

    // Row media paths were recorded.
    let row = rows.get(0).unwrap();
    assert_eq!(row.thumbnail.as_deref(), Some(dest.join("jpg/thumb_1080.jpg").as_path()));
    assert_eq!(row.movie.as_deref(), Some(dest.join("webm/output_video.webm").as_path()));
    assert_eq!(row.mp4.as_deref(), Some(dest.join("mp4/output_video.mp4").as_path()));

    // The archival copy happened inside the version directory.
    assert!(dest.join("org/plate_1001.exr").is_file());

    // The tracking boundary saw the right bundle.
    let calls = tracker.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sequence, "20250516_2");
    assert_eq!(calls[0].shot, "shotA");
    assert_eq!(calls[0].version_code, "v001");
    assert_eq!(calls[0].version_name(), "shotA_CMP_v001");
}

#[test]
fn row_failures_are_isolated() {
    let tmp = tempfile::tempdir().unwrap();
    let scan_root = tmp.path().join("scandata_project/product/scan");
    write_frames(&scan_root.join("20250516_2").join("shotA"), "plate", 1, 3);
    write_frames(&scan_root.join("20250516_2").join("shotB"), "plate", 1, 3);

    let mut config = test_config();
    config.tools.env_launcher = PathBuf::from("/no/such/launcher_xyz");
    let provider = StubHeaderProvider::new();
    let mut rows = Scanner::new(&config, &provider).scan(&scan_root).unwrap();

    let report = ValidationEngine::new(&config).run(&mut rows, &[CheckKind::Version]);
    assert!(report.passed(), "{}", report.render());

    // Only shotA's outputs exist; shotB's conversion has to hit the missing
    // launcher and fail.
    let dest_a = rows.get(0).unwrap().resolved_version_dir.clone().unwrap();
    prefill_outputs(&dest_a, "plate", 3);

    let tracker = MockTracker::default();
    let orchestrator = PublishOrchestrator::new(&config, &tracker);
    let publish_report = orchestrator.publish(&mut rows, &scan_root);

    assert!(!publish_report.all_ok());
    assert_eq!(publish_report.rows.len(), 2);
    assert!(publish_report.rows[0].outcome.is_ok());
    assert!(publish_report.rows[1].outcome.is_err());
    assert_eq!(tracker.calls.lock().unwrap().len(), 1);
}
