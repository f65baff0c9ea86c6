//! The individual check functions.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::naming::format_version;
use crate::state::AssetRow;
use crate::versioning;

use super::{CheckKind, ValidationResult};

/// Per-run context shared by the checks.
pub(crate) struct CheckContext<'a> {
    pub version_root: &'a Path,
    /// Row version as entered, snapshotted before the version check can
    /// advance it. Keeps the checks order-insensitive.
    pub entered_version: u32,
    pub nominal_fps: f64,
    pub fps_tolerance: f64,
    pub editorial: &'a HashSet<String>,
}

pub(crate) fn run_check(
    kind: CheckKind,
    row: &mut AssetRow,
    ctx: &CheckContext<'_>,
) -> ValidationResult {
    match kind {
        CheckKind::Timecode => check_timecode(row, ctx),
        CheckKind::Version => check_version(row, ctx),
        CheckKind::SourceVersion => check_source_version(row, ctx),
        CheckKind::Editorial => check_editorial(row, ctx),
    }
}

fn check_timecode(row: &AssetRow, ctx: &CheckContext<'_>) -> ValidationResult {
    let mut res = ValidationResult::new(CheckKind::Timecode);
    if row.start_frame != 1 {
        res.add(format!("start frame {} != 1", row.start_frame));
    }
    if row.end_frame <= row.start_frame {
        res.add(format!(
            "end frame {} is not after start frame {}",
            row.end_frame, row.start_frame
        ));
    }
    if (row.frame_rate - ctx.nominal_fps).abs() > ctx.fps_tolerance {
        res.add(format!(
            "frame rate {} != {}",
            row.frame_rate, ctx.nominal_fps
        ));
    }
    res
}

/// The one check with side effects: it provisions version directories.
///
/// No versions yet -> create `v001` and reset the row to version 1 (first
/// publish bootstrap). Entered version at or behind the latest -> advance to
/// `latest + 1`, creating that directory if needed. Entered version already
/// ahead -> record the would-be path without creating it. The check itself
/// only fails when directory creation fails.
fn check_version(row: &mut AssetRow, ctx: &CheckContext<'_>) -> ValidationResult {
    let mut res = ValidationResult::new(CheckKind::Version);
    let root = ctx.version_root;

    if !root.is_dir() {
        if let Err(e) = std::fs::create_dir_all(root) {
            res.add(format!(
                "cannot create version root {}: {e}",
                root.display()
            ));
            return res;
        }
        info!("created version root {}", root.display());
    }

    let latest = match versioning::latest_version(root) {
        Ok(latest) => latest,
        Err(e) => {
            res.add(format!("cannot list versions in {}: {e}", root.display()));
            return res;
        }
    };

    let Some(latest) = latest else {
        // First publish: bootstrap v001.
        let v001 = root.join(format_version(1));
        if !v001.exists() {
            if let Err(e) = std::fs::create_dir_all(&v001) {
                res.add(format!("cannot create {}: {e}", v001.display()));
                return res;
            }
            info!("created first version directory {}", v001.display());
        }
        row.version = 1;
        row.resolved_version_dir = Some(v001);
        return res;
    };

    if row.version <= latest {
        // Stale entry: auto-advance past the latest published version.
        let next = latest + 1;
        let next_dir = root.join(format_version(next));
        if !next_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&next_dir) {
                res.add(format!("cannot create {}: {e}", next_dir.display()));
                return res;
            }
            info!("advanced to version directory {}", next_dir.display());
        }
        row.version = next;
        row.resolved_version_dir = Some(next_dir);
    } else {
        // Already ahead of the latest: record the target, create nothing.
        let entered_dir = root.join(format_version(row.version));
        info!(
            "entered version {} is ahead of latest v{latest:03}; keeping it",
            row.version_label()
        );
        row.resolved_version_dir = Some(entered_dir);
    }

    res
}

fn check_source_version(row: &AssetRow, ctx: &CheckContext<'_>) -> ValidationResult {
    let mut res = ValidationResult::new(CheckKind::SourceVersion);
    let expected = format_version(ctx.entered_version);
    if row.source_version != expected {
        res.add(format!(
            "source version {} != entered version {}",
            row.source_version, expected
        ));
    }
    res
}

fn check_editorial(row: &AssetRow, ctx: &CheckContext<'_>) -> ValidationResult {
    let mut res = ValidationResult::new(CheckKind::Editorial);
    if !ctx.editorial.contains(&row.shot) {
        res.add(format!("shot '{}' is not on the editorial list", row.shot));
    }
    res
}
