//! Frame-sequence discovery.
//!
//! Walks a scan root, finds every directory holding frame files, groups the
//! files into sequences by base name, and derives the per-row descriptive
//! fields. Scanning never touches the filesystem beyond reads, so a scan can
//! always be re-run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::metadata::{descriptive_fields, HeaderProvider};
use crate::naming;
use crate::state::{AssetRow, RowSet};
use crate::versioning;

/// A group of frame files sharing one base name inside one directory.
#[derive(Debug, Clone)]
pub struct SequenceGroup {
    /// Directory the group lives in.
    pub dir: PathBuf,
    /// Common prefix before the trailing frame number (may be empty for
    /// digits-only filenames).
    pub base_name: String,
    /// Member files, sorted by name.
    pub files: Vec<PathBuf>,
    /// Smallest parsed frame number.
    pub start_frame: i64,
    /// Largest parsed frame number.
    pub end_frame: i64,
}

/// Scanner for discovering frame sequences and building asset rows.
pub struct Scanner<'a> {
    config: &'a Config,
    provider: &'a dyn HeaderProvider,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a Config, provider: &'a dyn HeaderProvider) -> Self {
        Self { config, provider }
    }

    /// Discover every sequence group under `root`.
    ///
    /// Directories are processed independently; a directory whose frame
    /// files yield no parseable frame number is skipped with a warning.
    pub fn scan_groups(&self, root: &Path) -> Result<Vec<SequenceGroup>> {
        if !root.is_dir() {
            anyhow::bail!("scan root is not a directory: {}", root.display());
        }
        info!("scanning {}", root.display());

        let mut groups = Vec::new();
        for (dir, files) in frame_dirs(root) {
            match group_directory(&dir, files) {
                Some(dir_groups) => groups.extend(dir_groups),
                None => {
                    warn!(
                        "no parseable frame numbers in {}; directory skipped",
                        dir.display()
                    );
                }
            }
        }

        info!("scan complete: {} sequence(s) found", groups.len());
        Ok(groups)
    }

    /// Discover sequences and build one row per frame directory.
    pub fn scan(&self, root: &Path) -> Result<RowSet> {
        if !root.is_dir() {
            anyhow::bail!("scan root is not a directory: {}", root.display());
        }
        info!("scanning {}", root.display());

        let mut rows = RowSet::new();
        for (dir, files) in frame_dirs(root) {
            match self.build_row(&dir, files) {
                Some(row) => rows.push(row),
                None => {
                    warn!(
                        "no parseable frame numbers in {}; directory skipped",
                        dir.display()
                    );
                }
            }
        }

        info!("scan complete: {} row(s)", rows.len());
        Ok(rows)
    }

    fn build_row(&self, dir: &Path, files: Vec<PathBuf>) -> Option<AssetRow> {
        let (start_frame, end_frame) = frame_range(&files)?;

        let shot = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let parent = dir.parent().unwrap_or(dir);
        let sequence = parent
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Initial version guess: next free version next to the scan folder.
        // The validation engine recomputes this against the real version
        // root before anything is published.
        let version_label = versioning::next_version(parent).unwrap_or_else(|e| {
            warn!("version listing failed for {}: {}", parent.display(), e);
            naming::format_version(1)
        });
        let version = naming::parse_version(&version_label).unwrap_or(1);

        let fields = descriptive_fields(self.provider, &files[0], self.config.pipeline.fps());

        debug!(
            "row: {}/{} frames {}-{} version {}",
            sequence, shot, start_frame, end_frame, version_label
        );

        Some(AssetRow {
            editorial: self.config.editorial.shots.contains(&shot),
            sequence,
            shot,
            scan_dir: dir.to_path_buf(),
            start_frame,
            end_frame,
            timecode: fields.timecode,
            colorspace: fields.colorspace,
            modified: modified_date(dir),
            frame_rate: self.config.pipeline.frame_rate,
            version,
            source_version: String::new(),
            resolved_version_dir: None,
            thumbnail: None,
            movie: None,
            mp4: None,
            selected: true,
        })
    }
}

/// Every directory under `root` holding at least one frame file, with its
/// frame files sorted by name. Ordered by path for deterministic output.
fn frame_dirs(root: &Path) -> Vec<(PathBuf, Vec<PathBuf>)> {
    let mut dirs: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !naming::is_frame_file(path) {
            continue;
        }
        if let Some(parent) = path.parent() {
            dirs.entry(parent.to_path_buf())
                .or_default()
                .push(path.to_path_buf());
        }
    }

    for files in dirs.values_mut() {
        files.sort();
    }
    dirs.into_iter().collect()
}

/// Group one directory's frame files by base name.
///
/// Returns `None` when no file in the directory parses, so the caller can
/// warn and move on. Files that do not parse individually are skipped with a
/// warning but do not invalidate the rest of the directory.
fn group_directory(dir: &Path, files: Vec<PathBuf>) -> Option<Vec<SequenceGroup>> {
    let mut by_base: BTreeMap<String, (Vec<PathBuf>, i64, i64)> = BTreeMap::new();

    for file in files {
        let Some(name) = file
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(naming::parse)
        else {
            warn!("unparseable frame name skipped: {}", file.display());
            continue;
        };

        let entry = by_base
            .entry(name.base().to_string())
            .or_insert_with(|| (Vec::new(), i64::MAX, i64::MIN));
        entry.0.push(file);
        entry.1 = entry.1.min(name.frame);
        entry.2 = entry.2.max(name.frame);
    }

    if by_base.is_empty() {
        return None;
    }

    Some(
        by_base
            .into_iter()
            .map(|(base_name, (mut files, start, end))| {
                files.sort();
                SequenceGroup {
                    dir: dir.to_path_buf(),
                    base_name,
                    files,
                    start_frame: start,
                    end_frame: end,
                }
            })
            .collect(),
    )
}

/// Inclusive frame range over the parseable files, or `None` if nothing
/// parses.
fn frame_range(files: &[PathBuf]) -> Option<(i64, i64)> {
    let frames: Vec<i64> = files
        .iter()
        .filter_map(|f| f.file_name().and_then(|n| n.to_str()))
        .filter_map(naming::parse)
        .map(|name| name.frame)
        .collect();

    match (frames.iter().min(), frames.iter().max()) {
        (Some(&min), Some(&max)) => Some((min, max)),
        _ => None,
    }
}

fn modified_date(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| {
            DateTime::<Local>::from(t)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_default()
}
