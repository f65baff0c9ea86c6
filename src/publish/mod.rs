//! Publish orchestration.
//!
//! Glues the pieces together per selected row: locate the frame folder,
//! run the conversion pipeline into the row's resolved version directory,
//! record the media paths on the row, and hand the bundle to the tracking
//! service. Rows are isolated: one row's failure never stops the next.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::conversion::{ConversionArtifacts, ConversionPipeline};
use crate::naming;
use crate::state::{AssetRow, RowSet};
use crate::tracking::{TrackingService, VersionPublish};

/// Outcome of publishing one row.
#[derive(Debug)]
pub struct RowPublish {
    pub row_index: usize,
    /// The published version name on success, the failure text otherwise.
    pub outcome: Result<String, String>,
    /// True when the frame folder was picked by the name-blind fallback
    /// rather than a sequence/shot name match.
    pub used_fallback_folder: bool,
}

/// Aggregate outcome of a publish run.
#[derive(Debug, Default)]
pub struct PublishReport {
    pub rows: Vec<RowPublish>,
}

impl PublishReport {
    pub fn all_ok(&self) -> bool {
        self.rows.iter().all(|row| row.outcome.is_ok())
    }
}

/// Publishes validated rows.
pub struct PublishOrchestrator<'a> {
    config: &'a Config,
    tracker: &'a dyn TrackingService,
}

impl<'a> PublishOrchestrator<'a> {
    pub fn new(config: &'a Config, tracker: &'a dyn TrackingService) -> Self {
        Self { config, tracker }
    }

    /// Publish every selected row, one at a time.
    pub fn publish(&self, rows: &mut RowSet, scan_root: &Path) -> PublishReport {
        let pipeline = ConversionPipeline::new(self.config);
        let mut report = PublishReport::default();

        for index in rows.selected_indices() {
            let row = rows.get_mut(index).expect("selected index out of range");
            let (outcome, used_fallback) = match self.publish_row(row, scan_root, &pipeline) {
                Ok((version_name, used_fallback)) => (Ok(version_name), used_fallback),
                Err(e) => {
                    warn!("row {} publish failed: {:#}", index + 1, e);
                    (Err(format!("{e:#}")), false)
                }
            };
            report.rows.push(RowPublish {
                row_index: index,
                outcome,
                used_fallback_folder: used_fallback,
            });
        }

        report
    }

    fn publish_row(
        &self,
        row: &mut AssetRow,
        scan_root: &Path,
        pipeline: &ConversionPipeline<'_>,
    ) -> Result<(String, bool)> {
        let (frame_dir, used_fallback) =
            find_frame_folder(scan_root, &row.sequence, &row.shot).ok_or_else(|| {
                anyhow::anyhow!("no frame folder found under {}", scan_root.display())
            })?;
        if used_fallback {
            warn!(
                "no folder matched '{}' or '{}'; falling back to {}",
                row.sequence,
                row.shot,
                frame_dir.display()
            );
        }

        let frames = frame_files(&frame_dir)?;
        if frames.is_empty() {
            anyhow::bail!("no frame files in {}", frame_dir.display());
        }

        let dest_root = row.resolved_version_dir.clone().ok_or_else(|| {
            anyhow::anyhow!("row has no resolved version directory; run the version check first")
        })?;
        let version_code = dest_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| row.version_label());

        info!(
            "publishing {}/{} {} from {}",
            row.sequence,
            row.shot,
            version_code,
            frame_dir.display()
        );

        let artifacts = pipeline
            .run(&frames, &dest_root)
            .with_context(|| format!("conversion failed for {}", frame_dir.display()))?;
        record_artifacts(row, &artifacts);

        let publish = VersionPublish {
            sequence: row.sequence.clone(),
            shot: row.shot.clone(),
            version_code,
            task: self.config.tracking.task_code.clone(),
            webm: Some(artifacts.webm.clone()),
            mp4: Some(artifacts.mp4.clone()),
            thumbnail: Some(artifacts.thumbnail.clone()),
        };
        let published = self
            .tracker
            .publish_version(&publish)
            .context("tracking-service publish failed")?;

        Ok((published.version_name, used_fallback))
    }
}

fn record_artifacts(row: &mut AssetRow, artifacts: &ConversionArtifacts) {
    row.thumbnail = Some(artifacts.thumbnail.clone());
    row.movie = Some(artifacts.webm.clone());
    row.mp4 = Some(artifacts.mp4.clone());
}

/// Locate the frame folder for a row, breadth-first under the scan root.
///
/// The first directory (in breadth order) containing frame files whose path
/// contains the sequence or shot name wins; failing any name match, the
/// first directory holding frame files at all is returned with the fallback
/// flag set so the caller can surface the guess.
pub fn find_frame_folder(
    scan_root: &Path,
    sequence: &str,
    shot: &str,
) -> Option<(PathBuf, bool)> {
    let sequence = sequence.to_lowercase();
    let shot = shot.to_lowercase();
    let mut fallback: Option<PathBuf> = None;
    let mut queue = VecDeque::from([scan_root.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut children: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        children.sort();

        let has_frames = children
            .iter()
            .any(|p| p.is_file() && naming::is_frame_file(p));
        if has_frames {
            let dir_str = dir.to_string_lossy().to_lowercase();
            let name_match = (!sequence.is_empty() && dir_str.contains(&sequence))
                || (!shot.is_empty() && dir_str.contains(&shot));
            if name_match {
                return Some((dir, false));
            }
            if fallback.is_none() {
                fallback = Some(dir.clone());
            }
        }

        queue.extend(children.into_iter().filter(|p| p.is_dir()));
    }

    fallback.map(|dir| (dir, true))
}

/// Sorted frame files directly inside `dir`.
fn frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && naming::is_frame_file(p))
        .collect();
    frames.sort();
    Ok(frames)
}
