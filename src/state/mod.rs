//! In-memory row state.
//!
//! One [`AssetRow`] per discovered sequence directory, held in an ordered
//! [`RowSet`] with a selection flag per row. Any front end (the dialog table
//! in the original tool, the CLI here) is a view over this collection; the
//! validation engine and the publisher mutate rows only through it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::naming::format_version;

/// One shot/version candidate row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRow {
    /// Sequence (parent directory) name.
    pub sequence: String,
    /// Shot (scan directory) name.
    pub shot: String,
    /// Directory the frames were discovered in.
    pub scan_dir: PathBuf,
    pub start_frame: i64,
    pub end_frame: i64,
    /// Decoded `HH:MM:SS:FF` timecode of the first frame, or empty.
    pub timecode: String,
    /// Color-space label of the first frame, or empty.
    pub colorspace: String,
    /// Scan directory modification date, `YYYY-MM-DD HH:MM:SS`.
    pub modified: String,
    /// Playback rate the sequence was scanned at.
    pub frame_rate: f64,
    /// Entered version number. The version check may advance it.
    pub version: u32,
    /// `v###` label discovered on the version-root path, or empty until the
    /// row has been prepared for validation.
    pub source_version: String,
    /// Whether the shot is on the editorial list.
    pub editorial: bool,
    /// Version directory resolved by the version check; publish target.
    pub resolved_version_dir: Option<PathBuf>,
    /// Media produced by the publish step.
    pub thumbnail: Option<PathBuf>,
    pub movie: Option<PathBuf>,
    pub mp4: Option<PathBuf>,
    /// Selection flag; only selected rows are validated and published.
    pub selected: bool,
}

impl AssetRow {
    /// Frame range rendered as `start-end`.
    pub fn frame_range(&self) -> String {
        format!("{}-{}", self.start_frame, self.end_frame)
    }

    /// Entered version rendered as a `v###` label.
    pub fn version_label(&self) -> String {
        format_version(self.version)
    }
}

/// Ordered collection of rows with selection accessors.
#[derive(Debug, Default)]
pub struct RowSet {
    rows: Vec<AssetRow>,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: AssetRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[AssetRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&AssetRow> {
        self.rows.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut AssetRow> {
        self.rows.get_mut(index)
    }

    pub fn select_all(&mut self) {
        for row in &mut self.rows {
            row.selected = true;
        }
    }

    /// Select exactly the rows matching the predicate.
    pub fn select_where(&mut self, pred: impl Fn(&AssetRow) -> bool) {
        for row in &mut self.rows {
            row.selected = pred(row);
        }
    }

    /// Indices of the selected rows, in table order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.selected)
            .map(|(i, _)| i)
            .collect()
    }
}
