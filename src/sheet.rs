//! Versioned metadata-sheet artifact.
//!
//! Scan results are exported as tabular records with fixed columns,
//! persisted as versioned files named `metadata_<seq>_v###.xlsx`. The
//! workbook encoding itself belongs to the spreadsheet tooling downstream;
//! this module owns the naming convention, the record shape, and a JSON
//! store used for headless round-trips.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::state::AssetRow;

/// One row of the exported sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetRecord {
    #[serde(rename = "SEQ")]
    pub sequence: String,
    #[serde(rename = "SHOT")]
    pub shot: String,
    #[serde(rename = "VER")]
    pub version: String,
    #[serde(rename = "SCAN")]
    pub scan_path: String,
    #[serde(rename = "FRANGE")]
    pub frame_range: String,
    #[serde(rename = "TCODE")]
    pub timecode: String,
    #[serde(rename = "COLORSPACE")]
    pub colorspace: String,
    #[serde(rename = "DATETIME")]
    pub date: String,
    #[serde(rename = "CAM")]
    pub camera: String,
    #[serde(rename = "MOVIE")]
    pub movie_path: String,
}

impl From<&AssetRow> for SheetRecord {
    fn from(row: &AssetRow) -> Self {
        Self {
            sequence: row.sequence.clone(),
            shot: row.shot.clone(),
            version: row.version_label(),
            scan_path: row.scan_dir.to_string_lossy().to_string(),
            frame_range: row.frame_range(),
            timecode: row.timecode.clone(),
            colorspace: row.colorspace.clone(),
            date: row.modified.clone(),
            camera: String::new(),
            movie_path: row
                .movie
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Next free sheet-artifact path in `dir`: `metadata_<seq>_v###.xlsx` with
/// the version one past the highest existing, or `v001`.
pub fn next_sheet_path(dir: &Path, seq_name: Option<&str>) -> PathBuf {
    let base = match seq_name {
        Some(seq) => format!("metadata_{seq}_"),
        None => "metadata_".to_string(),
    };

    let re = Regex::new(&format!(r"^{}v(\d{{3}})\.xlsx$", regex::escape(&base)))
        .expect("escaped sheet-name regex");

    let mut latest = 0u32;
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(version) = re
                .captures(name)
                .and_then(|caps| caps[1].parse::<u32>().ok())
            {
                latest = latest.max(version);
            }
        }
    }

    dir.join(format!("{base}v{:03}.xlsx", latest + 1))
}

/// Persistence seam for sheet records.
pub trait SheetStore {
    fn save(&self, records: &[SheetRecord], path: &Path) -> Result<()>;
    fn load(&self, path: &Path) -> Result<Vec<SheetRecord>>;
}

/// Built-in store writing the records as JSON. The xlsx encoder downstream
/// consumes the same record shape.
pub struct JsonSheetStore;

impl SheetStore for JsonSheetStore {
    fn save(&self, records: &[SheetRecord], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, records)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Vec<SheetRecord>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        serde_json::from_reader(file).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
