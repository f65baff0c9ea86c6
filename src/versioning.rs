//! Version-directory numbering.
//!
//! An asset directory holds `v###` children, one per publishable iteration.
//! These are pure queries: the validation engine owns directory creation.

use std::io;
use std::path::Path;

use crate::naming::{format_version, parse_version};

/// List the version numbers present under `dir`, sorted ascending.
///
/// A missing directory is treated as having no versions.
pub fn list_versions(dir: &Path) -> io::Result<Vec<u32>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut versions = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(version) = entry.file_name().to_str().and_then(parse_version) {
            versions.push(version);
        }
    }

    versions.sort_unstable();
    Ok(versions)
}

/// The highest version number under `dir`, if any.
pub fn latest_version(dir: &Path) -> io::Result<Option<u32>> {
    Ok(list_versions(dir)?.last().copied())
}

/// The next free version label under `dir`: one greater than the highest
/// existing version, or `v001` when the directory is empty or missing.
/// Gaps are permitted and never backfilled.
pub fn next_version(dir: &Path) -> io::Result<String> {
    let next = latest_version(dir)?.map_or(1, |latest| latest + 1);
    Ok(format_version(next))
}
