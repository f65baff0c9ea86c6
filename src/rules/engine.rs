//! The validation engine: runs requested checks over the selected rows.

use std::collections::HashSet;
use std::fmt::Write as _;

use tracing::warn;

use crate::config::Config;
use crate::naming::{find_version_segment, format_version};
use crate::state::RowSet;

use super::checks::{run_check, CheckContext};
use super::{CheckKind, ValidationResult};

/// Everything that happened to one row during a validation run.
#[derive(Debug)]
pub struct RowReport {
    /// Index of the row in the row set.
    pub row_index: usize,
    /// Results of the requested checks, in request order. Empty when the
    /// row failed before any check could run.
    pub results: Vec<ValidationResult>,
    /// Row-level failure that short-circuited the checks (bad scan path,
    /// unresolvable version root).
    pub fatal: Option<String>,
}

impl RowReport {
    pub fn passed(&self) -> bool {
        self.fatal.is_none() && self.results.iter().all(ValidationResult::passed)
    }
}

/// Aggregate outcome of a validation run across the selected rows.
#[derive(Debug)]
pub struct ValidationReport {
    pub rows: Vec<RowReport>,
}

impl ValidationReport {
    /// A run passes iff every requested check on every selected row
    /// produced zero errors.
    pub fn passed(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(RowReport::passed)
    }

    /// Human-readable report text, one block per row.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for report in &self.rows {
            let _ = writeln!(out, "-- row {} --------------------", report.row_index + 1);
            if let Some(fatal) = &report.fatal {
                let _ = writeln!(out, "  FAILED: {fatal}");
                continue;
            }
            for result in &report.results {
                let mark = if result.passed() { "ok" } else { "FAIL" };
                let _ = writeln!(out, "  [{}] {}", result.name(), mark);
                for error in result.errors() {
                    let _ = writeln!(out, "    - {error}");
                }
            }
        }
        out
    }
}

/// Runs named checks against selected rows, mutating their version state.
pub struct ValidationEngine<'a> {
    config: &'a Config,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run the requested checks over every selected row.
    ///
    /// Rows are isolated: a row that cannot be prepared (missing scan path,
    /// no project marker) is reported as failed and the remaining rows still
    /// run. The version check mutates row version state as it goes.
    pub fn run(&self, rows: &mut RowSet, checks: &[CheckKind]) -> ValidationReport {
        let editorial: HashSet<String> = self.config.editorial.shots.iter().cloned().collect();
        let mut reports = Vec::new();

        for index in rows.selected_indices() {
            let row = rows
                .get_mut(index)
                .expect("selected index out of range");

            if !row.scan_dir.is_dir() {
                reports.push(RowReport {
                    row_index: index,
                    results: Vec::new(),
                    fatal: Some(format!(
                        "invalid scan path: {}",
                        row.scan_dir.display()
                    )),
                });
                continue;
            }

            let version_root = match self.config.paths.version_root_for(
                &row.scan_dir,
                &row.sequence,
                &row.shot,
            ) {
                Ok(root) => root,
                Err(e) => {
                    reports.push(RowReport {
                        row_index: index,
                        results: Vec::new(),
                        fatal: Some(e.to_string()),
                    });
                    continue;
                }
            };

            // The source-version label lives on the version-root path.
            row.source_version = find_version_segment(&version_root).unwrap_or_else(|| {
                warn!(
                    "no version segment on {}; defaulting to v001",
                    version_root.display()
                );
                format_version(1)
            });

            let ctx = CheckContext {
                version_root: &version_root,
                entered_version: row.version,
                nominal_fps: self.config.pipeline.frame_rate,
                fps_tolerance: self.config.pipeline.fps_tolerance,
                editorial: &editorial,
            };

            let results = checks
                .iter()
                .map(|&kind| run_check(kind, row, &ctx))
                .collect();

            reports.push(RowReport {
                row_index: index,
                results,
                fatal: None,
            });
        }

        ValidationReport { rows: reports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_run_does_not_pass() {
        let report = ValidationReport { rows: Vec::new() };
        assert!(!report.passed());
    }

    #[test]
    fn test_render_marks_failures() {
        let mut failing = ValidationResult::new(CheckKind::Timecode);
        failing.add("start frame 5 != 1");
        let report = ValidationReport {
            rows: vec![
                RowReport {
                    row_index: 0,
                    results: vec![ValidationResult::new(CheckKind::Editorial), failing],
                    fatal: None,
                },
                RowReport {
                    row_index: 1,
                    results: Vec::new(),
                    fatal: Some("invalid scan path: /nope".to_string()),
                },
            ],
        };

        assert!(!report.passed());
        let text = report.render();
        assert!(text.contains("-- row 1 --"));
        assert!(text.contains("[Editorial] ok"));
        assert!(text.contains("[Timecode] FAIL"));
        assert!(text.contains("start frame 5 != 1"));
        assert!(text.contains("FAILED: invalid scan path"));
    }
}
