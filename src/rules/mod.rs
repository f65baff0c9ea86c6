//! Production-rule validation.
//!
//! Rows are checked against named rules before anything irreversible
//! happens. Checks are independent and order-insensitive, with one
//! deliberate exception: the version check creates version directories as a
//! side effect (see `checks`). The aggregate result gates publishing.

mod checks;
mod engine;

pub use engine::{RowReport, ValidationEngine, ValidationReport};

use std::str::FromStr;

/// A named validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Timecode,
    Version,
    SourceVersion,
    Editorial,
}

impl CheckKind {
    /// All checks, in report order.
    pub fn all() -> &'static [CheckKind] {
        &[
            CheckKind::Timecode,
            CheckKind::Version,
            CheckKind::SourceVersion,
            CheckKind::Editorial,
        ]
    }

    /// Display name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::Timecode => "Timecode",
            CheckKind::Version => "Version",
            CheckKind::SourceVersion => "Src Version",
            CheckKind::Editorial => "Editorial",
        }
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timecode" => Ok(CheckKind::Timecode),
            "version" => Ok(CheckKind::Version),
            "src-version" | "src_version" | "source-version" => Ok(CheckKind::SourceVersion),
            "editorial" => Ok(CheckKind::Editorial),
            _ => Err(format!("unknown check: {s}")),
        }
    }
}

/// Outcome of one named check on one row. Built up by the check function,
/// never mutated after it returns.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    name: &'static str,
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn new(kind: CheckKind) -> Self {
        Self {
            name: kind.name(),
            errors: Vec::new(),
        }
    }

    /// Record a failure.
    pub fn add(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_kind_parsing() {
        assert_eq!("timecode".parse::<CheckKind>().unwrap(), CheckKind::Timecode);
        assert_eq!(
            "src-version".parse::<CheckKind>().unwrap(),
            CheckKind::SourceVersion
        );
        assert_eq!(
            "SRC_VERSION".parse::<CheckKind>().unwrap(),
            CheckKind::SourceVersion
        );
        assert!("bogus".parse::<CheckKind>().is_err());
    }

    #[test]
    fn test_result_passes_iff_no_errors() {
        let mut res = ValidationResult::new(CheckKind::Timecode);
        assert!(res.passed());
        res.add("start frame 5 != 1");
        assert!(!res.passed());
        assert_eq!(res.errors().len(), 1);
    }
}
