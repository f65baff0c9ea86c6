//! Locating the external tools the pipeline drives.
//!
//! Every tool plateflow runs directly (the encoder, the environment
//! launcher) may be pinned to a facility build in configuration; anything
//! not pinned is taken from PATH. Resolution and the check-tools version
//! probe both go through here so the two never disagree about which binary
//! is in play.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Outcome of probing one tool for the check-tools report.
#[derive(Debug, Clone)]
pub struct ToolProbe {
    /// Tool name as configured.
    pub name: String,
    /// Whether the resolved binary answered the version query.
    pub available: bool,
    /// First line of the version output, when available.
    pub version: Option<String>,
    /// The binary that was (or would have been) run.
    pub path: Option<PathBuf>,
}

/// Resolve a tool binary, preferring an explicit configured path over a
/// PATH lookup.
///
/// # Errors
///
/// Returns an error when the tool is neither configured nor on PATH.
pub fn resolve_tool(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "configured {} path {} does not exist; falling back to PATH",
            name,
            path.display()
        );
    }

    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Resolve a tool and ask it for its version.
///
/// Never fails: an unresolvable or unresponsive tool comes back with
/// `available: false` so the check-tools report can list what is missing.
pub fn probe_tool(name: &str, configured: Option<&Path>, version_arg: &str) -> ToolProbe {
    let binary = match resolve_tool(name, configured) {
        Ok(binary) => binary,
        Err(_) => {
            return ToolProbe {
                name: name.to_string(),
                available: false,
                version: None,
                path: None,
            };
        }
    };

    match Command::new(&binary).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());
            ToolProbe {
                name: name.to_string(),
                available: true,
                version,
                path: Some(binary),
            }
        }
        _ => ToolProbe {
            name: name.to_string(),
            available: false,
            version: None,
            path: Some(binary),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("encoder");
        std::fs::write(&fake, b"").unwrap();

        let resolved = resolve_tool("nonexistent_tool_12345", Some(&fake)).unwrap();
        assert_eq!(resolved, fake);
    }

    #[test]
    fn test_resolve_missing_everywhere_errors() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("not-here");
        let result = resolve_tool("nonexistent_tool_12345", Some(&gone));
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }

    #[test]
    fn test_probe_missing_tool() {
        let probe = probe_tool("nonexistent_tool_12345", None, "--version");
        assert!(!probe.available);
        assert!(probe.version.is_none());
        assert!(probe.path.is_none());
    }
}
