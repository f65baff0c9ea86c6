//! Isolated-environment launcher.
//!
//! Some tools (the OpenImageIO stack in particular) cannot be loaded in the
//! host process or even found on the host PATH; facilities expose them
//! through a package-environment launcher (`rez-env` or similar). Commands
//! are rewritten as `<launcher> <package> -- <tool> <args...>` and executed
//! as ordinary subprocesses.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, ToolCommand, ToolOutput};

/// Runs tools inside a named package environment.
#[derive(Debug, Clone)]
pub struct EnvLauncher {
    launcher: PathBuf,
    package: String,
    timeout: Duration,
}

impl EnvLauncher {
    /// Create a launcher for the given launcher binary and package identifier.
    pub fn new(launcher: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        Self {
            launcher: launcher.into(),
            package: package.into(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Override the per-invocation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The package identifier this launcher resolves.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The launcher binary.
    pub fn launcher(&self) -> &Path {
        &self.launcher
    }

    /// Whether the launcher binary can be found at all.
    pub fn available(&self) -> bool {
        self.launcher.exists() || which::which(&self.launcher).is_ok()
    }

    /// Run `<tool> <args...>` inside the package environment.
    ///
    /// A non-zero exit surfaces the subprocess's stderr in the error; a
    /// deadline expiry is reported as a distinct, retryable timeout error.
    pub fn run(&self, args: &[&str]) -> Result<ToolOutput> {
        tracing::debug!(
            "launching in {} environment: {:?}",
            self.package,
            args.first().unwrap_or(&"")
        );

        ToolCommand::new(&self.launcher)
            .arg(self.package.as_str())
            .arg("--")
            .args(args.iter().copied())
            .timeout(self.timeout)
            .run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_launcher_is_unavailable() {
        let launcher = EnvLauncher::new("/no/such/launcher_xyz", "oiio-2.5.13");
        assert!(!launcher.available());
        assert!(launcher.run(&["oiiotool", "--help"]).is_err());
    }
}
