//! Out-of-process header provider.
//!
//! Runs a short Python script under the package-environment launcher. The
//! script opens one frame with OpenImageIO and prints its attribute table as
//! a single JSON object line on stdout; stderr carries the diagnostic on
//! failure.

use std::collections::HashMap;
use std::path::Path;

use plateflow_av::{EnvLauncher, Error, Result};

use crate::metadata::provider::HeaderProvider;

/// The script executed inside the image-runtime environment.
const HEADER_SCRIPT: &str = "\
import json, sys
import OpenImageIO as oiio
img = oiio.ImageInput.open(sys.argv[1])
if not img:
    raise RuntimeError('cannot open ' + sys.argv[1])
spec = img.spec()
meta = {}
for attr in spec.extra_attribs:
    meta[str(attr.name)] = str(attr.value)
img.close()
print(json.dumps(meta))
";

/// Reads frame headers through the environment launcher.
pub struct LauncherHeaderProvider {
    launcher: EnvLauncher,
}

impl LauncherHeaderProvider {
    pub fn new(launcher: EnvLauncher) -> Self {
        Self { launcher }
    }
}

impl HeaderProvider for LauncherHeaderProvider {
    fn name(&self) -> &'static str {
        "launcher"
    }

    fn is_available(&self) -> bool {
        self.launcher.available()
    }

    fn read_header(&self, frame: &Path) -> Result<HashMap<String, String>> {
        let frame_arg = frame.to_string_lossy();
        let output = self
            .launcher
            .run(&["python", "-c", HEADER_SCRIPT, frame_arg.as_ref()])?;

        // Launcher banners may precede the payload; the mapping is the last
        // non-empty stdout line.
        let line = output
            .stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| Error::parse_error("python", "empty header output"))?;

        serde_json::from_str(line.trim())
            .map_err(|e| Error::parse_error("python", format!("bad header payload: {e}")))
    }
}
