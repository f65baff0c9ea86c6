//! Shared helpers for integration tests.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use plateflow::config::Config;
use plateflow::metadata::{HeaderProvider, COLORSPACE_KEY, TIMECODE_KEY};

/// Header provider returning a fixed attribute table, so scans never need
/// the image runtime.
pub struct StubHeaderProvider {
    header: HashMap<String, String>,
}

impl StubHeaderProvider {
    pub fn new() -> Self {
        let mut header = HashMap::new();
        header.insert(TIMECODE_KEY.to_string(), "(25,)".to_string());
        header.insert(COLORSPACE_KEY.to_string(), "ACES - ACEScg".to_string());
        Self { header }
    }

    pub fn empty() -> Self {
        Self {
            header: HashMap::new(),
        }
    }
}

impl HeaderProvider for StubHeaderProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn read_header(&self, _frame: &Path) -> plateflow_av::Result<HashMap<String, String>> {
        Ok(self.header.clone())
    }
}

/// Write `count` fake frame files named `<base>_<start + i:04>.exr`.
pub fn write_frames(dir: &Path, base: &str, start: i64, count: i64) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).unwrap();
    (0..count)
        .map(|i| {
            let path = dir.join(format!("{base}_{n:04}.exr", n = start + i));
            std::fs::write(&path, format!("frame {n}", n = start + i)).unwrap();
            path
        })
        .collect()
}

/// A config whose project marker conventions point into the test tree.
pub fn test_config() -> Config {
    Config::default()
}
