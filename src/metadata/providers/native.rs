//! In-process header provider backed by the pure-Rust EXR reader.
//!
//! Only compiled with the `exr-native` feature. Attribute values are
//! stringified the way the out-of-process provider stringifies them on the
//! Python side, so downstream lookups see the same mapping shape.

use std::collections::HashMap;
use std::path::Path;

use plateflow_av::{Error, Result};

use crate::metadata::provider::{HeaderProvider, TIMECODE_KEY};

pub struct NativeHeaderProvider;

impl NativeHeaderProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeHeaderProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderProvider for NativeHeaderProvider {
    fn name(&self) -> &'static str {
        "native"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn read_header(&self, frame: &Path) -> Result<HashMap<String, String>> {
        let meta = exr::meta::MetaData::read_from_file(frame, false)
            .map_err(|e| Error::parse_error("exr", e.to_string()))?;

        let mut map = HashMap::new();
        if let Some(header) = meta.headers.first() {
            for (name, value) in &header.shared_attributes.other {
                map.insert(name.to_string(), format!("{value:?}"));
            }
            for (name, value) in &header.own_attributes.other {
                map.insert(name.to_string(), format!("{value:?}"));
            }
            if let Some(tc) = &header.shared_attributes.time_code {
                map.insert(TIMECODE_KEY.to_string(), format!("{tc:?}"));
            }
        }

        Ok(map)
    }
}
