//! Trait definition and types for frame-header providers.
//!
//! Header reading needs the image runtime (OpenImageIO), which may not be
//! loadable in the calling process. The [`HeaderProvider`] trait abstracts
//! over that capability: one implementation shells out through the
//! package-environment launcher, another (feature-gated) reads EXR headers
//! in-process. The backend is picked once at startup by capability probing,
//! never by scattered fallbacks at call sites.

use std::collections::HashMap;
use std::path::Path;

use super::timecode::decode_timecode;

/// Header key carrying the encoded SMPTE timecode.
pub const TIMECODE_KEY: &str = "smpte:TimeCode";

/// Header key carrying the color-space label.
pub const COLORSPACE_KEY: &str = "oiio:ColorSpace";

/// Reads the attribute table of a single frame file.
pub trait HeaderProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"launcher"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider can actually serve requests on this
    /// host.
    fn is_available(&self) -> bool;

    /// Read the frame's header attributes as a string-to-string mapping.
    fn read_header(&self, frame: &Path) -> plateflow_av::Result<HashMap<String, String>>;
}

/// The descriptive fields a scan row needs from a frame header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    /// Decoded `HH:MM:SS:FF` timecode, or empty.
    pub timecode: String,
    /// Color-space label, or empty.
    pub colorspace: String,
}

/// Extract the known descriptive fields from a frame header.
///
/// Absent keys yield empty values; a failed extraction degrades to empty
/// fields with a warning rather than failing the caller.
pub fn descriptive_fields(
    provider: &dyn HeaderProvider,
    frame: &Path,
    fps: u32,
) -> HeaderFields {
    match provider.read_header(frame) {
        Ok(header) => HeaderFields {
            timecode: decode_timecode(
                header.get(TIMECODE_KEY).map(String::as_str).unwrap_or(""),
                fps,
            ),
            colorspace: header.get(COLORSPACE_KEY).cloned().unwrap_or_default(),
        },
        Err(e) => {
            tracing::warn!(
                "header extraction failed for {}: {}",
                frame.display(),
                e
            );
            HeaderFields::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(HashMap<String, String>);

    impl HeaderProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn read_header(&self, _frame: &Path) -> plateflow_av::Result<HashMap<String, String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    impl HeaderProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn is_available(&self) -> bool {
            false
        }

        fn read_header(&self, _frame: &Path) -> plateflow_av::Result<HashMap<String, String>> {
            Err(plateflow_av::Error::tool_failed("oiio", "boom"))
        }
    }

    #[test]
    fn test_descriptive_fields() {
        let mut map = HashMap::new();
        map.insert(TIMECODE_KEY.to_string(), "(25,)".to_string());
        map.insert(COLORSPACE_KEY.to_string(), "ACES - ACEScg".to_string());
        let provider = FixedProvider(map);

        let fields = descriptive_fields(&provider, Path::new("a_0001.exr"), 24);
        assert_eq!(fields.timecode, "00:00:01:01");
        assert_eq!(fields.colorspace, "ACES - ACEScg");
    }

    #[test]
    fn test_absent_keys_yield_empty() {
        let provider = FixedProvider(HashMap::new());
        let fields = descriptive_fields(&provider, Path::new("a_0001.exr"), 24);
        assert_eq!(fields, HeaderFields::default());
    }

    #[test]
    fn test_failure_degrades_to_empty() {
        let fields = descriptive_fields(&FailingProvider, Path::new("a_0001.exr"), 24);
        assert_eq!(fields, HeaderFields::default());
    }
}
