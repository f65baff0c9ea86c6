//! Frame-sequence naming grammar.
//!
//! Every component that looks at a frame filename — the scanner grouping
//! files, the converter renumbering stills, the archival rename — goes
//! through this module so the convention is parsed exactly one way:
//! `<base><separator?><digits>.<ext>`, where the frame number is the last
//! run of digits in the stem.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Recognized frame-sequence extensions.
const FRAME_EXTENSIONS: &[&str] = &["exr", "dpx"];

/// Width of a version-directory number (`v001`).
pub const VERSION_WIDTH: usize = 3;

/// A parsed frame filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameName {
    /// Raw stem text before the frame digits (separators included).
    pub prefix: String,
    /// Parsed frame number.
    pub frame: i64,
    /// Digit count of the frame number as written.
    pub padding: usize,
    /// Raw stem text after the frame digits (rare, but preserved).
    pub suffix: String,
    /// File extension, lowercased.
    pub extension: String,
}

impl FrameName {
    /// Grouping key: the prefix with any trailing separator stripped.
    /// Empty when the filename is digits-only (`0001.exr`).
    pub fn base(&self) -> &str {
        self.prefix.trim_end_matches(['_', '.', '-'])
    }
}

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^v(\d{3})$").expect("static regex"))
}

fn shot_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+?)[._-]?\d+\.[A-Za-z0-9]+$").expect("static regex"))
}

/// Check if a path has a recognized frame-sequence extension.
pub fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Get the list of recognized frame-sequence extensions.
#[must_use]
pub fn frame_extensions() -> &'static [&'static str] {
    FRAME_EXTENSIONS
}

/// Parse a frame filename into its grammar parts.
///
/// Returns `None` when the name has no extension or no digit run in the
/// stem — such files do not belong to a sequence.
pub fn parse(file_name: &str) -> Option<FrameName> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }

    let m = digits_re().find_iter(stem).last()?;
    let frame: i64 = m.as_str().parse().ok()?;

    Some(FrameName {
        prefix: stem[..m.start()].to_string(),
        frame,
        padding: m.as_str().len(),
        suffix: stem[m.end()..].to_string(),
        extension: extension.to_lowercase(),
    })
}

/// Replace the trailing frame number in a stem, preserving any non-numeric
/// prefix and suffix. A stem without digits gets `_<number>` appended.
///
/// `shot_A_0032` -> `shot_A_1001`; `foo` -> `foo_1001`.
pub fn replace_frame_number(stem: &str, number: i64, width: usize) -> String {
    match digits_re().find_iter(stem).last() {
        Some(m) => format!(
            "{}{:0width$}{}",
            &stem[..m.start()],
            number,
            &stem[m.end()..],
        ),
        None => format!("{stem}_{number:0width$}"),
    }
}

/// Extract the shot code from a frame filename: the stem prefix before an
/// optional separator and the frame digits. `S008SH0040.0001.exr` -> `S008SH0040`.
/// Digit-only names keep whatever the lazy prefix leaves (`0001.exr` -> `0`),
/// so unprefixed scans still archive under a deterministic code.
pub fn shot_code(file_name: &str) -> Option<String> {
    shot_code_re()
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}

/// Build a printf-style encoder input pattern from a sample filename.
///
/// `shot_1001.jpg` -> (`shot_%04d.jpg`, 1001). The pattern is the file name
/// only; callers join it onto the sequence directory.
pub fn printf_pattern(sample_name: &str) -> Option<(String, i64)> {
    let name = parse(sample_name)?;
    let pattern = format!(
        "{}%0{}d{}.{}",
        name.prefix, name.padding, name.suffix, name.extension
    );
    Some((pattern, name.frame))
}

/// Parse a `v###` directory name into its version number.
pub fn parse_version(name: &str) -> Option<u32> {
    version_re()
        .captures(name)
        .and_then(|caps| caps[1].parse().ok())
}

/// Format a version number as a `v###` label.
pub fn format_version(version: u32) -> String {
    format!("v{version:0w$}", w = VERSION_WIDTH)
}

/// Walk a path and its ancestors looking for a `v###`-named segment.
pub fn find_version_segment(path: &Path) -> Option<String> {
    path.ancestors()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .find(|name| parse_version(name).is_some())
        .map(|name| name.to_string())
}
