use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::Result;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub editorial: EditorialConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// External tool locations. These were absolute paths baked into the
/// original facility scripts; here they are injected configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Package-environment launcher binary (rez-env or compatible).
    #[serde(default = "default_env_launcher")]
    pub env_launcher: PathBuf,

    /// Package identifier resolving the image runtime (OpenImageIO).
    #[serde(default = "default_header_package")]
    pub header_package: String,

    /// Encoder binary. Falls back to PATH lookup when unset.
    #[serde(default)]
    pub ffmpeg: Option<PathBuf>,

    /// Extra shared-library directory prepended to LD_LIBRARY_PATH for
    /// encoder invocations (facility libvpx builds).
    #[serde(default)]
    pub encoder_lib_path: Option<PathBuf>,

    /// Deadline for a single external-tool invocation, in seconds.
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

fn default_env_launcher() -> PathBuf {
    PathBuf::from("rez-env")
}

fn default_header_package() -> String {
    "oiio-2.5.13".to_string()
}

fn default_tool_timeout() -> u64 {
    300
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            env_launcher: default_env_launcher(),
            header_package: default_header_package(),
            ffmpeg: None,
            encoder_lib_path: None,
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Nominal playback rate. Every encode and every timecode decode uses it.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Allowed deviation from the nominal rate before validation fails.
    #[serde(default = "default_fps_tolerance")]
    pub fps_tolerance: f64,

    /// Resolution at or above which a source counts as UHD and gets the
    /// two-preview thumbnail treatment.
    #[serde(default = "default_uhd_width")]
    pub uhd_width: u32,

    #[serde(default = "default_uhd_height")]
    pub uhd_height: u32,

    /// Synthetic start index stills and archival frames are renumbered to.
    #[serde(default = "default_start_index")]
    pub start_index: i64,
}

fn default_frame_rate() -> f64 {
    24.0
}

fn default_fps_tolerance() -> f64 {
    0.01
}

fn default_uhd_width() -> u32 {
    3840
}

fn default_uhd_height() -> u32 {
    2160
}

fn default_start_index() -> i64 {
    1001
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            fps_tolerance: default_fps_tolerance(),
            uhd_width: default_uhd_width(),
            uhd_height: default_uhd_height(),
            start_index: default_start_index(),
        }
    }
}

impl PipelineConfig {
    /// Integer frames-per-second used as the timecode divisor.
    pub fn fps(&self) -> u32 {
        self.frame_rate.round() as u32
    }
}

/// Project directory conventions used to derive the version root from a
/// scan path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory name marking the project base inside any scan path.
    #[serde(default = "default_project_marker")]
    pub project_marker: String,

    /// Sequence tree directory under the project base.
    #[serde(default = "default_seq_subdir")]
    pub seq_subdir: String,

    /// Plate subpath under each shot directory holding version folders.
    #[serde(default = "default_plate_subpath")]
    pub plate_subpath: PathBuf,
}

fn default_project_marker() -> String {
    "scandata_project".to_string()
}

fn default_seq_subdir() -> String {
    "seq".to_string()
}

fn default_plate_subpath() -> PathBuf {
    PathBuf::from("org/plate/org")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            project_marker: default_project_marker(),
            seq_subdir: default_seq_subdir(),
            plate_subpath: default_plate_subpath(),
        }
    }
}

impl PathsConfig {
    /// Derive the version-root directory for a row from its scan path:
    /// `<base up to marker>/<seq_subdir>/<sequence>/<shot>/<plate_subpath>`.
    ///
    /// Fails when the scan path does not contain the project marker.
    pub fn version_root_for(&self, scan_dir: &Path, sequence: &str, shot: &str) -> Result<PathBuf> {
        let marker = std::ffi::OsStr::new(&self.project_marker);
        let mut base = PathBuf::new();
        let mut found = false;
        for component in scan_dir.components() {
            base.push(component);
            if component.as_os_str() == marker {
                found = true;
                break;
            }
        }
        if !found {
            anyhow::bail!(
                "scan path {} does not contain the project marker '{}'",
                scan_dir.display(),
                self.project_marker
            );
        }

        Ok(base
            .join(&self.seq_subdir)
            .join(sequence)
            .join(shot)
            .join(&self.plate_subpath))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EditorialConfig {
    /// Shot names currently approved for the active edit.
    #[serde(default)]
    pub shots: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackingConfig {
    /// Publish to the tracking service after conversion. When disabled the
    /// publish step logs what it would have sent.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub script_name: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub project_id: i64,

    /// Task code folded into version names (`<shot>_<task>_<v###>`).
    #[serde(default = "default_task_code")]
    pub task_code: String,
}

fn default_task_code() -> String {
    "CMP".to_string()
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            script_name: String::new(),
            api_key: String::new(),
            project_id: 0,
            task_code: default_task_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pipeline.frame_rate, 24.0);
        assert_eq!(config.pipeline.fps(), 24);
        assert_eq!(config.pipeline.start_index, 1001);
        assert_eq!(config.paths.project_marker, "scandata_project");
        assert!(!config.tracking.enabled);
    }

    #[test]
    fn test_version_root_for() {
        let paths = PathsConfig::default();
        let scan = Path::new("/show/scandata_project/product/scan/20250516_2/shotA");
        let root = paths.version_root_for(scan, "20250516_2", "shotA").unwrap();
        assert_eq!(
            root,
            Path::new("/show/scandata_project/seq/20250516_2/shotA/org/plate/org")
        );
    }

    #[test]
    fn test_version_root_requires_marker() {
        let paths = PathsConfig::default();
        let scan = Path::new("/show/elsewhere/scan/shotA");
        assert!(paths.version_root_for(scan, "seq", "shotA").is_err());
    }
}
