//! Numbered-still-sequence encoding via the ffmpeg CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, ToolCommand};

/// Encodes a numbered still sequence (`name.%04d.jpg` style input) into a
/// single movie file at a fixed playback rate.
///
/// Codec selection is the caller's business; this type owns the invocation
/// shape shared by every encode: input pattern, explicit start number,
/// framerate, overwrite, output path.
#[derive(Debug, Clone)]
pub struct SequenceEncoder {
    ffmpeg: PathBuf,
    frame_rate: f64,
    envs: Vec<(String, String)>,
    timeout: Duration,
}

impl SequenceEncoder {
    /// Create an encoder around the given ffmpeg binary.
    pub fn new(ffmpeg: impl Into<PathBuf>, frame_rate: f64) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            frame_rate,
            envs: Vec::new(),
            timeout: Duration::from_secs(1800),
        }
    }

    /// Add an environment variable to every encoder invocation
    /// (shared-library search paths, typically).
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Override the per-encode deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Encode `input_pattern` (printf-style, e.g. `/x/shot_%04d.jpg`)
    /// starting at `start_number` into `output` using `codec_args`.
    pub fn encode(
        &self,
        input_pattern: &str,
        start_number: i64,
        codec_args: &[&str],
        output: &Path,
    ) -> Result<()> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("encoding {} -> {}", input_pattern, output.display());

        let mut cmd = ToolCommand::new(&self.ffmpeg);
        cmd.arg("-framerate")
            .arg(format_rate(self.frame_rate))
            .arg("-start_number")
            .arg(start_number.to_string())
            .arg("-i")
            .arg(input_pattern)
            .args(codec_args.iter().copied())
            .arg("-y")
            .arg(output.to_string_lossy().to_string())
            .timeout(self.timeout);
        for (key, value) in &self.envs {
            cmd.env(key.as_str(), value.as_str());
        }

        cmd.run()?;
        tracing::info!("encode complete: {}", output.display());
        Ok(())
    }
}

/// ffmpeg rejects `24.0` style rates in some builds; emit integers bare.
fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{}", rate as i64)
    } else {
        format!("{rate}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_formatting() {
        assert_eq!(format_rate(24.0), "24");
        assert_eq!(format_rate(23.976), "23.976");
    }

    #[test]
    fn missing_encoder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let enc = SequenceEncoder::new("/no/such/ffmpeg_xyz", 24.0);
        let out = dir.path().join("out/clip.webm");
        let result = enc.encode("/no/such/%04d.jpg", 1001, &["-c:v", "libvpx"], &out);
        assert!(result.is_err());
        // Output directory is still created so reruns can skip cleanly.
        assert!(out.parent().unwrap().is_dir());
    }
}
