//! Tracking-service boundary.
//!
//! The pipeline ends by handing review media to the production tracking
//! system. Its internals are not our business; the [`TrackingService`]
//! trait is the seam, [`client::ShotGridClient`] the production
//! implementation, and [`LogTracker`] the stand-in used when tracking is
//! disabled.

mod client;

pub use client::ShotGridClient;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

/// Everything the tracking service needs to register one version.
#[derive(Debug, Clone)]
pub struct VersionPublish {
    /// Sequence (grouping entity) code.
    pub sequence: String,
    /// Shot code.
    pub shot: String,
    /// Version directory label, `v###`.
    pub version_code: String,
    /// Task code folded into the version name.
    pub task: String,
    /// Web review encoding, preferred for upload.
    pub webm: Option<PathBuf>,
    /// Broadcast review encoding, uploaded when the web one is missing.
    pub mp4: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
}

impl VersionPublish {
    /// Version entity name: `<shot>_<task>_<v###>`.
    pub fn version_name(&self) -> String {
        format!("{}_{}_{}", self.shot, self.task, self.version_code)
    }

    /// The movie to upload: web codec preferred over broadcast.
    pub fn preferred_movie(&self) -> Option<&PathBuf> {
        match &self.webm {
            Some(webm) if webm.exists() => Some(webm),
            _ => self.mp4.as_ref().filter(|mp4| mp4.exists()),
        }
    }
}

/// A version record created on the tracking service.
#[derive(Debug, Clone)]
pub struct PublishedVersion {
    pub version_id: i64,
    pub version_name: String,
}

/// Upserts sequence/shot entities, creates the version record, and attaches
/// the review media.
pub trait TrackingService: Send + Sync {
    fn publish_version(&self, publish: &VersionPublish) -> Result<PublishedVersion>;
}

/// No-op tracker used when tracking is disabled: logs what it would send.
pub struct LogTracker;

impl TrackingService for LogTracker {
    fn publish_version(&self, publish: &VersionPublish) -> Result<PublishedVersion> {
        info!(
            "tracking disabled; would publish {} (seq {}, movie {:?})",
            publish.version_name(),
            publish.sequence,
            publish.preferred_movie()
        );
        Ok(PublishedVersion {
            version_id: 0,
            version_name: publish.version_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_name() {
        let publish = VersionPublish {
            sequence: "20250516_2".to_string(),
            shot: "SH010".to_string(),
            version_code: "v003".to_string(),
            task: "CMP".to_string(),
            webm: None,
            mp4: None,
            thumbnail: None,
        };
        assert_eq!(publish.version_name(), "SH010_CMP_v003");
    }

    #[test]
    fn test_preferred_movie_falls_back_to_mp4() {
        let dir = tempfile::tempdir().unwrap();
        let webm = dir.path().join("clip.webm");
        let mp4 = dir.path().join("clip.mp4");
        std::fs::write(&mp4, b"x").unwrap();

        let publish = VersionPublish {
            sequence: String::new(),
            shot: String::new(),
            version_code: String::new(),
            task: String::new(),
            webm: Some(webm.clone()),
            mp4: Some(mp4.clone()),
            thumbnail: None,
        };
        // The webm path does not exist on disk, so the mp4 wins.
        assert_eq!(publish.preferred_movie(), Some(&mp4));

        std::fs::write(&webm, b"x").unwrap();
        assert_eq!(publish.preferred_movie(), Some(&webm));
    }
}
