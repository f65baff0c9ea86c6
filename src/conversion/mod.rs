//! Review-media conversion.
//!
//! Turns a frame sequence into the publishable bundle: renumbered 8-bit
//! stills, preview thumbnails, two review encodings, and a renamed archival
//! copy with its high-fidelity transcode. Every stage is idempotent per
//! output file, so a rerun against an unchanged destination does no work.

mod pipeline;

pub use pipeline::ConversionPipeline;

use std::path::PathBuf;

/// Output bundle of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct ConversionArtifacts {
    /// Preferred preview thumbnail.
    pub thumbnail: PathBuf,
    /// Web review encoding.
    pub webm: PathBuf,
    /// Broadcast-friendly review encoding.
    pub mp4: PathBuf,
    /// High-fidelity transcode of the archival frames.
    pub movie: PathBuf,
    /// Directory holding the renamed archival frames.
    pub archive_dir: PathBuf,
}

/// Errors raised by the conversion stages.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("still extraction: {0}")]
    Stills(String),

    #[error("thumbnail generation: {0}")]
    Thumbnail(String),

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("video encode ({codec}): {source}")]
    Encode {
        codec: String,
        #[source]
        source: plateflow_av::Error,
    },

    #[error("archival copy: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
