//! The conversion pipeline stages.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::imageops::FilterType;
use tracing::{debug, info, warn};

use plateflow_av::{resolve_tool, EnvLauncher, SequenceEncoder};

use crate::config::Config;
use crate::naming;

use super::{ConversionArtifacts, StageError};

const THUMB_1080: &str = "thumb_1080.jpg";
const THUMB_2K: &str = "thumb_2k.jpg";
const THUMB_1K: &str = "thumb_1k.jpg";
const THUMB_FULL: &str = "thumb_full.jpg";

const WEBM_FILE: &str = "output_video.webm";
const MP4_FILE: &str = "output_video.mp4";
const MOV_FILE: &str = "output_video.mov";

const WEBM_ARGS: &[&str] = &[
    "-pix_fmt", "yuv420p", "-c:v", "libvpx", "-b:v", "1M", "-c:a", "libvorbis",
];
const MP4_ARGS: &[&str] = &["-pix_fmt", "yuv420p", "-c:v", "mpeg4", "-qscale:v", "2"];
const PRORES_ARGS: &[&str] = &["-c:v", "prores_ks", "-profile:v", "3", "-pix_fmt", "yuv422p10le"];

/// Transforms a frame sequence into review media and an archival copy.
pub struct ConversionPipeline<'a> {
    config: &'a Config,
    launcher: EnvLauncher,
}

impl<'a> ConversionPipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        let launcher = EnvLauncher::new(
            config.tools.env_launcher.clone(),
            config.tools.header_package.clone(),
        )
        .with_timeout(Duration::from_secs(config.tools.tool_timeout_secs));

        Self { config, launcher }
    }

    /// Run every stage against `frames`, writing under `dest_root`.
    ///
    /// Stage order matters: stills feed the thumbnails and the review
    /// encodes, the archival copy feeds the high-fidelity transcode. A
    /// failed stage aborts the run; stages whose outputs already exist are
    /// skipped, so reruns resume where they left off.
    pub fn run(
        &self,
        frames: &[PathBuf],
        dest_root: &Path,
    ) -> Result<ConversionArtifacts, StageError> {
        if frames.is_empty() {
            return Err(StageError::MissingInput("no frames to convert".to_string()));
        }
        let mut frames = frames.to_vec();
        frames.sort();

        info!(
            "converting {} frame(s) into {}",
            frames.len(),
            dest_root.display()
        );

        let jpg_dir = dest_root.join("jpg");
        let webm_dir = dest_root.join("webm");
        let mp4_dir = dest_root.join("mp4");
        let mov_dir = dest_root.join("mov");
        let org_dir = dest_root.join("org");
        for dir in [&jpg_dir, &webm_dir, &mp4_dir, &mov_dir, &org_dir] {
            std::fs::create_dir_all(dir)?;
        }

        let stills = self.extract_stills(&frames, &jpg_dir)?;
        let thumbnail = self.generate_thumbnails(&stills[0], &jpg_dir)?;
        let (webm, mp4) = self.encode_videos(&stills, &webm_dir, &mp4_dir)?;
        let archived = self.archive_frames(&frames, &org_dir)?;
        let movie = self.encode_archival(&archived, &mov_dir)?;

        Ok(ConversionArtifacts {
            thumbnail,
            webm,
            mp4,
            movie,
            archive_dir: org_dir,
        })
    }

    /// Stage 1: decode each frame through the image runtime and re-encode
    /// it as an 8-bit JPEG, renumbered from the synthetic start index.
    fn extract_stills(
        &self,
        frames: &[PathBuf],
        jpg_dir: &Path,
    ) -> Result<Vec<PathBuf>, StageError> {
        let start = self.config.pipeline.start_index;
        let mut stills = Vec::new();

        for (idx, frame) in frames.iter().enumerate() {
            let Some(stem) = frame.file_stem().and_then(|s| s.to_str()) else {
                warn!("frame with unusable name skipped: {}", frame.display());
                continue;
            };
            let new_stem = naming::replace_frame_number(stem, start + idx as i64, 4);
            let jpg = jpg_dir.join(format!("{new_stem}.jpg"));

            if jpg.exists() {
                debug!("still exists, skipping: {}", jpg.display());
                stills.push(jpg);
                continue;
            }

            let src = frame.to_string_lossy();
            let dst = jpg.to_string_lossy();
            match self
                .launcher
                .run(&["oiiotool", src.as_ref(), "--ch", "R,G,B", "-o", dst.as_ref()])
            {
                Ok(_) => {
                    debug!("converted {}", jpg.display());
                    stills.push(jpg);
                }
                Err(e) => {
                    warn!("frame conversion failed for {}: {}", frame.display(), e);
                }
            }
        }

        if stills.is_empty() {
            return Err(StageError::Stills(format!(
                "no stills produced in {}",
                jpg_dir.display()
            )));
        }
        info!("stills ready: {} file(s)", stills.len());
        Ok(stills)
    }

    /// Stage 2: previews from the first still. Skipped entirely when a
    /// previously generated marker thumbnail is present.
    fn generate_thumbnails(
        &self,
        first_still: &Path,
        jpg_dir: &Path,
    ) -> Result<PathBuf, StageError> {
        let t1080 = jpg_dir.join(THUMB_1080);
        let t1k = jpg_dir.join(THUMB_1K);
        if t1080.exists() {
            info!("thumbnail exists, skipping: {}", t1080.display());
            return Ok(t1080);
        }
        if t1k.exists() {
            info!("thumbnail exists, skipping: {}", t1k.display());
            return Ok(t1k);
        }

        let img = image::open(first_still).map_err(|e| {
            StageError::Thumbnail(format!("cannot decode {}: {e}", first_still.display()))
        })?;
        let (w, h) = (img.width(), img.height());
        let save = |img: &image::DynamicImage, path: &Path| {
            img.save(path)
                .map_err(|e| StageError::Thumbnail(format!("cannot write {}: {e}", path.display())))
        };

        if w >= self.config.pipeline.uhd_width && h >= self.config.pipeline.uhd_height {
            save(&img.resize_exact(1920, 1080, FilterType::Lanczos3), &t1080)?;
            save(
                &img.resize_exact(2048, 1080, FilterType::Lanczos3),
                &jpg_dir.join(THUMB_2K),
            )?;
            info!("thumbnails written: {}", t1080.display());
            Ok(t1080)
        } else {
            let ratio = 1080.0 / w.max(h) as f64;
            let nw = (f64::from(w) * ratio).round() as u32;
            let nh = (f64::from(h) * ratio).round() as u32;
            save(&img.resize_exact(nw.max(1), nh.max(1), FilterType::Lanczos3), &t1k)?;
            save(&img, &jpg_dir.join(THUMB_FULL))?;
            info!("thumbnails written: {}", t1k.display());
            Ok(t1k)
        }
    }

    /// Stage 3: two review encodings from the renumbered stills, both
    /// driven by one inferred `%0Nd` pattern and the fixed playback rate.
    fn encode_videos(
        &self,
        stills: &[PathBuf],
        webm_dir: &Path,
        mp4_dir: &Path,
    ) -> Result<(PathBuf, PathBuf), StageError> {
        let first = stills
            .first()
            .ok_or_else(|| StageError::MissingInput("no stills to encode".to_string()))?;
        let name = first
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StageError::MissingInput("unusable still name".to_string()))?;
        let (pattern, start) = naming::printf_pattern(name).ok_or_else(|| {
            StageError::MissingInput(format!("no frame-number pattern in {name}"))
        })?;
        let input = first
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(pattern);
        let input = input.to_string_lossy();

        let webm = webm_dir.join(WEBM_FILE);
        let mp4 = mp4_dir.join(MP4_FILE);

        if webm.exists() && mp4.exists() {
            info!("review encodings exist, skipping");
            return Ok((webm, mp4));
        }

        let encoder = self.encoder()?;
        if webm.exists() {
            info!("encoding exists, skipping: {}", webm.display());
        } else {
            encoder
                .encode(input.as_ref(), start, WEBM_ARGS, &webm)
                .map_err(|source| StageError::Encode {
                    codec: "libvpx".to_string(),
                    source,
                })?;
        }
        if mp4.exists() {
            info!("encoding exists, skipping: {}", mp4.display());
        } else {
            encoder
                .encode(input.as_ref(), start, MP4_ARGS, &mp4)
                .map_err(|source| StageError::Encode {
                    codec: "mpeg4".to_string(),
                    source,
                })?;
        }

        Ok((webm, mp4))
    }

    /// Stage 4a: copy the originals into the archival directory under
    /// deterministic names: shot code plus a sequential index from the
    /// synthetic start.
    fn archive_frames(
        &self,
        frames: &[PathBuf],
        org_dir: &Path,
    ) -> Result<Vec<PathBuf>, StageError> {
        let first_name = frames[0]
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StageError::Archive("unusable frame name".to_string()))?;
        let shot = naming::shot_code(first_name).ok_or_else(|| {
            StageError::Archive(format!("cannot derive shot code from {first_name}"))
        })?;

        let start = self.config.pipeline.start_index;
        let mut archived = Vec::new();
        for (idx, src) in frames.iter().enumerate() {
            let ext = src
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("exr")
                .to_lowercase();
            let dst = org_dir.join(format!("{shot}_{n:04}.{ext}", n = start + idx as i64));
            if dst.exists() {
                debug!("archival frame exists, skipping: {}", dst.display());
            } else {
                std::fs::copy(src, &dst).map_err(|e| {
                    StageError::Archive(format!(
                        "copy {} -> {}: {e}",
                        src.display(),
                        dst.display()
                    ))
                })?;
            }
            archived.push(dst);
        }

        info!("archival copy ready: {} frame(s)", archived.len());
        Ok(archived)
    }

    /// Stage 4b: high-fidelity intermediate transcode of the archival set.
    fn encode_archival(
        &self,
        archived: &[PathBuf],
        mov_dir: &Path,
    ) -> Result<PathBuf, StageError> {
        let movie = mov_dir.join(MOV_FILE);
        if movie.exists() {
            info!("archival transcode exists, skipping: {}", movie.display());
            return Ok(movie);
        }

        let first = archived
            .first()
            .ok_or_else(|| StageError::MissingInput("no archival frames".to_string()))?;
        let name = first
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StageError::MissingInput("unusable archival name".to_string()))?;
        let (pattern, start) = naming::printf_pattern(name).ok_or_else(|| {
            StageError::MissingInput(format!("no frame-number pattern in {name}"))
        })?;
        let input = first
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(pattern);

        self.encoder()?
            .encode(input.to_string_lossy().as_ref(), start, PRORES_ARGS, &movie)
            .map_err(|source| StageError::Encode {
                codec: "prores_ks".to_string(),
                source,
            })?;

        Ok(movie)
    }

    /// Resolve the encoder lazily so fully-skipped runs never need ffmpeg.
    fn encoder(&self) -> Result<SequenceEncoder, StageError> {
        let ffmpeg = resolve_tool("ffmpeg", self.config.tools.ffmpeg.as_deref()).map_err(
            |source| StageError::Encode {
                codec: "ffmpeg".to_string(),
                source,
            },
        )?;

        let mut encoder = SequenceEncoder::new(ffmpeg, self.config.pipeline.frame_rate)
            .with_timeout(Duration::from_secs(self.config.tools.tool_timeout_secs));

        if let Some(lib_path) = &self.config.tools.encoder_lib_path {
            let existing = std::env::var("LD_LIBRARY_PATH").unwrap_or_default();
            encoder = encoder.env(
                "LD_LIBRARY_PATH",
                format!("{}:{existing}", lib_path.display()),
            );
        }

        Ok(encoder)
    }
}
