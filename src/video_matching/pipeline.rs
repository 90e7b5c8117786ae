use super::matcher::Matcher;
use super::rename::apply_renames;
use super::report::RunReport;
use super::run::RunContext;
use super::video::init_ffmpeg;
use super::{MatchError, Upload};
use crate::config::MatchConfig;
use anyhow::{Context, Result};
use std::path::Path;

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, named after its file name
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {}", path.display()))?;
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        Ok(Self::new(name, bytes))
    }
}

/// One complete run: stage, match, rename and package.
///
/// Returns `MatchError::MissingInput` before touching the disk when either
/// set is empty. A reference image that fails to decode aborts the run;
/// unreadable videos are only skipped. The archive is written only when
/// at least one video was renamed.
pub fn run_batch<P: AsRef<Path>>(
    config: &MatchConfig,
    images: &[Upload],
    videos: &[Upload],
    archive_path: P,
) -> Result<RunReport> {
    if images.is_empty() || videos.is_empty() {
        return Err(MatchError::MissingInput.into());
    }

    init_ffmpeg()?;

    let mut run = RunContext::new()?;
    log::info!(
        "Run {}: {} images, {} videos",
        run.id(),
        images.len(),
        videos.len()
    );

    let mut references = Vec::with_capacity(images.len());
    for upload in images {
        if !config.accepts_image(&upload.name) {
            log::warn!("Ignoring image with unsupported extension: {}", upload.name);
            continue;
        }
        let image = run
            .stage_image(&upload.name, &upload.bytes, config.frame_size)
            .with_context(|| format!("Failed to load reference image {}", upload.name))?;
        references.push(image);
    }

    let mut staged = Vec::with_capacity(videos.len());
    for upload in videos {
        if !config.accepts_video(&upload.name) {
            log::warn!("Ignoring video with unsupported extension: {}", upload.name);
            continue;
        }
        staged.push(run.stage_video(&upload.name, &upload.bytes)?);
    }

    log::info!("Processing videos...");
    let matcher = Matcher::with_frame_size(references, config.frame_size);
    let outcome = matcher.run(&staged);

    let renamed = apply_renames(
        &staged,
        &outcome.matches,
        run.output_dir(),
        config.include_unmatched,
    )?;

    let archive_path = if renamed.is_empty() {
        log::warn!("No videos were renamed.");
        None
    } else {
        Some(run.package(archive_path)?)
    };

    run.close()?;

    Ok(RunReport {
        renamed,
        skipped: outcome.skipped,
        archive_path,
    })
}
