use super::reference::load_reference_image;
use super::{MatchError, ReferenceImage, VideoInput};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;
use zip::write::SimpleFileOptions;

/// Temporary storage for one run.
///
/// Everything a run writes lives under one temp directory which is removed
/// by [`RunContext::close`], or on drop if the run bails out early.
pub struct RunContext {
    id: Uuid,
    temp_dir: TempDir,
    image_dir: PathBuf,
    video_dir: PathBuf,
    output_dir: PathBuf,
    staged_names: HashSet<String>,
}

/// Reduce an upload name to a bare file name
fn upload_file_name(name: &str) -> Result<String, MatchError> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| MatchError::InvalidName(name.to_string()))
}

impl RunContext {
    pub fn new() -> Result<Self> {
        let id = Uuid::new_v4();
        let temp_dir = tempfile::Builder::new()
            .prefix(&format!("vidmatch-{}-", id))
            .tempdir()
            .context("Failed to create temp directory")?;

        let image_dir = temp_dir.path().join("images");
        let video_dir = temp_dir.path().join("videos");
        let output_dir = temp_dir.path().join("output");
        for dir in [&image_dir, &video_dir, &output_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        log::debug!("Run {} staging under {:?}", id, temp_dir.path());

        Ok(Self {
            id,
            temp_dir,
            image_dir,
            video_dir,
            output_dir,
            staged_names: HashSet::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_upload(&mut self, dir_kind: &str, name: &str, bytes: &[u8]) -> Result<(String, PathBuf)> {
        let file_name = upload_file_name(name)?;
        let key = format!("{}/{}", dir_kind, file_name);
        if !self.staged_names.insert(key) {
            return Err(MatchError::DuplicateName(file_name).into());
        }

        let dir = if dir_kind == "images" {
            &self.image_dir
        } else {
            &self.video_dir
        };
        let path = dir.join(&file_name);
        std::fs::write(&path, bytes).with_context(|| format!("Failed to save {}", file_name))?;

        Ok((file_name, path))
    }

    /// Save an uploaded image and decode it for matching
    pub fn stage_image(&mut self, name: &str, bytes: &[u8], size: u32) -> Result<ReferenceImage> {
        let (file_name, _) = self.write_upload("images", name, bytes)?;
        let image = load_reference_image(&file_name, bytes, size)?;

        Ok(image)
    }

    /// Save an uploaded video; frames are only read at match time
    pub fn stage_video(&mut self, name: &str, bytes: &[u8]) -> Result<VideoInput> {
        let (file_name, path) = self.write_upload("videos", name, bytes)?;

        Ok(VideoInput {
            name: file_name,
            path,
        })
    }

    /// Zip the output directory into `archive_path`
    pub fn package<P: AsRef<Path>>(&self, archive_path: P) -> Result<PathBuf> {
        let archive_path = archive_path.as_ref().to_path_buf();
        let file = File::create(&archive_path)
            .with_context(|| format!("Failed to create archive {}", archive_path.display()))?;

        let mut writer = zip::ZipWriter::new(BufWriter::new(file));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut entries = std::fs::read_dir(&self.output_dir)
            .context("Failed to list output directory")?
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            writer
                .start_file(name.as_str(), options)
                .with_context(|| format!("Failed to add {} to archive", name))?;
            let mut source = File::open(entry.path())?;
            std::io::copy(&mut source, &mut writer)
                .with_context(|| format!("Failed to write {} to archive", name))?;
        }

        let mut inner = writer.finish().context("Failed to finish archive")?;
        inner.flush()?;

        log::info!("Packaged renamed videos into {}", archive_path.display());

        Ok(archive_path)
    }

    /// Delete every temporary file of the run
    pub fn close(self) -> Result<()> {
        let id = self.id;
        self.temp_dir
            .close()
            .context("Failed to delete temporary files")?;
        log::info!("All temporary files of run {} have been deleted.", id);

        Ok(())
    }
}
