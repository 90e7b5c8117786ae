use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vidmatch_rs::config::MatchConfig;
use vidmatch_rs::video_matching::Upload;
use vidmatch_rs::video_matching::pipeline::run_batch;

#[derive(Parser)]
#[command(version)]
/// Rename videos after the reference image their first frame looks most like
struct Cli {
    /// Reference images, as files or folders
    #[arg(long, num_args = 1.., required = true)]
    images: Vec<PathBuf>,

    /// Videos to rename, as files or folders
    #[arg(long, num_args = 1.., required = true)]
    videos: Vec<PathBuf>,

    /// Where to write the zip archive of renamed videos
    #[arg(short, long, default_value = "renamed_videos.zip")]
    output: PathBuf,

    /// Edge length frames and images are resized to before comparing
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u32).range(7..))]
    size: u32,

    /// Accepted image extension (repeatable)
    #[arg(long = "image-ext", default_values_t = ["png".to_string()])]
    image_extensions: Vec<String>,

    /// Accepted video extension (repeatable)
    #[arg(long = "video-ext", default_values_t = ["mp4".to_string()])]
    video_extensions: Vec<String>,

    /// Leave videos that could not be matched out of the archive
    #[arg(long)]
    only_renamed: bool,
}

impl Cli {
    fn config(&self) -> MatchConfig {
        let normalize = |exts: &[String]| -> Vec<String> {
            exts.iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect()
        };

        MatchConfig {
            frame_size: self.size,
            image_extensions: normalize(&self.image_extensions),
            video_extensions: normalize(&self.video_extensions),
            include_unmatched: !self.only_renamed,
        }
    }
}

/// Expand folders into their files, sorted by name so runs are reproducible
fn collect_uploads(paths: &[PathBuf]) -> Result<Vec<Upload>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries = std::fs::read_dir(path)
                .with_context(|| format!("Failed to list {}", path.display()))?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            entries.retain(|p| p.is_file());
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }

    files.iter().map(Upload::from_path).collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config();

    let images = collect_uploads(&cli.images)?;
    let videos = collect_uploads(&cli.videos)?;

    let report = run_batch(&config, &images, &videos, &cli.output)?;
    print!("{}", report);

    Ok(())
}
