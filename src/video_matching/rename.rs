use super::{MatchResult, RenamedVideo, VideoInput};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("valid file name pattern"));

/// Split a file name into stem and extension, ignoring a leading dot
fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}

/// Stem of an image name that is safe to use as a file name.
///
/// Leading dots are dropped so the result never names a hidden file, and a
/// name that is nothing but an extension (`.png`) falls back to `video`.
pub fn sanitize_base_name(image_name: &str) -> String {
    let stem = match image_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => image_name,
    };
    let cleaned = UNSAFE_CHARS.replace_all(stem, "_");
    let cleaned = cleaned.trim().trim_start_matches('.').trim();

    if cleaned.is_empty() {
        "video".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<image stem>.<video extension>`
pub fn target_file_name(image_name: &str, video_name: &str) -> String {
    let base = sanitize_base_name(image_name);

    match split_extension(video_name).1 {
        Some(ext) => format!("{}.{}", base, ext),
        None => base,
    }
}

/// Hands out output names, suffixing `_1`, `_2`, ... once a name is taken.
///
/// Names are compared case-insensitively so `Dog.mp4` and `dog.mp4` can't
/// land on the same file on macOS or Windows. The returned name keeps the
/// caller's casing.
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_lowercase())
    }

    pub fn reserve(&mut self, candidate: &str) -> String {
        if self.claim(candidate) {
            return candidate.to_string();
        }

        let (stem, ext) = split_extension(candidate);
        let mut n = 1;
        loop {
            let name = match ext {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            };
            if self.claim(&name) {
                return name;
            }
            n += 1;
        }
    }
}

/// Move every matched video into `output_dir` under its new name.
///
/// Matches are applied in order, so when two videos point at the same image
/// the first keeps the plain name. Unmatched videos keep their original name
/// when `include_unmatched` is set. Nothing in `output_dir` is overwritten.
pub fn apply_renames(
    videos: &[VideoInput],
    matches: &[MatchResult],
    output_dir: &Path,
    include_unmatched: bool,
) -> Result<Vec<RenamedVideo>> {
    let mut registry = NameRegistry::new();
    for entry in std::fs::read_dir(output_dir).context("Failed to list output directory")? {
        let entry = entry?;
        registry.reserve(&entry.file_name().to_string_lossy());
    }

    let mut renamed = Vec::with_capacity(matches.len());
    let mut matched: HashSet<&str> = HashSet::new();

    for found in matches {
        let video = videos
            .iter()
            .find(|v| v.name == found.video_name)
            .with_context(|| format!("Match refers to unknown video '{}'", found.video_name))?;

        let new_name = registry.reserve(&target_file_name(&found.image_name, &video.name));
        std::fs::rename(&video.path, output_dir.join(&new_name))
            .with_context(|| format!("Failed to rename {} to {}", video.name, new_name))?;

        matched.insert(video.name.as_str());
        renamed.push(RenamedVideo {
            original_name: video.name.clone(),
            new_name,
            image_name: found.image_name.clone(),
            score: found.score,
        });
    }

    if include_unmatched {
        for video in videos.iter().filter(|v| !matched.contains(v.name.as_str())) {
            let kept_name = registry.reserve(&video.name);
            std::fs::rename(&video.path, output_dir.join(&kept_name))
                .with_context(|| format!("Failed to move unmatched video {}", video.name))?;
            log::debug!("Kept unmatched video {} as {}", video.name, kept_name);
        }
    }

    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_target_name_uses_video_extension() {
        assert_eq!(target_file_name("cat.png", "clip1.mp4"), "cat.mp4");
        assert_eq!(target_file_name("holiday.photo.png", "a.MOV"), "holiday.photo.MOV");
        assert_eq!(target_file_name("dog", "clip"), "dog");
    }

    #[test]
    fn test_sanitize_base_name() {
        assert_eq!(sanitize_base_name("a/b:c.png"), "a_b_c");
        assert_eq!(sanitize_base_name("  .png"), "video");
        assert_eq!(sanitize_base_name("what?.png"), "what_");
    }

    #[test]
    fn test_dot_names_do_not_become_hidden_files() {
        assert_eq!(sanitize_base_name(".png"), "video");
        assert_eq!(sanitize_base_name("..png"), "video");
        assert_eq!(sanitize_base_name(".hidden.png"), "hidden");
        assert_eq!(target_file_name(".png", "clip.mp4"), "video.mp4");
    }

    #[test]
    fn test_registry_suffixes_collisions() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.reserve("dog.mp4"), "dog.mp4");
        assert_eq!(registry.reserve("dog.mp4"), "dog_1.mp4");
        assert_eq!(registry.reserve("dog_1.mp4"), "dog_1_1.mp4");
        assert_eq!(registry.reserve("dog.mp4"), "dog_2.mp4");
    }

    #[test]
    fn test_registry_ignores_case() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.reserve("Dog.mp4"), "Dog.mp4");
        assert_eq!(registry.reserve("dog.mp4"), "dog_1.mp4");
        assert_eq!(registry.reserve("DOG_1.MP4"), "DOG_1_1.MP4");
    }

    fn staged(dir: &Path, name: &str, bytes: &[u8]) -> VideoInput {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        VideoInput {
            name: name.to_string(),
            path,
        }
    }

    fn found(video: &str, image: &str, score: f64) -> MatchResult {
        MatchResult {
            video_name: video.to_string(),
            image_name: image.to_string(),
            score,
        }
    }

    #[test]
    fn test_apply_renames_never_overwrites() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let videos = vec![
            staged(input.path(), "a.mp4", b"first"),
            staged(input.path(), "b.mp4", b"second"),
            staged(input.path(), "dog.mp4", b"third"),
        ];
        let matches = vec![found("a.mp4", "dog.png", 0.9), found("b.mp4", "dog.png", 0.8)];

        let renamed = apply_renames(&videos, &matches, output.path(), true).unwrap();

        let new_names: Vec<_> = renamed.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, ["dog.mp4", "dog_1.mp4"]);
        assert_eq!(std::fs::read(output.path().join("dog.mp4")).unwrap(), b"first");
        assert_eq!(std::fs::read(output.path().join("dog_1.mp4")).unwrap(), b"second");
        // The unmatched original "dog.mp4" is kept without clobbering
        assert_eq!(std::fs::read(output.path().join("dog_2.mp4")).unwrap(), b"third");
    }

    #[test]
    fn test_apply_renames_can_drop_unmatched() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let videos = vec![
            staged(input.path(), "a.mp4", b"first"),
            staged(input.path(), "broken.mp4", b"junk"),
        ];

        let renamed =
            apply_renames(&videos, &[found("a.mp4", "cat.png", 0.5)], output.path(), false).unwrap();

        assert_eq!(renamed.len(), 1);
        assert_eq!(renamed[0].new_name, "cat.mp4");
        let count = std::fs::read_dir(output.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_images_differing_only_in_case_get_distinct_files() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let videos = vec![
            staged(input.path(), "clip1.mp4", b"first"),
            staged(input.path(), "clip2.mp4", b"second"),
        ];
        let matches = vec![found("clip1.mp4", "Dog.png", 0.9), found("clip2.mp4", "dog.png", 0.7)];

        let renamed = apply_renames(&videos, &matches, output.path(), true).unwrap();

        let new_names: Vec<_> = renamed.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, ["Dog.mp4", "dog_1.mp4"]);
        assert_eq!(std::fs::read(output.path().join("Dog.mp4")).unwrap(), b"first");
        assert_eq!(std::fs::read(output.path().join("dog_1.mp4")).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 2);
    }
}
