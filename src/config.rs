use crate::video_matching::DEFAULT_FRAME_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Edge of the square buffer frames and images are resized to
    pub frame_size: u32,
    /// Accepted reference image extensions, lowercase, without the dot
    pub image_extensions: Vec<String>,
    /// Accepted video extensions, lowercase, without the dot
    pub video_extensions: Vec<String>,
    /// Put videos that could not be matched into the archive unchanged
    pub include_unmatched: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            image_extensions: vec!["png".to_string()],
            video_extensions: vec!["mp4".to_string()],
            include_unmatched: true,
        }
    }
}

fn has_extension(name: &str, accepted: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| accepted.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

impl MatchConfig {
    pub fn accepts_image(&self, name: &str) -> bool {
        has_extension(name, &self.image_extensions)
    }

    pub fn accepts_video(&self, name: &str) -> bool {
        has_extension(name, &self.video_extensions)
    }
}
