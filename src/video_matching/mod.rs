pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod reference;
pub mod rename;
pub mod report;
pub mod run;
pub mod ssim;
pub mod video;

#[cfg(test)]
pub(crate) mod test_clip;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{MatchError, MatchingResult};

/// Edge length of the square buffers every frame and image is resized to
pub const DEFAULT_FRAME_SIZE: u32 = 256;

/// Named still image used as a matching target, kept in its grayscale form
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub name: String,
    pub gray: GrayImage,
}

/// Staged video container waiting for first-frame extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInput {
    pub name: String,
    pub path: PathBuf,
}

/// Best reference image picked for one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub video_name: String,
    pub image_name: String,
    pub score: f64,
}

/// Video left out of the matches because its frame could not be read or scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedVideo {
    pub video_name: String,
    pub reason: String,
}

/// Video moved to the output directory under its new name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenamedVideo {
    pub original_name: String,
    pub new_name: String,
    pub image_name: String,
    pub score: f64,
}

/// Named raw upload, before staging
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}
