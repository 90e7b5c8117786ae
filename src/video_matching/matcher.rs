use super::reference::{resize_for_comparison, to_gray};
use super::ssim::score;
use super::video::extract_first_frame;
use super::{
    DEFAULT_FRAME_SIZE, MatchError, MatchResult, MatchingResult, ReferenceImage, SkippedVideo,
    VideoInput,
};
use image::{GrayImage, RgbImage};

/// Matches and skips of one pass over the videos
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    pub matches: Vec<MatchResult>,
    pub skipped: Vec<SkippedVideo>,
}

/// Picks the best reference image for each video by first-frame SSIM.
///
/// Images are compared in the order they were given; when two images reach
/// the same best score the earlier one is kept. Several videos may end up
/// with the same image.
pub struct Matcher {
    images: Vec<ReferenceImage>,
    frame_size: u32,
}

impl Matcher {
    pub fn new(images: Vec<ReferenceImage>) -> Self {
        Self::with_frame_size(images, DEFAULT_FRAME_SIZE)
    }

    pub fn with_frame_size(images: Vec<ReferenceImage>, frame_size: u32) -> Self {
        Self { images, frame_size }
    }

    pub fn images(&self) -> &[ReferenceImage] {
        &self.images
    }

    /// Score one grayscale frame against every image, first-seen wins ties
    pub fn best_match(&self, video_name: &str, frame_gray: &GrayImage) -> MatchingResult<MatchResult> {
        let mut best: Option<(&str, f64)> = None;

        for image in &self.images {
            let s = score(frame_gray, &image.gray)?;
            log::debug!("{} vs {}: ssim={:.4}", video_name, image.name, s);

            let better = match best {
                Some((_, best_score)) => s > best_score,
                None => true,
            };
            if better {
                best = Some((image.name.as_str(), s));
            }
        }

        let (image_name, score) = best.ok_or_else(|| MatchError::NoCandidates {
            video: video_name.to_string(),
        })?;

        Ok(MatchResult {
            video_name: video_name.to_string(),
            image_name: image_name.to_string(),
            score,
        })
    }

    /// Match already extracted frames, in the order given.
    ///
    /// Frames of any size are brought to the matcher's frame size first.
    pub fn match_frames<I>(&self, frames: I) -> MatchReport
    where
        I: IntoIterator<Item = (String, MatchingResult<RgbImage>)>,
    {
        let mut report = MatchReport::default();

        for (video_name, frame) in frames {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("Cannot read video: {} ({})", video_name, e);
                    report.skipped.push(SkippedVideo {
                        video_name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let frame_gray = to_gray(&resize_for_comparison(&frame, self.frame_size));

            match self.best_match(&video_name, &frame_gray) {
                Ok(found) => {
                    log::info!(
                        "Matched {} -> {} (score={:.2})",
                        found.video_name,
                        found.image_name,
                        found.score
                    );
                    report.matches.push(found);
                }
                Err(MatchError::NoCandidates { video }) => {
                    log::debug!("No reference images for {}", video);
                }
                Err(e) => {
                    log::warn!("Cannot score video: {} ({})", video_name, e);
                    report.skipped.push(SkippedVideo {
                        video_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Extract each video's first frame and match it
    pub fn run(&self, videos: &[VideoInput]) -> MatchReport {
        log::info!(
            "Matching {} videos against {} reference images...",
            videos.len(),
            self.images.len()
        );

        let frames = videos
            .iter()
            .map(|video| (video.name.clone(), extract_first_frame(video, self.frame_size)));

        self.match_frames(frames)
    }

    pub fn match_all(&self, videos: &[VideoInput]) -> Vec<MatchResult> {
        self.run(videos).matches
    }
}
