use super::{MatchError, MatchingResult, ReferenceImage};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

/// Resize a buffer to the square comparison size.
///
/// Straight stretch: the aspect ratio is not preserved and nothing is cropped.
pub fn resize_for_comparison(img: &RgbImage, size: u32) -> RgbImage {
    if img.width() == size && img.height() == size {
        return img.clone();
    }

    imageops::resize(img, size, size, FilterType::Triangle)
}

/// Luma conversion shared by frames and reference images
pub fn to_gray(img: &RgbImage) -> GrayImage {
    imageops::grayscale(img)
}

impl ReferenceImage {
    /// Build a reference image from an already decoded RGB buffer
    pub fn from_rgb(name: impl Into<String>, img: &RgbImage, size: u32) -> Self {
        let gray = to_gray(&resize_for_comparison(img, size));

        Self {
            name: name.into(),
            gray,
        }
    }
}

pub fn load_reference_image(name: &str, raw: &[u8], size: u32) -> MatchingResult<ReferenceImage> {
    let decoded = image::load_from_memory(raw).map_err(|source| MatchError::Decode {
        name: name.to_string(),
        source,
    })?;

    Ok(ReferenceImage::from_rgb(name, &decoded.to_rgb8(), size))
}
