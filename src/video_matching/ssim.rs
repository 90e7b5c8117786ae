//! Mean structural similarity between two grayscale buffers.
//!
//! Uses a 7x7 uniform window with sample covariance, stabilised by the
//! usual `C1 = (0.01 * L)^2` and `C2 = (0.03 * L)^2` constants for 8-bit
//! data. Only windows lying fully inside the image contribute to the mean.

use super::{MatchError, MatchingResult};
use image::GrayImage;

pub const WINDOW: u32 = 7;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Summed-area table with one row and column of zero padding
struct Integral {
    stride: usize,
    sums: Vec<f64>,
}

impl Integral {
    fn build(width: usize, height: usize, value: impl Fn(usize, usize) -> f64) -> Self {
        let stride = width + 1;
        let mut sums = vec![0.0; stride * (height + 1)];

        for y in 0..height {
            let mut row = 0.0;
            for x in 0..width {
                row += value(x, y);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }

        Self { stride, sums }
    }

    /// Sum over the window whose top-left corner is (x, y)
    fn window(&self, x: usize, y: usize, size: usize) -> f64 {
        let s = self.stride;
        let (x1, y1) = (x + size, y + size);
        self.sums[y1 * s + x1] - self.sums[y * s + x1] - self.sums[y1 * s + x] + self.sums[y * s + x]
    }
}

pub fn score(frame: &GrayImage, image: &GrayImage) -> MatchingResult<f64> {
    if frame.dimensions() != image.dimensions() {
        return Err(MatchError::SizeMismatch {
            left: frame.dimensions(),
            right: image.dimensions(),
        });
    }

    let (width, height) = frame.dimensions();
    if width < WINDOW || height < WINDOW {
        return Err(MatchError::WindowTooLarge {
            width,
            height,
            window: WINDOW,
        });
    }

    let (w, h) = (width as usize, height as usize);
    let a = |x: usize, y: usize| frame.get_pixel(x as u32, y as u32).0[0] as f64;
    let b = |x: usize, y: usize| image.get_pixel(x as u32, y as u32).0[0] as f64;

    let sum_a = Integral::build(w, h, a);
    let sum_b = Integral::build(w, h, b);
    let sum_aa = Integral::build(w, h, |x, y| a(x, y) * a(x, y));
    let sum_bb = Integral::build(w, h, |x, y| b(x, y) * b(x, y));
    let sum_ab = Integral::build(w, h, |x, y| a(x, y) * b(x, y));

    let win = WINDOW as usize;
    let n = (win * win) as f64;
    let cov_norm = n / (n - 1.0);
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let mut total = 0.0;
    let mut count = 0usize;

    for y in 0..=(h - win) {
        for x in 0..=(w - win) {
            let mean_a = sum_a.window(x, y, win) / n;
            let mean_b = sum_b.window(x, y, win) / n;
            let var_a = cov_norm * (sum_aa.window(x, y, win) / n - mean_a * mean_a);
            let var_b = cov_norm * (sum_bb.window(x, y, win) / n - mean_b * mean_b);
            let cov = cov_norm * (sum_ab.window(x, y, win) / n - mean_a * mean_b);

            let numerator = (2.0 * mean_a * mean_b + c1) * (2.0 * cov + c2);
            let denominator = (mean_a * mean_a + mean_b * mean_b + c1) * (var_a + var_b + c2);

            total += numerator / denominator;
            count += 1;
        }
    }

    Ok((total / count as f64).clamp(-1.0, 1.0))
}
