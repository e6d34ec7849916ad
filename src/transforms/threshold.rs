//! Fixed and adaptive binarization.

use image::GrayImage;
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::filter::{box_filter, gaussian_blur_f32};

/// Rule applied at a fixed cut value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMode {
    /// Above the cut becomes white, the rest black.
    Binary,
    /// Above the cut becomes black, the rest white.
    BinaryInv,
    /// Values above the cut are clamped to it.
    Truncate,
    /// Values at or below the cut become black, the rest pass through.
    ToZero,
    /// Values above the cut become black, the rest pass through.
    ToZeroInv,
}

impl ThresholdMode {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            ThresholdMode::Binary => "binary",
            ThresholdMode::BinaryInv => "binary_inv",
            ThresholdMode::Truncate => "trunc",
            ThresholdMode::ToZero => "tozero",
            ThresholdMode::ToZeroInv => "tozero_inv",
        }
    }

    fn threshold_type(&self) -> ThresholdType {
        match self {
            ThresholdMode::Binary => ThresholdType::Binary,
            ThresholdMode::BinaryInv => ThresholdType::BinaryInverted,
            ThresholdMode::Truncate => ThresholdType::Truncate,
            ThresholdMode::ToZero => ThresholdType::ToZero,
            ThresholdMode::ToZeroInv => ThresholdType::ToZeroInverted,
        }
    }
}

/// Neighborhood weighting for the adaptive threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptiveWeighting {
    /// Unweighted mean over the block.
    Mean,
    /// Gaussian-weighted mean over the block.
    Gaussian,
}

impl AdaptiveWeighting {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            AdaptiveWeighting::Mean => "mean",
            AdaptiveWeighting::Gaussian => "gaussian",
        }
    }
}

/// Threshold at a fixed value.
pub fn fixed(image: &GrayImage, value: u8, mode: ThresholdMode) -> GrayImage {
    threshold(image, value, mode.threshold_type())
}

/// Threshold each pixel against its neighborhood mean minus a constant.
///
/// A pixel becomes white when it exceeds `mean(block) - c`, black
/// otherwise. This tolerates smooth illumination gradients that defeat any
/// single global cut value. `block` is forced odd with a minimum of 3.
pub fn adaptive(image: &GrayImage, weighting: AdaptiveWeighting, block: u32, c: i16) -> GrayImage {
    let block = block.max(3) | 1;
    let local_mean = match weighting {
        AdaptiveWeighting::Mean => box_filter(image, block / 2, block / 2),
        AdaptiveWeighting::Gaussian => gaussian_blur_f32(image, sigma_for_block(block)),
    };
    let mut out = image.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let cut = local_mean.get_pixel(x, y)[0] as i16 - c;
        pixel[0] = if (pixel[0] as i16) > cut { 255 } else { 0 };
    }
    out
}

// Standard deviation matching the conventional kernel-size heuristic
// sigma = 0.3 * ((block - 1) * 0.5 - 1) + 0.8.
fn sigma_for_block(block: u32) -> f32 {
    0.3 * ((block as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_binary_splits_at_cut() {
        let image = GrayImage::from_fn(16, 1, |x, _| image::Luma([(x * 16) as u8]));
        let out = fixed(&image, 127, ThresholdMode::Binary);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(15, 0)[0], 255);
        let inv = fixed(&image, 127, ThresholdMode::BinaryInv);
        assert_eq!(inv.get_pixel(0, 0)[0], 255);
        assert_eq!(inv.get_pixel(15, 0)[0], 0);
    }

    #[test]
    fn test_fixed_tozero_keeps_bright_values() {
        let image = GrayImage::from_fn(4, 1, |x, _| image::Luma([60 + (x as u8) * 60]));
        let out = fixed(&image, 127, ThresholdMode::ToZero);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(3, 0)[0], 240);
    }

    #[test]
    fn test_adaptive_output_is_binary() {
        let image = GrayImage::from_fn(40, 40, |x, y| image::Luma([(x * 3 + y * 2) as u8]));
        for weighting in [AdaptiveWeighting::Mean, AdaptiveWeighting::Gaussian] {
            let out = adaptive(&image, weighting, 11, 2);
            assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        }
    }

    #[test]
    fn test_adaptive_tracks_illumination_gradient() {
        // Dark bars on a background that brightens left to right. A global
        // cut at 127 loses the left half; the adaptive cut keeps both.
        let image = GrayImage::from_fn(64, 16, |x, y| {
            let background = 60 + (x * 3) as u8;
            if y >= 4 && y < 12 && x % 8 < 3 {
                image::Luma([background.saturating_sub(50)])
            } else {
                image::Luma([background])
            }
        });
        let out = adaptive(&image, AdaptiveWeighting::Mean, 11, 2);
        // Bar interiors at both ends of the gradient come out black.
        assert_eq!(out.get_pixel(1, 8)[0], 0);
        assert_eq!(out.get_pixel(57, 8)[0], 0);
        // Background between the bars stays white at both ends.
        assert_eq!(out.get_pixel(5, 8)[0], 255);
        assert_eq!(out.get_pixel(61, 8)[0], 255);
    }

    #[test]
    fn test_adaptive_forces_odd_block() {
        let image = GrayImage::from_fn(20, 20, |x, y| image::Luma([(x + y) as u8]));
        // Even block sizes must not panic and must still binarize.
        let out = adaptive(&image, AdaptiveWeighting::Gaussian, 10, 2);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
