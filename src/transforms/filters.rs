//! Smoothing and sharpening filters, thin wrappers over imageproc.

use image::GrayImage;
use imageproc::filter::{bilateral_filter, gaussian_blur_f32, median_filter, sharpen3x3, sharpen_gaussian};

/// Gaussian blur with the given standard deviation.
pub fn gaussian(image: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(image, sigma)
}

/// Median filter over a square window of side `2 * radius + 1`.
pub fn median(image: &GrayImage, radius: u32) -> GrayImage {
    median_filter(image, radius, radius)
}

/// Edge-preserving bilateral filter.
pub fn bilateral(image: &GrayImage, window: u32, sigma_color: f32, sigma_spatial: f32) -> GrayImage {
    bilateral_filter(image, window, sigma_color, sigma_spatial)
}

/// Unsharp mask: the original plus `amount` times the residue against a
/// Gaussian-blurred copy.
pub fn unsharp(image: &GrayImage, sigma: f32, amount: f32) -> GrayImage {
    sharpen_gaussian(image, sigma, amount)
}

/// Fixed 3x3 sharpening kernel.
pub fn sharpen(image: &GrayImage) -> GrayImage {
    sharpen3x3(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_edge(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let base = if x < width / 2 { 40 } else { 200 };
            let jitter = ((x * 7 + y * 13) % 11) as u8;
            image::Luma([base + jitter])
        })
    }

    #[test]
    fn test_gaussian_softens_edge() {
        let image = noisy_edge(40, 40);
        let blurred = gaussian(&image, 2.0);
        let mid = 40 / 2;
        let edge_jump =
            blurred.get_pixel(mid, 20)[0] as i16 - blurred.get_pixel(mid - 1, 20)[0] as i16;
        let raw_jump = image.get_pixel(mid, 20)[0] as i16 - image.get_pixel(mid - 1, 20)[0] as i16;
        assert!(edge_jump.abs() < raw_jump.abs());
    }

    #[test]
    fn test_median_removes_salt_noise() {
        let mut image = GrayImage::from_pixel(21, 21, image::Luma([30]));
        image.put_pixel(10, 10, image::Luma([255]));
        let out = median(&image, 1);
        assert_eq!(out.get_pixel(10, 10)[0], 30);
    }

    #[test]
    fn test_filters_preserve_dimensions() {
        let image = noisy_edge(33, 27);
        assert_eq!(bilateral(&image, 9, 75.0, 75.0).dimensions(), (33, 27));
        assert_eq!(unsharp(&image, 10.0, 0.5).dimensions(), (33, 27));
        assert_eq!(sharpen(&image).dimensions(), (33, 27));
    }

    #[test]
    fn test_unsharp_widens_local_contrast() {
        let image = gaussian(&noisy_edge(40, 40), 1.5);
        let sharpened = unsharp(&image, 10.0, 0.5);
        let mid = 40 / 2;
        let before =
            image.get_pixel(mid + 2, 20)[0] as i16 - image.get_pixel(mid - 3, 20)[0] as i16;
        let after = sharpened.get_pixel(mid + 2, 20)[0] as i16
            - sharpened.get_pixel(mid - 3, 20)[0] as i16;
        assert!(after >= before);
    }
}
