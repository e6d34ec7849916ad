//! Resize, rotation and color-channel extraction.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// Resize both dimensions by `factor` with Catmull-Rom interpolation.
///
/// Dimensions are rounded and floored at 1 pixel so extreme factors never
/// produce an empty image.
pub fn scale(image: &GrayImage, factor: f32) -> GrayImage {
    let width = ((image.width() as f32 * factor).round() as u32).max(1);
    let height = ((image.height() as f32 * factor).round() as u32).max(1);
    imageops::resize(image, width, height, FilterType::CatmullRom)
}

/// Rotate about the image center with bilinear sampling.
///
/// Revealed corners are filled white to extend the quiet zone rather than
/// introduce dark regions a decoder could mistake for modules.
pub fn rotate(image: &GrayImage, degrees: f32) -> GrayImage {
    rotate_about_center(
        image,
        degrees.to_radians(),
        Interpolation::Bilinear,
        Luma([255u8]),
    )
}

/// A single channel of an RGB image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChannel {
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
}

impl ColorChannel {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            ColorChannel::Red => "red",
            ColorChannel::Green => "green",
            ColorChannel::Blue => "blue",
        }
    }
}

/// Extract one channel as a grayscale image.
///
/// Useful when a code is printed in color: ink that is invisible in the
/// luma average can have full contrast in a single channel.
pub fn extract_channel(image: &RgbImage, channel: ColorChannel) -> GrayImage {
    let index = match channel {
        ColorChannel::Red => 0,
        ColorChannel::Green => 1,
        ColorChannel::Blue => 2,
    };
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[index]])
    })
}
