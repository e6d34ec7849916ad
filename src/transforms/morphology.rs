//! Grayscale morphology with small square structuring elements.
//!
//! Closing removes small dark specks and fills dark cracks in the bright
//! background; opening removes bright pinholes inside dark bars. Both
//! operate on grayscale images so they can run before any binarization
//! step.

use image::GrayImage;
use imageproc::morphology::{grayscale_close, grayscale_open, Mask};

/// Closing: dilate then erode.
pub fn close(image: &GrayImage, radius: u8) -> GrayImage {
    grayscale_close(image, &square_mask(radius))
}

/// Opening: erode then dilate.
pub fn open(image: &GrayImage, radius: u8) -> GrayImage {
    grayscale_open(image, &square_mask(radius))
}

/// Opening followed by closing, for images with both kinds of speckle.
pub fn open_close(image: &GrayImage, radius: u8) -> GrayImage {
    close(&open(image, radius), radius)
}

fn square_mask(radius: u8) -> Mask {
    Mask::square(radius)
}
