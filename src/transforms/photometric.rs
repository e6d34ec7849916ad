//! Intensity remapping transforms.
//!
//! Everything here is a per-pixel lookup or a histogram-driven remap.
//! CLAHE is the one exception with real structure: it builds a clipped
//! equalization table per tile and applies each tile's table to its own
//! pixels.

use image::GrayImage;
use imageproc::contrast::{equalize_histogram, stretch_contrast};
use rayon::prelude::*;

/// Saturating linear rescale `out = alpha * in + beta`.
pub fn rescale(image: &GrayImage, alpha: f32, beta: f32) -> GrayImage {
    let mut lut = [0u8; 256];
    for (value, entry) in lut.iter_mut().enumerate() {
        *entry = (alpha * value as f32 + beta).round().clamp(0.0, 255.0) as u8;
    }
    map_lut(image, &lut)
}

/// Global histogram equalization.
pub fn equalize(image: &GrayImage) -> GrayImage {
    equalize_histogram(image)
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into a `grid` x `grid` tile grid. Each tile gets its
/// own histogram, clipped at `clip_limit` times the uniform bin count with
/// the excess redistributed evenly, and the resulting CDF becomes that
/// tile's lookup table. Tiles are mapped independently, without cross-tile
/// interpolation, which is enough for decoding purposes and keeps the
/// remap cheap.
pub fn clahe(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let width = image.width() as usize;
    let height = image.height() as usize;
    if width == 0 || height == 0 {
        return image.clone();
    }
    let grid = grid.max(1) as usize;
    let tile_w = width.div_ceil(grid);
    let tile_h = height.div_ceil(grid);
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let luts: Vec<[u8; 256]> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|index| {
            let tx = index % tiles_x;
            let ty = index / tiles_x;
            let x_start = tx * tile_w;
            let y_start = ty * tile_h;
            let x_end = (x_start + tile_w).min(width);
            let y_end = (y_start + tile_h).min(height);

            let mut histogram = [0u32; 256];
            for y in y_start..y_end {
                for x in x_start..x_end {
                    histogram[image.get_pixel(x as u32, y as u32)[0] as usize] += 1;
                }
            }

            let tile_pixels = ((x_end - x_start) * (y_end - y_start)) as u32;
            // At least 1, so tiny tiles do not clip their histogram to nothing.
            let clip_value = ((tile_pixels as f32 * clip_limit / 256.0) as u32).max(1);
            let mut clipped = 0u32;
            for count in histogram.iter_mut() {
                if *count > clip_value {
                    clipped += *count - clip_value;
                    *count = clip_value;
                }
            }
            let redistributed = clipped / 256;
            for count in histogram.iter_mut() {
                *count += redistributed;
            }

            let mut lut = [0u8; 256];
            let mut cdf = 0u32;
            for (value, entry) in lut.iter_mut().enumerate() {
                cdf += histogram[value];
                *entry = ((cdf as f32 / tile_pixels as f32) * 255.0).min(255.0) as u8;
            }
            lut
        })
        .collect();

    let mut buffer = vec![0u8; width * height];
    buffer
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let ty = (y / tile_h).min(tiles_y - 1);
            for (x, out) in row.iter_mut().enumerate() {
                let tx = (x / tile_w).min(tiles_x - 1);
                let lut = &luts[ty * tiles_x + tx];
                *out = lut[image.get_pixel(x as u32, y as u32)[0] as usize];
            }
        });

    GrayImage::from_raw(image.width(), image.height(), buffer)
        .expect("buffer length matches image dimensions")
}

/// Gamma correction; values below 1.0 darken, above 1.0 brighten.
pub fn gamma(image: &GrayImage, gamma: f32) -> GrayImage {
    let exponent = 1.0 / gamma.max(f32::EPSILON);
    let mut lut = [0u8; 256];
    for (value, entry) in lut.iter_mut().enumerate() {
        *entry = ((value as f32 / 255.0).powf(exponent) * 255.0).round() as u8;
    }
    map_lut(image, &lut)
}

/// Stretch the observed intensity range to the full 0..=255 scale.
pub fn auto_contrast(image: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in image.pixels() {
        min = min.min(pixel[0]);
        max = max.max(pixel[0]);
    }
    if min >= max {
        return image.clone();
    }
    stretch_contrast(image, min, max, 0, 255)
}

/// Invert intensities.
pub fn invert(image: &GrayImage) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = 255 - pixel[0];
    }
    out
}

fn map_lut(image: &GrayImage, lut: &[u8; 256]) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = lut[pixel[0] as usize];
    }
    out
}
