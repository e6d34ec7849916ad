//! Image quality analysis for capture feedback.
//!
//! When every decode attempt fails, the caller still needs something
//! actionable to show the person holding the camera. This module measures
//! brightness, contrast and sharpness on the grayscale image and turns
//! out-of-range statistics into concrete retake advice.

use image::GrayImage;
use imageproc::filter::laplacian_filter;
use rayon::prelude::*;
use serde::Serialize;

/// Cut-off values separating acceptable captures from problematic ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityThresholds {
    /// Mean brightness below this is too dark.
    pub dark: f64,
    /// Mean brightness above this is too bright.
    pub bright: f64,
    /// Brightness standard deviation below this is low contrast.
    pub low_stddev: f64,
    /// Laplacian variance below this suggests blur.
    pub blur: f64,
    /// Intensity range below this suggests a flat, washed-out capture.
    pub flat_range: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        QualityThresholds {
            dark: 50.0,
            bright: 200.0,
            low_stddev: 30.0,
            blur: 100.0,
            flat_range: 100.0,
        }
    }
}

/// A single piece of retake advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Advice {
    /// Mean brightness below the dark threshold.
    TooDark,
    /// Mean brightness above the bright threshold.
    TooBright,
    /// Brightness standard deviation below the contrast threshold.
    LowContrast,
    /// Laplacian variance below the blur threshold.
    Blurry,
    /// Intensity range too narrow for a code to stand out.
    FlatContrast,
}

impl Advice {
    /// User-facing message for this advice.
    pub fn message(&self) -> &'static str {
        match self {
            Advice::TooDark => "Image is too dark - try better lighting",
            Advice::TooBright => {
                "Image is too bright - reduce lighting or adjust camera exposure"
            }
            Advice::LowContrast => "Low contrast - try to improve lighting conditions",
            Advice::Blurry => "Image appears blurry - hold camera steady and ensure good focus",
            Advice::FlatContrast => "Poor contrast between barcode and background",
        }
    }
}

impl std::fmt::Display for Advice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Measured statistics plus the advice they triggered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    /// Mean pixel intensity, 0.0 to 255.0.
    pub mean_brightness: f64,
    /// Standard deviation of pixel intensity.
    pub brightness_stddev: f64,
    /// Variance of the Laplacian; higher is sharper.
    pub sharpness: f64,
    /// Difference between the brightest and darkest pixel.
    pub contrast_range: f64,
    /// Advice triggered by the statistics, empty for a clean capture.
    pub recommendations: Vec<Advice>,
}

impl QualityReport {
    /// Whether no statistic fell outside its threshold.
    pub fn is_acceptable(&self) -> bool {
        self.recommendations.is_empty()
    }
}

/// Assess with the default thresholds.
pub fn assess(image: &GrayImage) -> QualityReport {
    assess_with(image, &QualityThresholds::default())
}

/// Assess brightness, contrast and sharpness against the given thresholds.
pub fn assess_with(image: &GrayImage, thresholds: &QualityThresholds) -> QualityReport {
    let raw = image.as_raw();
    let count = raw.len().max(1) as f64;
    let (sum, sum_sq, min, max) = raw
        .par_iter()
        .fold(
            || (0u64, 0u64, u8::MAX, u8::MIN),
            |(sum, sum_sq, min, max), &value| {
                (
                    sum + value as u64,
                    sum_sq + value as u64 * value as u64,
                    min.min(value),
                    max.max(value),
                )
            },
        )
        .reduce(
            || (0u64, 0u64, u8::MAX, u8::MIN),
            |a, b| (a.0 + b.0, a.1 + b.1, a.2.min(b.2), a.3.max(b.3)),
        );

    let mean_brightness = sum as f64 / count;
    let variance = (sum_sq as f64 / count - mean_brightness * mean_brightness).max(0.0);
    let brightness_stddev = variance.sqrt();
    let contrast_range = max.saturating_sub(min) as f64;
    let sharpness = laplacian_variance(image);

    let mut recommendations = Vec::new();
    if mean_brightness < thresholds.dark {
        recommendations.push(Advice::TooDark);
    } else if mean_brightness > thresholds.bright {
        recommendations.push(Advice::TooBright);
    }
    if brightness_stddev < thresholds.low_stddev {
        recommendations.push(Advice::LowContrast);
    }
    if sharpness < thresholds.blur {
        recommendations.push(Advice::Blurry);
    }
    if contrast_range < thresholds.flat_range {
        recommendations.push(Advice::FlatContrast);
    }

    QualityReport {
        mean_brightness,
        brightness_stddev,
        sharpness,
        contrast_range,
        recommendations,
    }
}

// Variance of the Laplacian response, the usual cheap focus measure: a
// sharp image has strong second derivatives at module edges, a defocused
// one does not.
fn laplacian_variance(image: &GrayImage) -> f64 {
    let response = laplacian_filter(image);
    let raw = response.as_raw();
    let count = raw.len().max(1) as f64;
    let (sum, sum_sq) = raw
        .par_iter()
        .fold(
            || (0f64, 0f64),
            |(sum, sum_sq), &value| {
                let value = value as f64;
                (sum + value, sum_sq + value * value)
            },
        )
        .reduce(|| (0f64, 0f64), |a, b| (a.0 + b.0, a.1 + b.1));
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}
