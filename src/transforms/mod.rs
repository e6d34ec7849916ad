//! Catalog of image preprocessing transforms.
//!
//! Every transform is a pure function: it takes a grayscale image and
//! returns a new one, never mutating its input. The same input and
//! parameters always produce the same output, which is what lets the
//! orchestrator treat attempts as independent and replayable.
//!
//! Families:
//! - Photometric: contrast rescale, equalization, CLAHE, gamma, stretch, invert
//! - Denoising/sharpening: Gaussian, median, bilateral, unsharp mask, 3x3 sharpen
//! - Morphological: open/close with small square elements
//! - Binarization: fixed and adaptive thresholds
//! - Geometric: resize, rotation, channel extraction
//! - Edge-based: Canny followed by dilation

/// Edge detection.
pub mod edges;
/// Smoothing and sharpening filters.
pub mod filters;
/// Resize, rotation and channel extraction.
pub mod geometric;
/// Grayscale morphology.
pub mod morphology;
/// Intensity remapping.
pub mod photometric;
/// Fixed and adaptive binarization.
pub mod threshold;

pub use geometric::ColorChannel;
pub use threshold::{AdaptiveWeighting, ThresholdMode};

use image::GrayImage;

/// A named, parameterized image transform.
///
/// Variants carry their full parameter set so a plan is nothing more than
/// data, and [`Transform::name`] embeds the parameters so attempt names
/// stay unambiguous in logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Linear rescale `out = alpha * in + beta`, saturating.
    Contrast {
        /// Gain applied to each pixel.
        alpha: f32,
        /// Offset added after the gain.
        beta: f32,
    },
    /// Global histogram equalization.
    Equalize,
    /// Contrast-limited adaptive histogram equalization over a tile grid.
    Clahe {
        /// Histogram clip limit relative to a uniform distribution.
        clip_limit: f32,
        /// Number of tiles along each axis.
        grid: u32,
    },
    /// Gamma correction via lookup table.
    Gamma {
        /// Gamma value; below 1.0 darkens, above 1.0 brightens.
        gamma: f32,
    },
    /// Stretch the observed intensity range to full scale.
    AutoContrast,
    /// Invert intensities.
    Invert,
    /// Gaussian blur.
    GaussianBlur {
        /// Standard deviation of the kernel.
        sigma: f32,
    },
    /// Median filter over a square window.
    MedianBlur {
        /// Window radius; the window side is `2 * radius + 1`.
        radius: u32,
    },
    /// Edge-preserving bilateral filter.
    Bilateral {
        /// Window size in pixels.
        window: u32,
        /// Intensity-distance falloff.
        sigma_color: f32,
        /// Spatial-distance falloff.
        sigma_spatial: f32,
    },
    /// Unsharp mask: original plus weighted difference from a blurred copy.
    Unsharp {
        /// Blur standard deviation.
        sigma: f32,
        /// Weight of the high-frequency residue added back.
        amount: f32,
    },
    /// Fixed 3x3 sharpening kernel.
    Sharpen,
    /// Morphological closing.
    MorphClose {
        /// Structuring element radius.
        radius: u8,
    },
    /// Morphological opening.
    MorphOpen {
        /// Structuring element radius.
        radius: u8,
    },
    /// Opening followed by closing.
    MorphOpenClose {
        /// Structuring element radius.
        radius: u8,
    },
    /// Fixed-value threshold.
    Threshold {
        /// Cut value.
        value: u8,
        /// Which thresholding rule to apply.
        mode: ThresholdMode,
    },
    /// Local threshold against a neighborhood mean.
    AdaptiveThreshold {
        /// Mean- or Gaussian-weighted neighborhood.
        weighting: AdaptiveWeighting,
        /// Neighborhood side length; forced odd, minimum 3.
        block: u32,
        /// Constant subtracted from the local mean.
        c: i16,
    },
    /// Uniform resize by a factor.
    Scale {
        /// Multiplier applied to both dimensions.
        factor: f32,
    },
    /// Rotation about the image center, white-filled.
    Rotate {
        /// Angle in degrees; positive rotates counter-clockwise.
        degrees: f32,
    },
    /// Canny edge map followed by one dilation pass.
    Edges {
        /// Low hysteresis threshold.
        low: f32,
        /// High hysteresis threshold.
        high: f32,
    },
}

impl Transform {
    /// Stable attempt name with parameters embedded.
    pub fn name(&self) -> String {
        match self {
            Transform::Contrast { alpha, beta } => {
                format!("contrast_a{:.1}_b{}", alpha, *beta as i32)
            }
            Transform::Equalize => "equalize".to_string(),
            Transform::Clahe { .. } => "clahe".to_string(),
            Transform::Gamma { gamma } => format!("gamma_{:.1}", gamma),
            Transform::AutoContrast => "autocontrast".to_string(),
            Transform::Invert => "invert".to_string(),
            Transform::GaussianBlur { .. } => "gaussian_blur".to_string(),
            Transform::MedianBlur { radius } => format!("median_{}", 2 * radius + 1),
            Transform::Bilateral { .. } => "bilateral".to_string(),
            Transform::Unsharp { .. } => "unsharp".to_string(),
            Transform::Sharpen => "sharpen".to_string(),
            Transform::MorphClose { .. } => "morph_close".to_string(),
            Transform::MorphOpen { .. } => "morph_open".to_string(),
            Transform::MorphOpenClose { .. } => "morph_open_close".to_string(),
            Transform::Threshold { value, mode } => {
                format!("thresh_{}_{}", mode.label(), value)
            }
            Transform::AdaptiveThreshold {
                weighting,
                block,
                c,
            } => format!("adaptive_{}_b{}_c{}", weighting.label(), block, c),
            Transform::Scale { factor } => format!("scale_{:.1}", factor),
            Transform::Rotate { degrees } => format!("rotate_{}", *degrees as i32),
            Transform::Edges { .. } => "edges".to_string(),
        }
    }

    /// Apply the transform, producing a new image.
    pub fn apply(&self, image: &GrayImage) -> GrayImage {
        match *self {
            Transform::Contrast { alpha, beta } => photometric::rescale(image, alpha, beta),
            Transform::Equalize => photometric::equalize(image),
            Transform::Clahe { clip_limit, grid } => photometric::clahe(image, clip_limit, grid),
            Transform::Gamma { gamma } => photometric::gamma(image, gamma),
            Transform::AutoContrast => photometric::auto_contrast(image),
            Transform::Invert => photometric::invert(image),
            Transform::GaussianBlur { sigma } => filters::gaussian(image, sigma),
            Transform::MedianBlur { radius } => filters::median(image, radius),
            Transform::Bilateral {
                window,
                sigma_color,
                sigma_spatial,
            } => filters::bilateral(image, window, sigma_color, sigma_spatial),
            Transform::Unsharp { sigma, amount } => filters::unsharp(image, sigma, amount),
            Transform::Sharpen => filters::sharpen(image),
            Transform::MorphClose { radius } => morphology::close(image, radius),
            Transform::MorphOpen { radius } => morphology::open(image, radius),
            Transform::MorphOpenClose { radius } => morphology::open_close(image, radius),
            Transform::Threshold { value, mode } => threshold::fixed(image, value, mode),
            Transform::AdaptiveThreshold {
                weighting,
                block,
                c,
            } => threshold::adaptive(image, weighting, block, c),
            Transform::Scale { factor } => geometric::scale(image, factor),
            Transform::Rotate { degrees } => geometric::rotate(image, degrees),
            Transform::Edges { low, high } => edges::edge_map(image, low, high),
        }
    }

    /// The resize factor, for plan-level dimension checks.
    pub fn scale_factor(&self) -> Option<f32> {
        match self {
            Transform::Scale { factor } => Some(*factor),
            _ => None,
        }
    }
}
