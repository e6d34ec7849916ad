//! Ordered attempt plans for the detection orchestrator.
//!
//! A plan is plain data: an ordered list of named candidates, each one
//! describing how to derive a decode attempt from the normalized input.
//! The orchestrator walks the list in order and stops at the first
//! decode, so candidates are sorted cheapest and most likely first, with
//! expensive recovery attempts at the tail.

use image::{DynamicImage, GrayImage, RgbImage};

use crate::transforms::{self, AdaptiveWeighting, ColorChannel, ThresholdMode, Transform};

/// Open dimension interval; both dimensions must fall strictly inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimWindow {
    /// Exclusive lower bound in pixels.
    pub min: u32,
    /// Exclusive upper bound in pixels.
    pub max: u32,
}

impl DimWindow {
    /// Create a window with exclusive bounds.
    pub fn new(min: u32, max: u32) -> Self {
        DimWindow { min, max }
    }

    /// Whether both dimensions lie strictly inside the window.
    pub fn contains(&self, width: u32, height: u32) -> bool {
        width > self.min && width < self.max && height > self.min && height < self.max
    }
}

/// How a candidate derives its attempt image.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateKind {
    /// The normalized color image, untouched.
    Original,
    /// The grayscale conversion.
    Grayscale,
    /// A single color channel.
    Channel(ColorChannel),
    /// A transform chain applied to the grayscale image in order.
    Chain(Vec<Transform>),
}

/// One named entry in an attempt plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    name: String,
    kind: CandidateKind,
    window: Option<DimWindow>,
}

impl Candidate {
    /// The untouched color image.
    pub fn original() -> Self {
        Candidate {
            name: "original".to_string(),
            kind: CandidateKind::Original,
            window: None,
        }
    }

    /// The grayscale conversion.
    pub fn grayscale() -> Self {
        Candidate {
            name: "grayscale".to_string(),
            kind: CandidateKind::Grayscale,
            window: None,
        }
    }

    /// A single color channel.
    pub fn channel(channel: ColorChannel) -> Self {
        Candidate {
            name: format!("channel_{}", channel.label()),
            kind: CandidateKind::Channel(channel),
            window: None,
        }
    }

    /// A single transform, named after it.
    pub fn single(transform: Transform) -> Self {
        Candidate {
            name: transform.name(),
            kind: CandidateKind::Chain(vec![transform]),
            window: None,
        }
    }

    /// A transform chain under an explicit name.
    pub fn chain(name: impl Into<String>, steps: Vec<Transform>) -> Self {
        Candidate {
            name: name.into(),
            kind: CandidateKind::Chain(steps),
            window: None,
        }
    }

    /// Restrict the candidate to inputs whose projected dimensions fall
    /// inside the window.
    pub fn with_window(mut self, min: u32, max: u32) -> Self {
        self.window = Some(DimWindow::new(min, max));
        self
    }

    /// Attempt name used in records and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the attempt image is derived.
    pub fn kind(&self) -> &CandidateKind {
        &self.kind
    }

    /// Dimensions after applying any resize steps in the chain.
    pub fn projected_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let mut factor = 1.0f32;
        if let CandidateKind::Chain(steps) = &self.kind {
            for step in steps {
                if let Some(f) = step.scale_factor() {
                    factor *= f;
                }
            }
        }
        let project = |dim: u32| ((dim as f32 * factor).round() as u32).max(1);
        (project(width), project(height))
    }

    /// Whether this candidate should run for an input of the given size.
    ///
    /// The projected dimensions must fall inside both the global window
    /// and the candidate's own window when it has one.
    pub fn admissible(&self, width: u32, height: u32, global: DimWindow) -> bool {
        let (pw, ph) = self.projected_dimensions(width, height);
        if !global.contains(pw, ph) {
            return false;
        }
        match self.window {
            Some(window) => window.contains(pw, ph),
            None => true,
        }
    }

    /// Produce the attempt image from the normalized inputs.
    pub fn render(&self, color: &RgbImage, gray: &GrayImage) -> DynamicImage {
        match &self.kind {
            CandidateKind::Original => DynamicImage::ImageRgb8(color.clone()),
            CandidateKind::Grayscale => DynamicImage::ImageLuma8(gray.clone()),
            CandidateKind::Channel(channel) => {
                DynamicImage::ImageLuma8(transforms::geometric::extract_channel(color, *channel))
            }
            CandidateKind::Chain(steps) => {
                let mut current = gray.clone();
                for step in steps {
                    current = step.apply(&current);
                }
                DynamicImage::ImageLuma8(current)
            }
        }
    }
}

/// An ordered list of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptPlan {
    candidates: Vec<Candidate>,
}

impl AttemptPlan {
    /// The default plan: cheap global attempts first, then blur and noise
    /// recovery, binarizations, rescales, small rotations, and finally the
    /// expensive long shots.
    pub fn standard() -> Self {
        let mut candidates = vec![
            Candidate::original(),
            Candidate::grayscale(),
            Candidate::single(Transform::Equalize),
            Candidate::single(Transform::Clahe {
                clip_limit: 2.0,
                grid: 8,
            }),
        ];
        for (alpha, beta) in CONTRAST_PAIRS {
            candidates.push(Candidate::single(Transform::Contrast { alpha, beta }));
        }
        candidates.push(Candidate::single(Transform::GaussianBlur { sigma: 0.8 }));
        candidates.push(Candidate::single(Transform::MedianBlur { radius: 1 }));
        candidates.push(Candidate::single(Transform::MorphClose { radius: 1 }));
        for mode in [
            ThresholdMode::Binary,
            ThresholdMode::BinaryInv,
            ThresholdMode::ToZero,
            ThresholdMode::ToZeroInv,
        ] {
            candidates.push(Candidate::single(Transform::Threshold { value: 127, mode }));
        }
        for (weighting, block, c) in ADAPTIVE_PARAMS {
            candidates.push(Candidate::single(Transform::AdaptiveThreshold {
                weighting,
                block,
                c,
            }));
        }
        for factor in SCALE_FACTORS {
            candidates.push(
                Candidate::single(Transform::Scale { factor }).with_window(30, 3000),
            );
        }
        for degrees in ROTATION_DEGREES {
            candidates.push(Candidate::single(Transform::Rotate { degrees }));
        }
        candidates.push(Candidate::single(Transform::Edges {
            low: 50.0,
            high: 150.0,
        }));
        for factor in COMBO_SCALE_FACTORS {
            candidates.push(
                Candidate::chain(
                    format!("combo_contrast_scale_{:.1}", factor),
                    vec![
                        Transform::Contrast {
                            alpha: 2.0,
                            beta: 30.0,
                        },
                        Transform::Scale { factor },
                    ],
                )
                .with_window(50, 2000),
            );
        }
        candidates.push(Candidate::single(Transform::Bilateral {
            window: 9,
            sigma_color: 75.0,
            sigma_spatial: 75.0,
        }));
        candidates.push(Candidate::single(Transform::Unsharp {
            sigma: 10.0,
            amount: 0.5,
        }));
        AttemptPlan { candidates }
    }

    /// A much longer plan for offline or last-resort scanning: adds
    /// channel extraction, gamma and stretch variants, extra morphology,
    /// a threshold sweep, wider rescales and a dense rotation sweep.
    pub fn exhaustive() -> Self {
        let mut candidates = vec![
            Candidate::original(),
            Candidate::grayscale(),
            Candidate::channel(ColorChannel::Red),
            Candidate::channel(ColorChannel::Green),
            Candidate::channel(ColorChannel::Blue),
            Candidate::single(Transform::Equalize),
            Candidate::single(Transform::Clahe {
                clip_limit: 2.0,
                grid: 8,
            }),
        ];
        for (alpha, beta) in CONTRAST_PAIRS {
            candidates.push(Candidate::single(Transform::Contrast { alpha, beta }));
        }
        candidates.push(Candidate::single(Transform::AutoContrast));
        candidates.push(Candidate::single(Transform::Invert));
        for gamma in [0.7, 1.5] {
            candidates.push(Candidate::single(Transform::Gamma { gamma }));
        }
        candidates.push(Candidate::single(Transform::GaussianBlur { sigma: 0.8 }));
        candidates.push(Candidate::single(Transform::MedianBlur { radius: 1 }));
        candidates.push(Candidate::single(Transform::Bilateral {
            window: 9,
            sigma_color: 75.0,
            sigma_spatial: 75.0,
        }));
        candidates.push(Candidate::single(Transform::Sharpen));
        for radius in [1u8] {
            candidates.push(Candidate::single(Transform::MorphClose { radius }));
            candidates.push(Candidate::single(Transform::MorphOpen { radius }));
            candidates.push(Candidate::single(Transform::MorphOpenClose { radius }));
        }
        for value in [63, 95, 127, 159, 191] {
            for mode in [ThresholdMode::Binary, ThresholdMode::BinaryInv] {
                candidates.push(Candidate::single(Transform::Threshold { value, mode }));
            }
        }
        for mode in [
            ThresholdMode::Truncate,
            ThresholdMode::ToZero,
            ThresholdMode::ToZeroInv,
        ] {
            candidates.push(Candidate::single(Transform::Threshold { value: 127, mode }));
        }
        for (weighting, block, c) in ADAPTIVE_PARAMS {
            candidates.push(Candidate::single(Transform::AdaptiveThreshold {
                weighting,
                block,
                c,
            }));
        }
        for factor in [
            0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 1.2, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0,
        ] {
            candidates.push(
                Candidate::single(Transform::Scale { factor }).with_window(30, 3000),
            );
        }
        for degrees in dense_rotations() {
            candidates.push(Candidate::single(Transform::Rotate { degrees }));
        }
        candidates.push(Candidate::single(Transform::Edges {
            low: 50.0,
            high: 150.0,
        }));
        for factor in COMBO_SCALE_FACTORS {
            candidates.push(
                Candidate::chain(
                    format!("combo_contrast_scale_{:.1}", factor),
                    vec![
                        Transform::Contrast {
                            alpha: 2.0,
                            beta: 30.0,
                        },
                        Transform::Scale { factor },
                    ],
                )
                .with_window(50, 2000),
            );
        }
        candidates.push(Candidate::single(Transform::Unsharp {
            sigma: 10.0,
            amount: 0.5,
        }));
        AttemptPlan { candidates }
    }

    /// A plan from an explicit candidate list, run in the given order.
    pub fn custom(candidates: Vec<Candidate>) -> Self {
        AttemptPlan { candidates }
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the plan has no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Iterate candidates in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }
}

impl Default for AttemptPlan {
    fn default() -> Self {
        AttemptPlan::standard()
    }
}

const CONTRAST_PAIRS: [(f32, f32); 4] = [(1.5, 20.0), (2.0, 30.0), (2.5, 40.0), (1.2, 10.0)];

const ADAPTIVE_PARAMS: [(AdaptiveWeighting, u32, i16); 5] = [
    (AdaptiveWeighting::Mean, 11, 2),
    (AdaptiveWeighting::Gaussian, 11, 2),
    (AdaptiveWeighting::Mean, 15, 5),
    (AdaptiveWeighting::Gaussian, 15, 5),
    (AdaptiveWeighting::Mean, 21, 10),
];

const SCALE_FACTORS: [f32; 8] = [0.3, 0.5, 0.7, 1.5, 2.0, 2.5, 3.0, 4.0];

const COMBO_SCALE_FACTORS: [f32; 3] = [0.5, 1.5, 2.0];

// Smallest magnitude first, negative before positive, so near-upright
// photos are corrected with the least work.
const ROTATION_DEGREES: [f32; 12] = [
    -2.0, 2.0, -5.0, 5.0, -10.0, 10.0, -15.0, 15.0, -20.0, 20.0, -30.0, 30.0,
];

fn dense_rotations() -> Vec<f32> {
    let mut degrees = vec![-2.0, 2.0];
    for magnitude in (5..=175).step_by(5) {
        degrees.push(-(magnitude as f32));
        degrees.push(magnitude as f32);
    }
    degrees.push(180.0);
    degrees
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_plan_order() {
        let plan = AttemptPlan::standard();
        let names: Vec<&str> = plan.iter().map(|c| c.name()).collect();
        assert_eq!(names[0], "original");
        assert_eq!(names[1], "grayscale");
        assert_eq!(names[names.len() - 1], "unsharp");
        assert!(names.contains(&"contrast_a2.0_b30"));
        assert!(names.contains(&"adaptive_mean_b21_c10"));
        assert!(names.contains(&"rotate_-2"));
        assert!(names.contains(&"combo_contrast_scale_2.0"));
        // Rotations come sorted by magnitude, negative first.
        let r2 = names.iter().position(|n| *n == "rotate_-2").unwrap();
        let r30 = names.iter().position(|n| *n == "rotate_30").unwrap();
        assert!(r2 < r30);
    }

    #[test]
    fn test_standard_plan_names_are_unique() {
        let plan = AttemptPlan::standard();
        let names: HashSet<&str> = plan.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), plan.len());
    }

    #[test]
    fn test_exhaustive_extends_standard_coverage() {
        let exhaustive = AttemptPlan::exhaustive();
        assert!(exhaustive.len() > AttemptPlan::standard().len());
        let names: HashSet<&str> = exhaustive.iter().map(|c| c.name()).collect();
        for expected in [
            "channel_red",
            "channel_blue",
            "gamma_0.7",
            "invert",
            "autocontrast",
            "thresh_binary_63",
            "rotate_180",
            "scale_5.0",
        ] {
            assert!(names.contains(expected), "missing {}", expected);
        }
        assert_eq!(names.len(), exhaustive.len());
    }

    #[test]
    fn test_scale_window_gates_admissibility() {
        let global = DimWindow::new(20, 8000);
        let upscale = Candidate::single(Transform::Scale { factor: 4.0 }).with_window(30, 3000);
        assert!(upscale.admissible(500, 500, global));
        assert!(!upscale.admissible(1000, 1000, global), "4000 exceeds the window");
        let downscale = Candidate::single(Transform::Scale { factor: 0.3 }).with_window(30, 3000);
        assert!(!downscale.admissible(100, 100, global), "30 is not strictly inside");
        assert!(downscale.admissible(200, 200, global));
    }

    #[test]
    fn test_global_window_gates_tiny_images() {
        let global = DimWindow::new(20, 8000);
        assert!(!Candidate::original().admissible(15, 15, global));
        assert!(Candidate::original().admissible(21, 21, global));
    }

    #[test]
    fn test_projected_dimensions_multiply_chain_factors() {
        let combo = Candidate::chain(
            "combo",
            vec![
                Transform::Contrast {
                    alpha: 2.0,
                    beta: 30.0,
                },
                Transform::Scale { factor: 0.5 },
            ],
        );
        assert_eq!(combo.projected_dimensions(200, 100), (100, 50));
        assert_eq!(Candidate::grayscale().projected_dimensions(200, 100), (200, 100));
    }

    #[test]
    fn test_render_shapes() {
        let color = RgbImage::from_pixel(40, 30, image::Rgb([200, 100, 50]));
        let gray = GrayImage::from_pixel(40, 30, image::Luma([128]));

        let original = Candidate::original().render(&color, &gray);
        assert!(matches!(original, DynamicImage::ImageRgb8(_)));

        let red = Candidate::channel(ColorChannel::Red).render(&color, &gray);
        assert_eq!(red.to_luma8().get_pixel(0, 0)[0], 200);

        let scaled = Candidate::single(Transform::Scale { factor: 2.0 }).render(&color, &gray);
        assert_eq!(scaled.to_luma8().dimensions(), (80, 60));
    }
}
