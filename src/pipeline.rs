//! The detection orchestrator.
//!
//! One loop drives every scan: normalize the input, walk the attempt
//! plan in order, hand each rendered candidate to the decoder, and stop
//! at the first payload. Only when the whole plan comes back empty do the
//! secondary localization passes get a chance to at least point at a
//! barcode-shaped region. The loop itself never fails; I/O problems are
//! the only errors callers see.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};
use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::config::ScanOptions;
use crate::decoder::{Decode, RxingDecoder};
use crate::error::{Result, ScanError};
use crate::quality::{self, QualityReport};
use crate::region;
use crate::report::{AttemptOutcome, AttemptRecord, Detection};

const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// Multi-strategy barcode scanner.
///
/// A scanner owns its options and decoder and is cheap to share: scans
/// take `&self`, so one instance can serve many threads.
pub struct Scanner {
    options: ScanOptions,
    decoder: Box<dyn Decode>,
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner::new()
    }
}

impl Scanner {
    /// Scanner with default options and the rxing decoder.
    pub fn new() -> Self {
        Scanner::with_options(ScanOptions::default())
    }

    /// Scanner with the given options and the rxing decoder.
    pub fn with_options(options: ScanOptions) -> Self {
        Scanner {
            options,
            decoder: Box::new(RxingDecoder::new()),
        }
    }

    /// Replace the decoder backend.
    pub fn with_decoder(mut self, decoder: Box<dyn Decode>) -> Self {
        self.decoder = decoder;
        self
    }

    /// The options this scanner runs with.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan an image file.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Load`] when the file cannot be opened or
    /// decoded. A readable image that contains no barcode is not an
    /// error; it yields a detection with no finding.
    pub fn scan_path<P: AsRef<Path>>(&self, path: P) -> Result<Detection> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| ScanError::load(path, source))?;
        debug!("scanning {}", path.display());
        let (color, gray) = self.normalize(&image, self.options.camera_nudge);
        Ok(self.run(&color, &gray))
    }

    /// Scan an encoded image held in memory, e.g. an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidImageData`] when the bytes are not a
    /// decodable image.
    pub fn scan_bytes(&self, bytes: &[u8]) -> Result<Detection> {
        let image = image::load_from_memory(bytes)?;
        let (color, gray) = self.normalize(&image, self.options.camera_nudge);
        Ok(self.run(&color, &gray))
    }

    /// Scan an already-decoded image.
    ///
    /// The camera nudge is not applied here; images arriving through this
    /// entry point are assumed to be prepared by the caller.
    pub fn scan_image(&self, image: &DynamicImage) -> Detection {
        let (color, gray) = self.normalize(image, false);
        self.run(&color, &gray)
    }

    /// Scan every image file directly inside a directory, in parallel.
    ///
    /// Files are selected by extension, scanned with [`Self::scan_path`]
    /// and returned in path order, each with its own result so one
    /// unreadable file does not sink the batch.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Dir`] when the directory itself cannot be
    /// read.
    pub fn scan_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<(PathBuf, Result<Detection>)>> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|source| ScanError::dir(dir, source))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_image_path(path))
            .collect();
        paths.sort();
        debug!("scanning {} image(s) in {}", paths.len(), dir.display());
        Ok(paths
            .into_par_iter()
            .map(|path| {
                let result = self.scan_path(&path);
                (path, result)
            })
            .collect())
    }

    /// Measure capture quality on the image as supplied.
    ///
    /// The resize cap and camera nudge are not applied here; the metrics
    /// reflect the capture at its native resolution.
    pub fn assess_quality(&self, image: &DynamicImage) -> QualityReport {
        let gray = imageops::grayscale(&image.to_rgb8());
        quality::assess_with(&gray, &self.options.quality)
    }

    // Bring the input into the shape every attempt starts from: RGB,
    // longest side capped, plus one shared grayscale conversion.
    fn normalize(&self, image: &DynamicImage, nudge: bool) -> (RgbImage, GrayImage) {
        let mut color = image.to_rgb8();
        let (width, height) = color.dimensions();
        let longest = width.max(height);
        if self.options.max_dimension > 0 && longest > self.options.max_dimension {
            let factor = self.options.max_dimension as f32 / longest as f32;
            let new_width = ((width as f32 * factor).round() as u32).max(1);
            let new_height = ((height as f32 * factor).round() as u32).max(1);
            trace!(
                "downscaling {}x{} to {}x{}",
                width,
                height,
                new_width,
                new_height
            );
            color = imageops::resize(&color, new_width, new_height, FilterType::Lanczos3);
        }
        if nudge {
            color = camera_nudge(&color);
        }
        let gray = imageops::grayscale(&color);
        (color, gray)
    }

    fn run(&self, color: &RgbImage, gray: &GrayImage) -> Detection {
        let started = Instant::now();
        let diagnostics = self.options.diagnostics;
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let (width, height) = gray.dimensions();

        for candidate in self.options.plan.iter() {
            if let Some(budget) = self.options.budget {
                if started.elapsed() >= budget {
                    warn!(
                        "time budget {:?} exhausted before attempt '{}'",
                        budget,
                        candidate.name()
                    );
                    if diagnostics {
                        attempts.push(AttemptRecord {
                            name: candidate.name().to_string(),
                            outcome: AttemptOutcome::Skipped {
                                reason: "time budget exhausted".to_string(),
                            },
                            elapsed: Duration::ZERO,
                        });
                    }
                    return Detection::none(attempts);
                }
            }
            if !candidate.admissible(width, height, self.options.dim_window) {
                trace!(
                    "attempt '{}' skipped for {}x{}",
                    candidate.name(),
                    width,
                    height
                );
                if diagnostics {
                    attempts.push(AttemptRecord {
                        name: candidate.name().to_string(),
                        outcome: AttemptOutcome::Skipped {
                            reason: "dimensions outside window".to_string(),
                        },
                        elapsed: Duration::ZERO,
                    });
                }
                continue;
            }

            let attempt_started = Instant::now();
            let rendered = candidate.render(color, gray);
            match self.decoder.decode(rendered) {
                Ok(codes) if !codes.is_empty() => {
                    let elapsed = attempt_started.elapsed();
                    debug!(
                        "decoded {} code(s) via '{}' in {:?}",
                        codes.len(),
                        candidate.name(),
                        elapsed
                    );
                    let first = codes[0].clone();
                    if diagnostics {
                        attempts.push(AttemptRecord {
                            name: candidate.name().to_string(),
                            outcome: AttemptOutcome::Decoded { codes },
                            elapsed,
                        });
                    }
                    return Detection::decoded(candidate.name(), first, attempts);
                }
                Ok(_) => {
                    trace!("attempt '{}' found nothing", candidate.name());
                    if diagnostics {
                        attempts.push(AttemptRecord {
                            name: candidate.name().to_string(),
                            outcome: AttemptOutcome::Empty,
                            elapsed: attempt_started.elapsed(),
                        });
                    }
                }
                Err(failure) => {
                    warn!("attempt '{}' failed: {}", candidate.name(), failure);
                    if diagnostics {
                        attempts.push(AttemptRecord {
                            name: candidate.name().to_string(),
                            outcome: AttemptOutcome::Failed {
                                reason: failure.to_string(),
                            },
                            elapsed: attempt_started.elapsed(),
                        });
                    }
                }
            }
        }

        if self.options.region_hints && self.budget_left(started) {
            self.localize(gray, started, attempts)
        } else {
            Detection::none(attempts)
        }
    }

    fn budget_left(&self, started: Instant) -> bool {
        self.options
            .budget
            .map_or(true, |budget| started.elapsed() < budget)
    }

    // Secondary passes: stripe template match first, contour sweep after,
    // with the budget re-checked in between. Takes over the attempt trace
    // and always produces a detection.
    fn localize(
        &self,
        gray: &GrayImage,
        started: Instant,
        mut attempts: Vec<AttemptRecord>,
    ) -> Detection {
        let diagnostics = self.options.diagnostics;

        let pass_started = Instant::now();
        let stripes = region::stripe_hints(gray);
        if diagnostics {
            attempts.push(AttemptRecord {
                name: region::STRIPE_TEMPLATE.to_string(),
                outcome: if stripes.is_empty() {
                    AttemptOutcome::Empty
                } else {
                    AttemptOutcome::Hinted {
                        hints: stripes.clone(),
                    }
                },
                elapsed: pass_started.elapsed(),
            });
        }
        if let Some(best) = stripes.into_iter().next() {
            debug!("stripe template matched at {:?}", best.region);
            return Detection::hinted(region::STRIPE_TEMPLATE, best, attempts);
        }

        if !self.budget_left(started) {
            warn!("time budget exhausted before the contour pass");
            if diagnostics {
                attempts.push(AttemptRecord {
                    name: region::CONTOUR_REGIONS.to_string(),
                    outcome: AttemptOutcome::Skipped {
                        reason: "time budget exhausted".to_string(),
                    },
                    elapsed: Duration::ZERO,
                });
            }
            return Detection::none(attempts);
        }

        let pass_started = Instant::now();
        let contours = region::contour_hints(gray);
        if diagnostics {
            attempts.push(AttemptRecord {
                name: region::CONTOUR_REGIONS.to_string(),
                outcome: if contours.is_empty() {
                    AttemptOutcome::Empty
                } else {
                    AttemptOutcome::Hinted {
                        hints: contours.clone(),
                    }
                },
                elapsed: pass_started.elapsed(),
            });
        }
        if let Some(best) = contours.into_iter().next() {
            debug!("contour pass found {:?}", best.region);
            return Detection::hinted(region::CONTOUR_REGIONS, best, attempts);
        }

        Detection::none(attempts)
    }
}

// Mild sharpen and contrast lift for photos straight off a phone camera.
// Sharpening blends away from a smoothed copy; the contrast step expands
// values around the global luminance mean by 10%.
fn camera_nudge(color: &RgbImage) -> RgbImage {
    let smooth = imageops::blur(color, 1.0);
    let mut out = color.clone();
    for (pixel, soft) in out.pixels_mut().zip(smooth.pixels()) {
        for channel in 0..3 {
            let sharpened = 1.2 * pixel[channel] as f32 - 0.2 * soft[channel] as f32;
            pixel[channel] = sharpened.round().clamp(0.0, 255.0) as u8;
        }
    }

    let pixel_count = (out.width() as u64 * out.height() as u64).max(1);
    let mut luma_sum = 0f64;
    for pixel in out.pixels() {
        luma_sum += luminance(pixel);
    }
    let mean = luma_sum / pixel_count as f64;
    for pixel in out.pixels_mut() {
        for channel in 0..3 {
            let lifted = mean + 1.1 * (pixel[channel] as f64 - mean);
            pixel[channel] = lifted.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn luminance(pixel: &image::Rgb<u8>) -> f64 {
    0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_path_matches_extensions() {
        assert!(is_image_path(Path::new("photo.jpg")));
        assert!(is_image_path(Path::new("photo.JPEG")));
        assert!(is_image_path(Path::new("scan.png")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("no_extension")));
    }

    #[test]
    fn test_normalize_caps_longest_side() {
        let scanner = Scanner::with_options(
            ScanOptions::default()
                .with_max_dimension(100)
                .with_camera_nudge(false),
        );
        let image = DynamicImage::ImageRgb8(RgbImage::new(400, 200));
        let (color, gray) = scanner.normalize(&image, false);
        assert_eq!(color.dimensions(), (100, 50));
        assert_eq!(gray.dimensions(), (100, 50));
    }

    #[test]
    fn test_normalize_leaves_small_images_alone() {
        let scanner = Scanner::with_options(ScanOptions::default().with_max_dimension(2000));
        let image = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let (color, _) = scanner.normalize(&image, false);
        assert_eq!(color.dimensions(), (640, 480));
    }

    #[test]
    fn test_camera_nudge_expands_contrast() {
        let image = RgbImage::from_fn(40, 40, |x, _| {
            if x < 20 {
                image::Rgb([100, 100, 100])
            } else {
                image::Rgb([160, 160, 160])
            }
        });
        let nudged = camera_nudge(&image);
        assert_eq!(nudged.dimensions(), (40, 40));
        // Values move away from the mean on both sides.
        assert!(nudged.get_pixel(2, 20)[0] < 100);
        assert!(nudged.get_pixel(38, 20)[0] > 160);
    }

    /// The contour sweep honors the budget even when the stripe pass is
    /// what spent it.
    #[test]
    fn test_localize_skips_contour_pass_once_budget_is_spent() {
        let scanner = Scanner::with_options(
            ScanOptions::default()
                .with_diagnostics(true)
                .with_budget(Some(Duration::from_millis(10))),
        );
        // A barcode-shaped block the contour pass would otherwise report.
        let mut gray = GrayImage::from_pixel(120, 120, image::Luma([255]));
        for y in 56..72 {
            for x in 20..100 {
                gray.put_pixel(x, y, image::Luma([0]));
            }
        }

        let started = Instant::now() - Duration::from_millis(50);
        let detection = scanner.localize(&gray, started, Vec::new());

        assert!(detection.region_hint().is_none());
        let record = detection
            .attempts
            .iter()
            .find(|record| record.name == region::CONTOUR_REGIONS)
            .expect("contour pass should appear in the trace");
        assert!(matches!(record.outcome, AttemptOutcome::Skipped { .. }));
    }

    /// With time to spare the same frame still yields a contour hint.
    #[test]
    fn test_localize_runs_both_passes_within_budget() {
        let scanner = Scanner::with_options(
            ScanOptions::default()
                .with_diagnostics(true)
                .with_budget(Some(Duration::from_secs(60))),
        );
        let mut gray = GrayImage::from_pixel(120, 120, image::Luma([255]));
        for y in 56..72 {
            for x in 20..100 {
                gray.put_pixel(x, y, image::Luma([0]));
            }
        }

        let detection = scanner.localize(&gray, Instant::now(), Vec::new());

        assert_eq!(detection.method, region::CONTOUR_REGIONS);
        assert!(detection.region_hint().is_some());
    }
}
