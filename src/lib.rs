//! snapcode - Multi-strategy barcode and QR detection for low-quality photos
//!
//! Phone photos of barcode labels are rarely clean: glare, blur, skew and
//! bad lighting defeat a single decode pass more often than not. This crate
//! wraps a multi-format decoder in an ordered plan of preprocessing
//! attempts, stops at the first payload, and falls back to locating
//! barcode-shaped regions plus concrete capture advice when nothing decodes.
//!
//! ```no_run
//! use snapcode::Scanner;
//!
//! let scanner = Scanner::new();
//! let detection = scanner.scan_path("shelf_photo.jpg")?;
//! match detection.payload() {
//!     Some(payload) => println!("decoded via {}: {}", detection.method, payload),
//!     None => println!("nothing found after {} attempts", detection.attempts.len()),
//! }
//! # Ok::<(), snapcode::ScanError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Scan options and environment overrides.
pub mod config;
/// Decoder trait and the rxing-backed implementation.
pub mod decoder;
/// Error types.
pub mod error;
/// The scanner and its attempt loop.
pub mod pipeline;
/// Attempt plans (ordered candidate lists).
pub mod plan;
/// Capture quality analysis.
pub mod quality;
/// Secondary localization passes (stripe template, contours).
pub mod region;
/// Detection results, attempt records and region hints.
pub mod report;
/// The preprocessing transform catalog.
pub mod transforms;

pub use config::{ScanOptions, DEFAULT_MAX_DIMENSION};
pub use decoder::{Decode, DecodeFailure, RxingDecoder};
pub use error::{Result, ScanError};
pub use pipeline::Scanner;
pub use plan::{AttemptPlan, Candidate, CandidateKind, DimWindow};
pub use quality::{Advice, QualityReport, QualityThresholds};
pub use report::{
    AttemptOutcome, AttemptRecord, DecodedCode, Detection, Finding, Region, RegionHint,
    RegionKind, Symbology, NO_DETECTION,
};
pub use transforms::Transform;

use image::DynamicImage;

/// Scan an image file with default options.
///
/// # Arguments
/// * `path` - Path to an image file in any format the `image` crate reads
///
/// # Returns
/// The detection, or an error if the file cannot be loaded
///
/// # Errors
/// Returns [`ScanError::Load`] when the file cannot be opened or decoded.
pub fn scan_path<P: AsRef<std::path::Path>>(path: P) -> Result<Detection> {
    Scanner::new().scan_path(path)
}

/// Scan an encoded image held in memory with default options.
///
/// # Arguments
/// * `bytes` - Encoded image bytes, e.g. the body of an upload
///
/// # Returns
/// The detection, or an error if the bytes are not a decodable image
///
/// # Errors
/// Returns [`ScanError::InvalidImageData`] when decoding fails.
pub fn scan_bytes(bytes: &[u8]) -> Result<Detection> {
    Scanner::new().scan_bytes(bytes)
}

/// Scan an already-decoded image with default options.
pub fn scan_image(image: &DynamicImage) -> Detection {
    Scanner::new().scan_image(image)
}

/// Assess capture quality with default options and thresholds.
pub fn assess_quality(image: &DynamicImage) -> QualityReport {
    Scanner::new().assess_quality(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_bytes_rejects_garbage() {
        let result = scan_bytes(b"definitely not an image");
        assert!(matches!(result, Err(ScanError::InvalidImageData(_))));
    }

    #[test]
    fn test_scan_path_rejects_missing_file() {
        let result = scan_path("/nonexistent/path/image.jpg");
        assert!(matches!(result, Err(ScanError::Load { .. })));
    }

    #[test]
    fn test_assess_quality_of_dark_frame() {
        let image = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            64,
            64,
            image::Luma([5]),
        ));
        let report = assess_quality(&image);
        assert!(report.recommendations.contains(&Advice::TooDark));
    }
}
