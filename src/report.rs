//! Result types returned by the detection pipeline.
//!
//! A [`Detection`] is produced once per scan and is immutable afterwards.
//! Real decoder output and geometric guesses are kept apart by the
//! [`Finding`] tag so callers can never mistake a region hint for decoded
//! barcode text.

use serde::Serialize;
use std::time::Duration;

/// Barcode/QR encoding standard of a detected code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Symbology {
    /// QR code (model 2 or micro).
    QrCode,
    /// Data Matrix.
    DataMatrix,
    /// Aztec code.
    Aztec,
    /// PDF417 stacked linear code.
    Pdf417,
    /// EAN-13 retail code.
    Ean13,
    /// EAN-8 retail code.
    Ean8,
    /// UPC-A retail code.
    UpcA,
    /// UPC-E retail code.
    UpcE,
    /// Code 128 linear code.
    Code128,
    /// Code 39 linear code.
    Code39,
    /// Code 93 linear code.
    Code93,
    /// Codabar linear code.
    Codabar,
    /// Interleaved 2 of 5 linear code.
    Itf,
    /// A format reported by the decoder that has no dedicated variant.
    Other(String),
    /// The decoder did not report a format.
    Unknown,
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbology::QrCode => write!(f, "qr_code"),
            Symbology::DataMatrix => write!(f, "data_matrix"),
            Symbology::Aztec => write!(f, "aztec"),
            Symbology::Pdf417 => write!(f, "pdf417"),
            Symbology::Ean13 => write!(f, "ean13"),
            Symbology::Ean8 => write!(f, "ean8"),
            Symbology::UpcA => write!(f, "upc_a"),
            Symbology::UpcE => write!(f, "upc_e"),
            Symbology::Code128 => write!(f, "code128"),
            Symbology::Code39 => write!(f, "code39"),
            Symbology::Code93 => write!(f, "code93"),
            Symbology::Codabar => write!(f, "codabar"),
            Symbology::Itf => write!(f, "itf"),
            Symbology::Other(name) => write!(f, "{}", name),
            Symbology::Unknown => write!(f, "unknown"),
        }
    }
}

/// Axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// Create a region from its top-left corner and size.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// A successfully decoded code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCode {
    /// Raw payload bytes.
    pub data: Vec<u8>,
    /// Payload as UTF-8 text.
    pub content: String,
    /// Encoding standard reported by the decoder.
    pub symbology: Symbology,
    /// Bounding region in the candidate image, when the decoder reports one.
    pub region: Option<Region>,
}

impl DecodedCode {
    /// Create a decoded code from its text payload.
    pub fn new(content: impl Into<String>, symbology: Symbology) -> Self {
        let content = content.into();
        Self {
            data: content.as_bytes().to_vec(),
            content,
            symbology,
            region: None,
        }
    }

    /// Attach the bounding region reported by the decoder.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }
}

/// Shape class of a region hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegionKind {
    /// Wide and short, like a 1-D barcode (aspect ratio above 2).
    Linear,
    /// Near-square, like a QR or Data Matrix (aspect ratio 0.5 to 2).
    Square,
}

/// A low-confidence geometric guess about where a code might be.
///
/// Carries a synthetic label describing location and size, never decoded
/// barcode content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionHint {
    /// Where the candidate shape was found.
    pub region: Region,
    /// Shape class the aspect ratio fell into.
    pub kind: RegionKind,
    /// Heuristic score: contour area or template correlation.
    pub score: f32,
    /// Synthetic placeholder payload, e.g. `region_120_80_200x60`.
    pub label: String,
}

impl RegionHint {
    /// Build a hint for a contour-derived region.
    pub fn from_region(region: Region, kind: RegionKind, score: f32) -> Self {
        let label = format!(
            "region_{}_{}_{}x{}",
            region.x, region.y, region.width, region.height
        );
        Self {
            region,
            kind,
            score,
            label,
        }
    }
}

/// What a scan produced: real decoder output or a geometric guess.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Finding {
    /// The decode primitive read an actual payload.
    Decoded(DecodedCode),
    /// Only a barcode-shaped region was found; no payload was read.
    RegionHint(RegionHint),
}

/// Outcome of a single attempt in the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttemptOutcome {
    /// The decoder returned at least one code. All codes from the winning
    /// attempt are kept here even though the detection reports the first.
    Decoded {
        /// Every code the decoder returned for this candidate.
        codes: Vec<DecodedCode>,
    },
    /// The decoder ran and found nothing.
    Empty,
    /// The transform or the decoder errored on this candidate.
    Failed {
        /// Human-readable reason, also emitted to the log.
        reason: String,
    },
    /// The candidate was not attempted.
    Skipped {
        /// Why the candidate was passed over.
        reason: String,
    },
    /// A secondary heuristic produced region hints.
    Hinted {
        /// Every hint the pass produced, best first.
        hints: Vec<RegionHint>,
    },
}

/// One entry of the diagnostic attempt trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    /// Attempt name from the plan, e.g. `adaptive_mean_b15_c5`.
    pub name: String,
    /// What happened.
    pub outcome: AttemptOutcome,
    /// Wall-clock time spent on this attempt.
    pub elapsed: Duration,
}

/// Terminal method name reported when every attempt was exhausted.
pub const NO_DETECTION: &str = "no_detection";

/// Result of one detection call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Decoded payload or region hint; `None` when nothing was found.
    pub finding: Option<Finding>,
    /// Name of the attempt that succeeded, or [`NO_DETECTION`].
    pub method: String,
    /// Ordered per-attempt trace. Populated only when the caller asked for
    /// diagnostics; empty otherwise to keep the success path allocation-free.
    pub attempts: Vec<AttemptRecord>,
}

impl Detection {
    /// Successful detection via the decode primitive.
    pub(crate) fn decoded(
        method: impl Into<String>,
        code: DecodedCode,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        Self {
            finding: Some(Finding::Decoded(code)),
            method: method.into(),
            attempts,
        }
    }

    /// Fallback detection that only produced a geometric guess.
    pub(crate) fn hinted(
        method: impl Into<String>,
        hint: RegionHint,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        Self {
            finding: Some(Finding::RegionHint(hint)),
            method: method.into(),
            attempts,
        }
    }

    /// Exhausted every attempt without success.
    pub(crate) fn none(attempts: Vec<AttemptRecord>) -> Self {
        Self {
            finding: None,
            method: NO_DETECTION.to_string(),
            attempts,
        }
    }

    /// Whether anything (decoded code or region hint) was found.
    pub fn found(&self) -> bool {
        self.finding.is_some()
    }

    /// The decoded code, if the finding is a real decode.
    pub fn decoded_code(&self) -> Option<&DecodedCode> {
        match &self.finding {
            Some(Finding::Decoded(code)) => Some(code),
            _ => None,
        }
    }

    /// The region hint, if the finding is only a geometric guess.
    pub fn region_hint(&self) -> Option<&RegionHint> {
        match &self.finding {
            Some(Finding::RegionHint(hint)) => Some(hint),
            _ => None,
        }
    }

    /// Decoded text payload, or `None` for hints and misses.
    pub fn payload(&self) -> Option<&str> {
        self.decoded_code().map(|code| code.content.as_str())
    }

    /// Names of all attempts that were tried, in plan order.
    pub fn attempts_tried(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .map(|record| record.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_detection_accessors() {
        let code = DecodedCode::new("ABC-123", Symbology::Code128);
        let detection = Detection::decoded("grayscale", code, Vec::new());
        assert!(detection.found());
        assert_eq!(detection.payload(), Some("ABC-123"));
        assert_eq!(detection.method, "grayscale");
        assert!(detection.region_hint().is_none());
    }

    #[test]
    fn test_hint_is_not_a_payload() {
        let hint = RegionHint::from_region(Region::new(10, 20, 80, 20), RegionKind::Linear, 1600.0);
        let detection = Detection::hinted("contour_regions", hint, Vec::new());
        assert!(detection.found());
        assert!(detection.payload().is_none());
        assert_eq!(detection.region_hint().map(|h| h.label.as_str()), Some("region_10_20_80x20"));
    }

    #[test]
    fn test_no_detection_method_name() {
        let detection = Detection::none(Vec::new());
        assert!(!detection.found());
        assert_eq!(detection.method, NO_DETECTION);
    }

    #[test]
    fn test_region_geometry() {
        let region = Region::new(0, 0, 100, 25);
        assert_eq!(region.area(), 2500);
        assert!((region.aspect_ratio() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_decoded_code_bytes_match_content() {
        let code = DecodedCode::new("hello", Symbology::QrCode);
        assert_eq!(code.data, b"hello");
    }
}
