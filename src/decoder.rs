//! Decoder abstraction and the rxing-backed implementation.
//!
//! The orchestrator only needs one operation: given an image, return the
//! codes found in it. Keeping that behind [`Decode`] lets tests drive the
//! attempt loop with scripted decoders and leaves room for alternative
//! backends without touching the pipeline.

use image::DynamicImage;
use rxing::multi::{GenericMultipleBarcodeReader, MultipleBarcodeReader};
use rxing::Reader;

use crate::report::{DecodedCode, Region, Symbology};

/// A decoder backend.
///
/// Implementations take ownership of the attempt image since backends
/// generally consume their input buffer. Returning an empty `Vec` means
/// the image was processed cleanly but contained no readable code, which
/// the orchestrator treats differently from an error.
pub trait Decode: Send + Sync {
    /// Decode every readable code in the image.
    fn decode(&self, image: DynamicImage) -> Result<Vec<DecodedCode>, DecodeFailure>;
}

/// A backend error that is not simply "nothing found".
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct DecodeFailure(pub String);

/// Multi-format decoder backed by rxing.
///
/// Reads QR, Data Matrix, Aztec, PDF417 and the common retail and
/// logistics 1D symbologies in a single pass.
#[derive(Debug, Clone)]
pub struct RxingDecoder {
    try_harder: bool,
    multi: bool,
}

impl Default for RxingDecoder {
    fn default() -> Self {
        RxingDecoder {
            try_harder: true,
            multi: true,
        }
    }
}

impl RxingDecoder {
    /// Decoder with try-harder and multi-code reading enabled.
    pub fn new() -> Self {
        RxingDecoder::default()
    }

    /// Enable or disable the slower, more thorough search.
    pub fn try_harder(mut self, enabled: bool) -> Self {
        self.try_harder = enabled;
        self
    }

    /// Enable or disable reading more than one code per image.
    pub fn multi(mut self, enabled: bool) -> Self {
        self.multi = enabled;
        self
    }

    fn hints(&self) -> rxing::DecodingHintDictionary {
        let mut hints = rxing::DecodingHintDictionary::new();
        if self.try_harder {
            hints.insert(
                rxing::DecodeHintType::TRY_HARDER,
                rxing::DecodeHintValue::TryHarder(true),
            );
        }
        hints
    }
}

impl Decode for RxingDecoder {
    fn decode(&self, image: DynamicImage) -> Result<Vec<DecodedCode>, DecodeFailure> {
        let source = rxing::BufferedImageLuminanceSource::new(image);
        let binarizer = rxing::common::GlobalHistogramBinarizer::new(source);
        let mut bitmap = rxing::BinaryBitmap::new(binarizer);
        let hints = self.hints();

        if self.multi {
            let mut reader =
                GenericMultipleBarcodeReader::new(rxing::MultiUseMultiFormatReader::default());
            let codes: Vec<DecodedCode> =
                match reader.decode_multiple_with_hints(&mut bitmap, &hints) {
                    Ok(results) => results.iter().map(convert_result).collect(),
                    Err(err) => classify_error(err)?,
                };
            if !codes.is_empty() {
                return Ok(codes);
            }
            // The multi sweep can lose a lone code the plain reader finds.
        }

        let mut reader = rxing::MultiUseMultiFormatReader::default();
        match reader.decode_with_hints(&mut bitmap, &hints) {
            Ok(result) => Ok(vec![convert_result(&result)]),
            Err(err) => classify_error(err),
        }
    }
}

// "Not found" is the normal outcome for a failed attempt, not an error.
fn classify_error(err: rxing::Exceptions) -> Result<Vec<DecodedCode>, DecodeFailure> {
    match err {
        rxing::Exceptions::NotFoundException(_) => Ok(Vec::new()),
        other => Err(DecodeFailure(other.to_string())),
    }
}

fn convert_result(result: &rxing::RXingResult) -> DecodedCode {
    let mut code = DecodedCode::new(result.getText(), map_format(result.getBarcodeFormat()));
    if let Some(region) = bounding_region(result.getRXingResultPoints()) {
        code = code.with_region(region);
    }
    code
}

fn map_format(format: &rxing::BarcodeFormat) -> Symbology {
    use rxing::BarcodeFormat;
    match format {
        BarcodeFormat::QR_CODE => Symbology::QrCode,
        BarcodeFormat::DATA_MATRIX => Symbology::DataMatrix,
        BarcodeFormat::AZTEC => Symbology::Aztec,
        BarcodeFormat::PDF_417 => Symbology::Pdf417,
        BarcodeFormat::EAN_13 => Symbology::Ean13,
        BarcodeFormat::EAN_8 => Symbology::Ean8,
        BarcodeFormat::UPC_A => Symbology::UpcA,
        BarcodeFormat::UPC_E => Symbology::UpcE,
        BarcodeFormat::CODE_128 => Symbology::Code128,
        BarcodeFormat::CODE_39 => Symbology::Code39,
        BarcodeFormat::CODE_93 => Symbology::Code93,
        BarcodeFormat::CODABAR => Symbology::Codabar,
        BarcodeFormat::ITF => Symbology::Itf,
        other => Symbology::Other(format!("{:?}", other)),
    }
}

// Axis-aligned bounding box of the finder/locator points, in the
// coordinate space of the image handed to the decoder.
fn bounding_region(points: &[rxing::Point]) -> Option<Region> {
    if points.len() < 2 {
        return None;
    }
    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    Some(Region::new(
        min_x.max(0.0).floor() as u32,
        min_y.max(0.0).floor() as u32,
        ((max_x - min_x).ceil() as u32).max(1),
        ((max_y - min_y).ceil() as u32).max(1),
    ))
}
