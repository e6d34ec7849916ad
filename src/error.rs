//! Error types for the scanning pipeline.
//!
//! Only input-loading problems surface as errors. Everything that happens
//! after an image is in memory resolves to a [`Detection`](crate::Detection)
//! value, so a single bad transform or decoder hiccup can never abort a scan.

use std::path::Path;
use thiserror::Error;

/// Errors that can cross the crate boundary.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The input file could not be opened or decoded as an image.
    #[error("failed to load image from '{path}': {source}")]
    Load {
        /// Path of the file that failed to load.
        path: String,
        /// Underlying image decode error.
        #[source]
        source: image::ImageError,
    },

    /// A raw byte buffer could not be decoded as an image.
    #[error("failed to decode image bytes: {0}")]
    InvalidImageData(#[from] image::ImageError),

    /// A directory passed to the batch helper could not be read.
    #[error("failed to read directory '{path}': {source}")]
    Dir {
        /// Path of the directory that failed to read.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Build a load error for the given path.
    pub fn load<P: AsRef<Path>>(path: P, source: image::ImageError) -> Self {
        ScanError::Load {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Build a directory error for the given path.
    pub fn dir<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        ScanError::Dir {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_names_path() {
        let source = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = ScanError::load("/tmp/nope.jpg", source);
        let msg = err.to_string();
        assert!(msg.contains("/tmp/nope.jpg"), "message was: {}", msg);
    }
}
