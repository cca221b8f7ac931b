//! Contract violations raised by the acquisition pipeline.
//!
//! "Nothing found" is never an error here: every decode layer reports a miss
//! as `None` (or an empty `Vec`). The variants below are caller bugs such as
//! asking a source for an operation it cannot perform.

use thiserror::Error;

use crate::models::BarcodeFormat;

/// Errors returned for invalid arguments or unsupported operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The luminance source or bitmap does not implement the operation
    #[error("operation not supported by this source: {operation}")]
    Unsupported {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// Two matrices or arrays that must agree in size do not
    #[error("dimension mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        /// Width of the receiver
        expected_width: usize,
        /// Height of the receiver
        expected_height: usize,
        /// Width of the argument
        width: usize,
        /// Height of the argument
        height: usize,
    },

    /// A square matrix was required
    #[error("matrix is not square: {width}x{height}")]
    NotSquare {
        /// Matrix width
        width: usize,
        /// Matrix height
        height: usize,
    },

    /// A pixel buffer is smaller than its declared dimensions require
    #[error("pixel buffer too small: need {expected} bytes, got {actual}")]
    BufferTooSmall {
        /// Bytes required by width, height and pixel format
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// A crop rectangle leaves the source
    #[error("crop rectangle {left},{top} {width}x{height} exceeds source {source_width}x{source_height}")]
    CropOutOfBounds {
        /// Left edge of the requested rectangle
        left: usize,
        /// Top edge of the requested rectangle
        top: usize,
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Width of the source being cropped
        source_width: usize,
        /// Height of the source being cropped
        source_height: usize,
    },

    /// No encoder is registered for the format
    #[error("no encoder registered for {0:?}")]
    UnsupportedFormat(BarcodeFormat),

    /// An external encoder rejected its input
    #[error("encoding failed: {0}")]
    Encode(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
