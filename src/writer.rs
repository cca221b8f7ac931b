//! Encoding side: route payloads to external symbol encoders
//!
//! Encoders return a [`BitMatrix`] with true = dark module. The matrix can be
//! turned back into a luminance source with [`render_bit_matrix`], which lets
//! an encoded symbol go straight through [`crate::BarcodeReader`].

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::luminance::GrayLuminanceSource;
use crate::models::{BarcodeFormat, BitMatrix, EncodeHints};

/// A format-specific symbol encoder
pub trait Encoder: Send + Sync {
    /// Encode `contents` into a matrix of roughly `width x height` pixels
    fn encode(
        &self,
        contents: &str,
        format: BarcodeFormat,
        width: usize,
        height: usize,
        hints: &EncodeHints,
    ) -> Result<BitMatrix>;
}

/// Dispatches encode requests by format
#[derive(Default)]
pub struct MultiFormatWriter {
    encoders: HashMap<BarcodeFormat, Box<dyn Encoder>>,
}

impl MultiFormatWriter {
    /// Writer with no encoders
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `format` to `encoder`, replacing any previous one
    pub fn register(&mut self, format: BarcodeFormat, encoder: Box<dyn Encoder>) -> &mut Self {
        self.encoders.insert(format, encoder);
        self
    }

    /// True if an encoder handles `format`
    pub fn supports(&self, format: BarcodeFormat) -> bool {
        self.encoders.contains_key(&format)
    }

    /// Encode with the encoder registered for `format`
    pub fn encode(
        &self,
        contents: &str,
        format: BarcodeFormat,
        width: usize,
        height: usize,
        hints: &EncodeHints,
    ) -> Result<BitMatrix> {
        let encoder = self
            .encoders
            .get(&format)
            .ok_or(Error::UnsupportedFormat(format))?;
        debug!(?format, width, height, "encoding");
        encoder.encode(contents, format, width, height, hints)
    }
}

impl fmt::Debug for MultiFormatWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.encoders.keys().collect();
        formats.sort();
        f.debug_struct("MultiFormatWriter")
            .field("formats", &formats)
            .finish()
    }
}

/// Render a matrix as 8-bit luminance, dark modules 0 and light 255
pub fn render_bit_matrix(matrix: &BitMatrix) -> GrayLuminanceSource {
    let width = matrix.width();
    let height = matrix.height();
    let mut pixels = vec![255u8; width * height];
    for (y, row) in pixels.chunks_exact_mut(width).enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            if matrix.get(x, y) {
                *pixel = 0;
            }
        }
    }
    GrayLuminanceSource::from_exact(pixels, width, height)
}
