//! Binarization: luminance sources to black/white bits
//!
//! A [`Binarizer`] is bound to one luminance source. Transforming the source
//! (crop, rotate, invert) means building a new binarizer through
//! [`Binarizer::create_binarizer`]; caches are never carried across sources.

use std::cell::OnceCell;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::luminance::LuminanceSource;
use crate::models::{BitArray, BitMatrix};

/// Histogram threshold picked from the whole frame
pub mod global_histogram;
/// Block-adaptive local thresholds
pub mod hybrid;

pub use global_histogram::GlobalHistogramBinarizer;
pub use hybrid::HybridBinarizer;

/// Converts a luminance source into bits (true = black)
pub trait Binarizer: Send {
    /// Source this binarizer reads
    fn luminance_source(&self) -> &Arc<dyn LuminanceSource>;

    /// Binarize row `y`, reusing `row` as storage when it is large enough
    ///
    /// Returns `None` when the row lacks contrast.
    fn black_row(&self, y: usize, row: BitArray) -> Option<BitArray>;

    /// Binarize the whole frame, `None` when there is not enough contrast
    fn black_matrix(&self) -> Option<BitMatrix>;

    /// Fresh binarizer of the same kind over another source
    fn create_binarizer(&self, source: Arc<dyn LuminanceSource>) -> Box<dyn Binarizer>;

    /// Width of the source
    fn width(&self) -> usize {
        self.luminance_source().width()
    }

    /// Height of the source
    fn height(&self) -> usize {
        self.luminance_source().height()
    }
}

/// Builds the binarizer for each new luminance source
pub type BinarizerFactory = dyn Fn(Arc<dyn LuminanceSource>) -> Box<dyn Binarizer> + Send;

/// Reset `row` to `width` cleared bits, reallocating only when too small
pub(crate) fn prepare_row(mut row: BitArray, width: usize) -> BitArray {
    if row.size() < width {
        BitArray::new(width)
    } else {
        row.clear();
        row
    }
}

/// Image handed to symbol decoders: a binarizer plus a cached full-frame matrix
pub struct BinaryBitmap {
    binarizer: Option<Box<dyn Binarizer>>,
    matrix: OnceCell<Option<BitMatrix>>,
}

impl BinaryBitmap {
    /// Wrap a binarizer; the matrix is computed on first use
    pub fn new(binarizer: Box<dyn Binarizer>) -> Self {
        Self {
            binarizer: Some(binarizer),
            matrix: OnceCell::new(),
        }
    }

    /// Bitmap over an already binarized matrix
    ///
    /// Crop and rotation are unsupported since there is no source to transform.
    pub fn from_matrix(matrix: BitMatrix) -> Self {
        Self {
            binarizer: None,
            matrix: OnceCell::from(Some(matrix)),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        match &self.binarizer {
            Some(binarizer) => binarizer.width(),
            None => self.matrix.get().and_then(Option::as_ref).map_or(0, BitMatrix::width),
        }
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        match &self.binarizer {
            Some(binarizer) => binarizer.height(),
            None => self.matrix.get().and_then(Option::as_ref).map_or(0, BitMatrix::height),
        }
    }

    /// Underlying luminance source, if the bitmap has one
    pub fn luminance_source(&self) -> Option<&Arc<dyn LuminanceSource>> {
        self.binarizer.as_ref().map(|b| b.luminance_source())
    }

    /// One binarized row; see [`Binarizer::black_row`]
    pub fn black_row(&self, y: usize, row: BitArray) -> Option<BitArray> {
        match &self.binarizer {
            Some(binarizer) => binarizer.black_row(y, row),
            None => {
                let matrix = self.black_matrix()?;
                Some(matrix.row(y, row))
            }
        }
    }

    /// Full binarized frame, computed once and cached
    pub fn black_matrix(&self) -> Option<&BitMatrix> {
        self.matrix
            .get_or_init(|| self.binarizer.as_ref().and_then(|b| b.black_matrix()))
            .as_ref()
    }

    /// Whether [`BinaryBitmap::crop`] can succeed
    pub fn is_crop_supported(&self) -> bool {
        self.luminance_source().is_some_and(|s| s.is_crop_supported())
    }

    /// New bitmap over a sub-rectangle, with a fresh binarizer
    pub fn crop(&self, left: usize, top: usize, width: usize, height: usize) -> Result<Self> {
        let binarizer = self.require_binarizer("crop")?;
        let source = binarizer.luminance_source().crop(left, top, width, height)?;
        Ok(Self::new(binarizer.create_binarizer(source)))
    }

    /// Whether the rotations can succeed
    pub fn is_rotate_supported(&self) -> bool {
        self.luminance_source().is_some_and(|s| s.is_rotate_supported())
    }

    /// New bitmap rotated 90 degrees counter-clockwise
    pub fn rotate_counter_clockwise(&self) -> Result<Self> {
        let binarizer = self.require_binarizer("rotate_counter_clockwise")?;
        let source = binarizer.luminance_source().rotate_counter_clockwise()?;
        Ok(Self::new(binarizer.create_binarizer(source)))
    }

    /// New bitmap rotated 45 degrees counter-clockwise
    pub fn rotate_counter_clockwise_45(&self) -> Result<Self> {
        let binarizer = self.require_binarizer("rotate_counter_clockwise_45")?;
        let source = binarizer.luminance_source().rotate_counter_clockwise_45()?;
        Ok(Self::new(binarizer.create_binarizer(source)))
    }

    fn require_binarizer(&self, operation: &'static str) -> Result<&dyn Binarizer> {
        self.binarizer
            .as_deref()
            .ok_or(Error::Unsupported { operation })
    }
}

impl std::fmt::Debug for BinaryBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryBitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("has_source", &self.binarizer.is_some())
            .finish()
    }
}
