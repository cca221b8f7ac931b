//! Luminance sources: immutable 8-bit grayscale views of a frame
//!
//! Every transform (crop, rotate, invert) returns a new source and leaves
//! the receiver untouched, so one frame can be fed through several
//! rotation/inversion attempts without the attempts interfering.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Single-frame camera source over a Y plane
pub mod planar_yuv;
/// Owned grayscale source with crop, rotation and inversion
pub mod gray;

pub use gray::GrayLuminanceSource;
pub use planar_yuv::PlanarYuvLuminanceSource;

/// Grayscale pixel access, 0 = black, 255 = white
pub trait LuminanceSource: Send + Sync {
    /// Width in pixels
    fn width(&self) -> usize;

    /// Height in pixels
    fn height(&self) -> usize;

    /// Luminance of row `y`, exactly `width()` bytes
    fn row(&self, y: usize) -> Cow<'_, [u8]>;

    /// Whole frame, row-major, `width() * height()` bytes
    fn matrix(&self) -> Cow<'_, [u8]>;

    /// Whether `crop` is implemented
    fn is_crop_supported(&self) -> bool {
        false
    }

    /// New source over a sub-rectangle
    fn crop(
        &self,
        _left: usize,
        _top: usize,
        _width: usize,
        _height: usize,
    ) -> Result<Arc<dyn LuminanceSource>> {
        Err(Error::Unsupported { operation: "crop" })
    }

    /// Whether the rotations are implemented
    fn is_rotate_supported(&self) -> bool {
        false
    }

    /// New source rotated 90 degrees counter-clockwise
    fn rotate_counter_clockwise(&self) -> Result<Arc<dyn LuminanceSource>> {
        Err(Error::Unsupported {
            operation: "rotate_counter_clockwise",
        })
    }

    /// New source rotated 45 degrees counter-clockwise
    fn rotate_counter_clockwise_45(&self) -> Result<Arc<dyn LuminanceSource>> {
        Err(Error::Unsupported {
            operation: "rotate_counter_clockwise_45",
        })
    }

    /// Whether `invert` is implemented
    fn is_inversion_supported(&self) -> bool {
        false
    }

    /// New source with every value replaced by `255 - value`
    fn invert(&self) -> Result<Arc<dyn LuminanceSource>> {
        Err(Error::Unsupported { operation: "invert" })
    }
}

/// Check a crop rectangle against source bounds
pub(crate) fn check_crop(
    source_width: usize,
    source_height: usize,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
) -> Result<()> {
    let overflows = |start: usize, len: usize, limit: usize| {
        start.checked_add(len).is_none_or(|end| end > limit)
    };
    if width == 0
        || height == 0
        || overflows(left, width, source_width)
        || overflows(top, height, source_height)
    {
        return Err(Error::CropOutOfBounds {
            left,
            top,
            width,
            height,
            source_width,
            source_height,
        });
    }
    Ok(())
}

/// Coarse text rendering of a source, one character per pixel
pub fn render_ascii(source: &dyn LuminanceSource) -> String {
    let mut out = String::with_capacity(source.height() * (source.width() + 1));
    for y in 0..source.height() {
        for &lum in source.row(y).iter() {
            out.push(match lum {
                0..=63 => '#',
                64..=127 => '+',
                128..=191 => '.',
                _ => ' ',
            });
        }
        out.push('\n');
    }
    out
}

/// Lazy `255 - value` view over another source
pub struct InvertedLuminanceSource {
    delegate: Arc<dyn LuminanceSource>,
}

impl InvertedLuminanceSource {
    /// Wrap `delegate`
    pub fn new(delegate: Arc<dyn LuminanceSource>) -> Self {
        Self { delegate }
    }

    fn wrap(source: Arc<dyn LuminanceSource>) -> Arc<dyn LuminanceSource> {
        Arc::new(Self::new(source))
    }
}

impl LuminanceSource for InvertedLuminanceSource {
    fn width(&self) -> usize {
        self.delegate.width()
    }

    fn height(&self) -> usize {
        self.delegate.height()
    }

    fn row(&self, y: usize) -> Cow<'_, [u8]> {
        Cow::Owned(self.delegate.row(y).iter().map(|&v| 255 - v).collect())
    }

    fn matrix(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.delegate.matrix().iter().map(|&v| 255 - v).collect())
    }

    fn is_crop_supported(&self) -> bool {
        self.delegate.is_crop_supported()
    }

    fn crop(
        &self,
        left: usize,
        top: usize,
        width: usize,
        height: usize,
    ) -> Result<Arc<dyn LuminanceSource>> {
        self.delegate
            .crop(left, top, width, height)
            .map(Self::wrap)
    }

    fn is_rotate_supported(&self) -> bool {
        self.delegate.is_rotate_supported()
    }

    fn rotate_counter_clockwise(&self) -> Result<Arc<dyn LuminanceSource>> {
        self.delegate.rotate_counter_clockwise().map(Self::wrap)
    }

    fn rotate_counter_clockwise_45(&self) -> Result<Arc<dyn LuminanceSource>> {
        self.delegate.rotate_counter_clockwise_45().map(Self::wrap)
    }

    fn is_inversion_supported(&self) -> bool {
        true
    }

    fn invert(&self) -> Result<Arc<dyn LuminanceSource>> {
        Ok(Arc::clone(&self.delegate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_source_values() {
        let gray = GrayLuminanceSource::new(vec![0, 100, 255, 30], 2, 2).unwrap();
        let inverted = gray.invert().unwrap();
        assert_eq!(&*inverted.row(0), &[255, 155]);
        assert_eq!(&*inverted.matrix(), &[255, 155, 0, 225]);
    }

    #[test]
    fn test_double_inversion_is_identity() {
        let gray = GrayLuminanceSource::new((0..=255).collect(), 16, 16).unwrap();
        let back = gray.invert().unwrap().invert().unwrap();
        assert_eq!(back.matrix(), gray.matrix());
    }

    #[test]
    fn test_inverted_crop_stays_inverted() {
        let gray = GrayLuminanceSource::new(vec![10, 20, 30, 40], 2, 2).unwrap();
        let cropped = gray.invert().unwrap().crop(1, 1, 1, 1).unwrap();
        assert_eq!(&*cropped.matrix(), &[215]);
    }

    #[test]
    fn test_crop_rejects_overflowing_rectangle() {
        assert!(matches!(
            check_crop(10, 10, usize::MAX, 0, 2, 1),
            Err(Error::CropOutOfBounds { .. })
        ));
        assert!(matches!(
            check_crop(10, 10, 0, 1, 1, usize::MAX),
            Err(Error::CropOutOfBounds { .. })
        ));
        let gray = GrayLuminanceSource::new(vec![0; 4], 2, 2).unwrap();
        assert!(gray.crop(usize::MAX, usize::MAX, 2, 2).is_err());
        assert!(check_crop(10, 10, 8, 8, 2, 2).is_ok());
    }

    #[test]
    fn test_render_ascii() {
        let gray = GrayLuminanceSource::new(vec![0, 100, 150, 255], 4, 1).unwrap();
        assert_eq!(render_ascii(&gray), "#+. \n");
    }
}
