use std::borrow::Cow;
use std::f32::consts::FRAC_1_SQRT_2;
use std::sync::Arc;

use super::{InvertedLuminanceSource, LuminanceSource, check_crop};
use crate::error::{Error, Result};
use crate::utils::grayscale::{BitmapFormat, to_luminance};

/// Grayscale frame held in memory, optionally viewed through a crop window
///
/// Cropping shares the pixel buffer; rotation materializes a new one.
#[derive(Debug, Clone)]
pub struct GrayLuminanceSource {
    data: Arc<[u8]>,
    data_width: usize,
    data_height: usize,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl GrayLuminanceSource {
    /// Wrap `width * height` luminance bytes
    pub fn new(luminances: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        let expected = width * height;
        if luminances.len() < expected {
            return Err(Error::BufferTooSmall {
                expected,
                actual: luminances.len(),
            });
        }
        let mut luminances = luminances;
        luminances.truncate(expected);
        Ok(Self::from_exact(luminances, width, height))
    }

    /// Wrap a buffer already known to hold exactly `width * height` bytes
    pub(crate) fn from_exact(luminances: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(luminances.len(), width * height);
        Self {
            data: luminances.into(),
            data_width: width,
            data_height: height,
            left: 0,
            top: 0,
            width,
            height,
        }
    }

    /// Convert a packed pixel buffer in any supported layout
    pub fn from_pixels(
        pixels: &[u8],
        width: usize,
        height: usize,
        format: BitmapFormat,
    ) -> Result<Self> {
        let luminances = to_luminance(pixels, width, height, format)?;
        Self::new(luminances, width, height)
    }

    fn is_full_frame(&self) -> bool {
        self.left == 0
            && self.top == 0
            && self.width == self.data_width
            && self.height == self.data_height
    }
}

impl LuminanceSource for GrayLuminanceSource {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn row(&self, y: usize) -> Cow<'_, [u8]> {
        let offset = (y + self.top) * self.data_width + self.left;
        Cow::Borrowed(&self.data[offset..offset + self.width])
    }

    fn matrix(&self) -> Cow<'_, [u8]> {
        if self.is_full_frame() {
            return Cow::Borrowed(&self.data);
        }
        if self.width == self.data_width {
            let start = self.top * self.data_width;
            return Cow::Borrowed(&self.data[start..start + self.width * self.height]);
        }
        let mut matrix = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            matrix.extend_from_slice(&self.row(y));
        }
        Cow::Owned(matrix)
    }

    fn is_crop_supported(&self) -> bool {
        true
    }

    fn crop(
        &self,
        left: usize,
        top: usize,
        width: usize,
        height: usize,
    ) -> Result<Arc<dyn LuminanceSource>> {
        check_crop(self.width, self.height, left, top, width, height)?;
        Ok(Arc::new(Self {
            data: Arc::clone(&self.data),
            data_width: self.data_width,
            data_height: self.data_height,
            left: self.left + left,
            top: self.top + top,
            width,
            height,
        }))
    }

    fn is_rotate_supported(&self) -> bool {
        true
    }

    fn rotate_counter_clockwise(&self) -> Result<Arc<dyn LuminanceSource>> {
        let old = self.matrix();
        let new_width = self.height;
        let new_height = self.width;
        let mut rotated = vec![0u8; self.width * self.height];
        for y_old in 0..self.height {
            for x_old in 0..self.width {
                let y_new = new_height - 1 - x_old;
                let x_new = y_old;
                rotated[y_new * new_width + x_new] = old[y_old * self.width + x_old];
            }
        }
        Ok(Arc::new(Self::from_exact(rotated, new_width, new_height)))
    }

    fn rotate_counter_clockwise_45(&self) -> Result<Arc<dyn LuminanceSource>> {
        let old = self.matrix();
        let side = ((self.width + self.height) as f32 * FRAC_1_SQRT_2).ceil() as usize;
        let old_cx = self.width as f32 / 2.0;
        let old_cy = self.height as f32 / 2.0;
        let new_c = side as f32 / 2.0;

        // Uncovered corners of the canvas read as white background
        let mut rotated = vec![255u8; side * side];
        for y_new in 0..side {
            let ry = y_new as f32 + 0.5 - new_c;
            for x_new in 0..side {
                let rx = x_new as f32 + 0.5 - new_c;
                let x_old = (rx - ry) * FRAC_1_SQRT_2 + old_cx;
                let y_old = (rx + ry) * FRAC_1_SQRT_2 + old_cy;
                if x_old < 0.0 || y_old < 0.0 {
                    continue;
                }
                let (xi, yi) = (x_old as usize, y_old as usize);
                if xi < self.width && yi < self.height {
                    rotated[y_new * side + x_new] = old[yi * self.width + xi];
                }
            }
        }
        Ok(Arc::new(Self::from_exact(rotated, side, side)))
    }

    fn is_inversion_supported(&self) -> bool {
        true
    }

    fn invert(&self) -> Result<Arc<dyn LuminanceSource>> {
        Ok(Arc::new(InvertedLuminanceSource::new(Arc::new(self.clone()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> GrayLuminanceSource {
        let data = (0..width * height).map(|i| (i * 7 % 256) as u8).collect();
        GrayLuminanceSource::new(data, width, height).unwrap()
    }

    #[test]
    fn test_rejects_short_buffer() {
        assert!(GrayLuminanceSource::new(vec![0; 5], 3, 2).is_err());
    }

    #[test]
    fn test_crop_shares_pixels() {
        let source = gradient(10, 8);
        let cropped = source.crop(2, 3, 4, 2).unwrap();
        assert_eq!(cropped.width(), 4);
        assert_eq!(cropped.height(), 2);
        assert_eq!(&*cropped.row(0), &source.row(3)[2..6]);
        assert_eq!(cropped.matrix().len(), 8);

        let nested = cropped.crop(1, 1, 2, 1).unwrap();
        assert_eq!(&*nested.row(0), &source.row(4)[3..5]);
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let source = gradient(10, 8);
        assert!(matches!(
            source.crop(8, 0, 3, 1),
            Err(Error::CropOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_rotate_counter_clockwise_moves_top_right_to_top_left() {
        let source = GrayLuminanceSource::new(vec![1, 2, 3, 4, 5, 6], 3, 2).unwrap();
        let rotated = source.rotate_counter_clockwise().unwrap();
        assert_eq!(rotated.width(), 2);
        assert_eq!(rotated.height(), 3);
        assert_eq!(&*rotated.matrix(), &[3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn test_four_rotations_are_identity() {
        let source = gradient(13, 7);
        let mut current: Arc<dyn LuminanceSource> = Arc::new(source.clone());
        for _ in 0..4 {
            current = current.rotate_counter_clockwise().unwrap();
        }
        assert_eq!(current.width(), 13);
        assert_eq!(current.matrix(), source.matrix());
    }

    #[test]
    fn test_rotate_cropped_view() {
        let source = gradient(10, 10);
        let cropped = source.crop(1, 1, 3, 2).unwrap();
        let rotated = cropped.rotate_counter_clockwise().unwrap();
        assert_eq!(rotated.row(0)[0], cropped.row(0)[2]);
    }

    #[test]
    fn test_rotate_45_keeps_centre_and_whitens_corners() {
        let source = GrayLuminanceSource::new(vec![0; 20 * 20], 20, 20).unwrap();
        let rotated = source.rotate_counter_clockwise_45().unwrap();
        assert_eq!(rotated.width(), 29);
        assert_eq!(rotated.height(), 29);
        assert_eq!(rotated.row(14)[14], 0);
        assert_eq!(rotated.row(0)[0], 255);
    }
}
