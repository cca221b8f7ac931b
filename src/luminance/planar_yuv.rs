use std::borrow::Cow;
use std::sync::Arc;

use super::{InvertedLuminanceSource, LuminanceSource, check_crop};
use crate::error::{Error, Result};

const THUMBNAIL_SCALE_FACTOR: usize = 2;

/// Luminance view over the Y plane of a planar YUV camera frame
///
/// Only the first `data_width * data_height` bytes (the Y plane) are read;
/// chroma planes that follow are ignored.
#[derive(Debug, Clone)]
pub struct PlanarYuvLuminanceSource {
    yuv: Arc<[u8]>,
    data_width: usize,
    data_height: usize,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl PlanarYuvLuminanceSource {
    /// Window `width x height` at (`left`, `top`) of a `data_width x data_height` frame
    ///
    /// With `reverse_horizontal` the window is mirrored left to right once,
    /// up front, for front-facing cameras.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        yuv: Vec<u8>,
        data_width: usize,
        data_height: usize,
        left: usize,
        top: usize,
        width: usize,
        height: usize,
        reverse_horizontal: bool,
    ) -> Result<Self> {
        check_crop(data_width, data_height, left, top, width, height)?;
        let plane = data_width * data_height;
        if yuv.len() < plane {
            return Err(Error::BufferTooSmall {
                expected: plane,
                actual: yuv.len(),
            });
        }

        let mut yuv = yuv;
        if reverse_horizontal {
            for y in 0..height {
                let start = (y + top) * data_width + left;
                yuv[start..start + width].reverse();
            }
        }

        Ok(Self {
            yuv: yuv.into(),
            data_width,
            data_height,
            left,
            top,
            width,
            height,
        })
    }

    /// Half-resolution ARGB preview of the window, opaque gray pixels
    pub fn render_thumbnail(&self) -> Vec<u32> {
        let width = self.thumbnail_width();
        let height = self.thumbnail_height();
        let mut pixels = Vec::with_capacity(width * height);
        let mut input_offset = self.top * self.data_width + self.left;
        for _ in 0..height {
            for x in 0..width {
                let grey = self.yuv[input_offset + x * THUMBNAIL_SCALE_FACTOR] as u32;
                pixels.push(0xFF00_0000 | (grey * 0x0001_0101));
            }
            input_offset += self.data_width * THUMBNAIL_SCALE_FACTOR;
        }
        pixels
    }

    /// Width of `render_thumbnail` output
    pub fn thumbnail_width(&self) -> usize {
        self.width / THUMBNAIL_SCALE_FACTOR
    }

    /// Height of `render_thumbnail` output
    pub fn thumbnail_height(&self) -> usize {
        self.height / THUMBNAIL_SCALE_FACTOR
    }
}

impl LuminanceSource for PlanarYuvLuminanceSource {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn row(&self, y: usize) -> Cow<'_, [u8]> {
        let offset = (y + self.top) * self.data_width + self.left;
        Cow::Borrowed(&self.yuv[offset..offset + self.width])
    }

    fn matrix(&self) -> Cow<'_, [u8]> {
        if self.width == self.data_width {
            let start = self.top * self.data_width;
            return Cow::Borrowed(&self.yuv[start..start + self.width * self.height]);
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
            yuv: Arc::clone(&self.yuv),
            data_width: self.data_width,
            data_height: self.data_height,
            left: self.left + left,
            top: self.top + top,
            width,
            height,
        }))
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

    fn frame(width: usize, height: usize) -> Vec<u8> {
        // Y plane followed by a quarter-size chroma plane
        let mut data: Vec<u8> = (0..width * height).map(|i| i as u8).collect();
        data.extend(std::iter::repeat_n(128, width * height / 2));
        data
    }

    #[test]
    fn test_window_rows() {
        let source = PlanarYuvLuminanceSource::new(frame(8, 6), 8, 6, 2, 1, 4, 3, false).unwrap();
        assert_eq!(&*source.row(0), &[10, 11, 12, 13]);
        assert_eq!(source.matrix().len(), 12);
        assert_eq!(source.matrix()[4], 18);
    }

    #[test]
    fn test_reverse_horizontal() {
        let source = PlanarYuvLuminanceSource::new(frame(4, 2), 4, 2, 0, 0, 4, 2, true).unwrap();
        assert_eq!(&*source.row(0), &[3, 2, 1, 0]);
        assert_eq!(&*source.row(1), &[7, 6, 5, 4]);
    }

    #[test]
    fn test_window_outside_frame() {
        let result = PlanarYuvLuminanceSource::new(frame(4, 4), 4, 4, 2, 0, 4, 4, false);
        assert!(matches!(result, Err(Error::CropOutOfBounds { .. })));
    }

    #[test]
    fn test_crop_and_rotate_unsupported() {
        let source = PlanarYuvLuminanceSource::new(frame(8, 8), 8, 8, 0, 0, 8, 8, false).unwrap();
        let cropped = source.crop(4, 4, 2, 2).unwrap();
        assert_eq!(&*cropped.row(1), &[44, 45]);
        assert!(!source.is_rotate_supported());
        assert!(source.rotate_counter_clockwise().is_err());
    }

    #[test]
    fn test_thumbnail() {
        let source = PlanarYuvLuminanceSource::new(frame(4, 4), 4, 4, 0, 0, 4, 4, false).unwrap();
        assert_eq!(source.thumbnail_width(), 2);
        assert_eq!(source.thumbnail_height(), 2);
        let thumb = source.render_thumbnail();
        assert_eq!(thumb, vec![0xFF00_0000, 0xFF02_0202, 0xFF08_0808, 0xFF0A_0A0A]);
    }
}
