//! Convert packed pixel buffers to 8-bit luminance
//! Y = (19562*R + 38550*G + 7424*B) >> 16
//!
//! Alpha-bearing layouts blend toward white by the inverse alpha, so a fully
//! transparent pixel reads as background. Large frames are converted row by
//! row in parallel with rayon.
use rayon::prelude::*;

use crate::error::{Error, Result};

const COEF_R: u32 = 19562;
const COEF_G: u32 = 38550;
const COEF_B: u32 = 7424;
const CHANNEL_SHIFT: u32 = 16;

/// Frames at least this large are converted in parallel
const PARALLEL_MIN_PIXELS: usize = 1 << 16;

/// Memory layout of a pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitmapFormat {
    /// One luminance byte per pixel
    Gray8,
    /// 16-bit little-endian luminance; the high byte is used
    Gray16,
    /// R, G, B
    Rgb24,
    /// B, G, R
    Bgr24,
    /// R, G, B, unused
    Rgb32,
    /// B, G, R, unused
    Bgr32,
    /// R, G, B, A
    Rgba32,
    /// B, G, R, A
    Bgra32,
    /// A, R, G, B
    Argb32,
    /// 16-bit little-endian 5-6-5 RGB
    Rgb565,
    /// Packed 4:2:2, U Y0 V Y1
    Uyvy,
    /// Packed 4:2:2, Y0 U Y1 V
    Yuyv,
}

impl BitmapFormat {
    /// Bytes occupied by one pixel (4:2:2 layouts average 2)
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            BitmapFormat::Gray8 => 1,
            BitmapFormat::Gray16 | BitmapFormat::Rgb565 | BitmapFormat::Uyvy | BitmapFormat::Yuyv => 2,
            BitmapFormat::Rgb24 | BitmapFormat::Bgr24 => 3,
            BitmapFormat::Rgb32
            | BitmapFormat::Bgr32
            | BitmapFormat::Rgba32
            | BitmapFormat::Bgra32
            | BitmapFormat::Argb32 => 4,
        }
    }
}

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> CHANNEL_SHIFT) as u8
}

#[inline]
fn blend_alpha(lum: u8, alpha: u8) -> u8 {
    let lum = lum as u32;
    let alpha = alpha as u32;
    (((lum * alpha) >> 8) + ((255 * (255 - alpha)) >> 8)) as u8
}

fn convert_row(src: &[u8], dst: &mut [u8], format: BitmapFormat) {
    match format {
        BitmapFormat::Gray8 => dst.copy_from_slice(&src[..dst.len()]),
        BitmapFormat::Gray16 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(2)) {
                *out = px[1];
            }
        }
        BitmapFormat::Rgb24 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(3)) {
                *out = luminance(px[0], px[1], px[2]);
            }
        }
        BitmapFormat::Bgr24 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(3)) {
                *out = luminance(px[2], px[1], px[0]);
            }
        }
        BitmapFormat::Rgb32 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *out = luminance(px[0], px[1], px[2]);
            }
        }
        BitmapFormat::Bgr32 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *out = luminance(px[2], px[1], px[0]);
            }
        }
        BitmapFormat::Rgba32 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *out = blend_alpha(luminance(px[0], px[1], px[2]), px[3]);
            }
        }
        BitmapFormat::Bgra32 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *out = blend_alpha(luminance(px[2], px[1], px[0]), px[3]);
            }
        }
        BitmapFormat::Argb32 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *out = blend_alpha(luminance(px[1], px[2], px[3]), px[0]);
            }
        }
        BitmapFormat::Rgb565 => {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(2)) {
                let value = u16::from_le_bytes([px[0], px[1]]);
                let r5 = ((value >> 11) & 0x1F) as u8;
                let g6 = ((value >> 5) & 0x3F) as u8;
                let b5 = (value & 0x1F) as u8;
                *out = luminance((r5 << 3) | (r5 >> 2), (g6 << 2) | (g6 >> 4), (b5 << 3) | (b5 >> 2));
            }
        }
        BitmapFormat::Uyvy => {
            for (x, out) in dst.iter_mut().enumerate() {
                *out = src[x * 2 + 1];
            }
        }
        BitmapFormat::Yuyv => {
            for (x, out) in dst.iter_mut().enumerate() {
                *out = src[x * 2];
            }
        }
    }
}

/// Convert a tightly packed pixel buffer to one luminance byte per pixel
///
/// # Arguments
/// * `pixels` - Raw pixel bytes, rows without padding
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `format` - Layout of `pixels`
pub fn to_luminance(
    pixels: &[u8],
    width: usize,
    height: usize,
    format: BitmapFormat,
) -> Result<Vec<u8>> {
    let stride = width * format.bytes_per_pixel();
    let expected = stride * height;
    if pixels.len() < expected {
        return Err(Error::BufferTooSmall {
            expected,
            actual: pixels.len(),
        });
    }

    let mut gray = vec![0u8; width * height];
    if width == 0 || height == 0 {
        return Ok(gray);
    }

    if width * height >= PARALLEL_MIN_PIXELS {
        gray.par_chunks_mut(width)
            .zip(pixels.par_chunks(stride))
            .for_each(|(row, src)| convert_row(src, row, format));
    } else {
        for (row, src) in gray.chunks_mut(width).zip(pixels.chunks(stride)) {
            convert_row(src, row, format);
        }
    }

    Ok(gray)
}
