//! Helpers shared by the `scantool` binary and benchmarks: image loading
//! through the `image` crate, binarizer selection and summary statistics.

use std::env;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use thiserror::Error;

use crate::binarizer::{Binarizer, GlobalHistogramBinarizer, HybridBinarizer};
use crate::luminance::{GrayLuminanceSource, LuminanceSource};
use crate::models::BitMatrix;
use crate::utils::grayscale::BitmapFormat;

/// Failures while loading or saving tool images
#[derive(Error, Debug)]
pub enum ToolError {
    /// The image could not be read, decoded or written
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Pixel conversion rejected the decoded buffer
    #[error("conversion error: {0}")]
    Barcode(#[from] crate::error::Error),
}

fn max_dim_from_env() -> Option<u32> {
    match env::var("BARCODE_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(v) => Some(v),
        },
        Err(_) => None,
    }
}

/// Load an image file as a luminance source
///
/// Images larger than `BARCODE_MAX_DIM` on either side are downscaled first.
pub fn load_luminance<P: AsRef<Path>>(path: P) -> Result<GrayLuminanceSource, ToolError> {
    let mut img = image::open(path)?;
    if let Some(max_dim) = max_dim_from_env() {
        let (width, height) = img.dimensions();
        if width.max(height) > max_dim {
            img = img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle);
        }
    }
    Ok(luminance_from_image(&img)?)
}

/// Convert a decoded image, blending transparency towards white
pub fn luminance_from_image(img: &DynamicImage) -> crate::error::Result<GrayLuminanceSource> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    GrayLuminanceSource::from_pixels(
        rgba.as_raw(),
        width as usize,
        height as usize,
        BitmapFormat::Rgba32,
    )
}

/// Render a matrix as a black-on-white grayscale image
pub fn bit_matrix_to_image(matrix: &BitMatrix) -> GrayImage {
    GrayImage::from_fn(matrix.width() as u32, matrix.height() as u32, |x, y| {
        if matrix.get(x as usize, y as usize) {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Which binarizer a tool should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinarizerKind {
    /// Block-adaptive thresholds
    #[default]
    Hybrid,
    /// Single histogram threshold
    Global,
}

impl BinarizerKind {
    /// Bind a binarizer of this kind to `source`
    pub fn create(self, source: Arc<dyn LuminanceSource>) -> Box<dyn Binarizer> {
        match self {
            BinarizerKind::Hybrid => Box::new(HybridBinarizer::new(source)),
            BinarizerKind::Global => Box::new(GlobalHistogramBinarizer::new(source)),
        }
    }
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of black pixels.
    pub black_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of black pixels to total pixels.
    pub black_ratio: f64,
}

/// Compute min/max/avg over a luminance source.
pub fn grayscale_stats(source: &dyn LuminanceSource) -> GrayStats {
    let luminances = source.matrix();
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in luminances.iter() {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if luminances.is_empty() {
        0
    } else {
        (sum / luminances.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Compute black pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let mut black = 0usize;
    for y in 0..binary.height() {
        for x in 0..binary.width() {
            if binary.get(x, y) {
                black += 1;
            }
        }
    }
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        black as f64 / total as f64
    };
    BinaryStats {
        black_pixels: black,
        total_pixels: total,
        black_ratio: ratio,
    }
}
