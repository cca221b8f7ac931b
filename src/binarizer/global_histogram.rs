use std::sync::Arc;

use tracing::trace;

use super::{Binarizer, prepare_row};
use crate::luminance::LuminanceSource;
use crate::models::{BitArray, BitMatrix};

const LUMINANCE_BITS: u32 = 5;
const LUMINANCE_SHIFT: u32 = 8 - LUMINANCE_BITS;
const LUMINANCE_BUCKETS: usize = 1 << LUMINANCE_BITS;

/// Single-threshold binarizer driven by a 32-bucket luminance histogram
///
/// Cheap and good for evenly lit frames; rows are sharpened with a 1-4-1
/// kernel before thresholding. Shadows and gradients defeat it, which is
/// what [`super::HybridBinarizer`] is for.
pub struct GlobalHistogramBinarizer {
    source: Arc<dyn LuminanceSource>,
}

impl GlobalHistogramBinarizer {
    /// Bind to `source`
    pub fn new(source: Arc<dyn LuminanceSource>) -> Self {
        Self { source }
    }
}

impl Binarizer for GlobalHistogramBinarizer {
    fn luminance_source(&self) -> &Arc<dyn LuminanceSource> {
        &self.source
    }

    fn black_row(&self, y: usize, row: BitArray) -> Option<BitArray> {
        let width = self.source.width();
        let mut row = prepare_row(row, width);
        let luminances = self.source.row(y);

        let mut buckets = [0u32; LUMINANCE_BUCKETS];
        for &pixel in luminances.iter() {
            buckets[(pixel >> LUMINANCE_SHIFT) as usize] += 1;
        }
        let black_point = estimate_black_point(&buckets)? as i32;

        if width < 3 {
            for (x, &pixel) in luminances.iter().enumerate() {
                if (pixel as i32) < black_point {
                    row.set(x);
                }
            }
        } else {
            let mut left = luminances[0] as i32;
            let mut center = luminances[1] as i32;
            for x in 1..width - 1 {
                let right = luminances[x + 1] as i32;
                // 1-4-1 sharpening
                if (center * 4 - left - right) / 2 < black_point {
                    row.set(x);
                }
                left = center;
                center = right;
            }
        }
        Some(row)
    }

    fn black_matrix(&self) -> Option<BitMatrix> {
        let width = self.source.width();
        let height = self.source.height();

        // Sample four rows across the middle of the frame, skipping the outer fifth
        let mut buckets = [0u32; LUMINANCE_BUCKETS];
        let right = width * 4 / 5;
        for y in 1..5 {
            let luminances = self.source.row(height * y / 5);
            for &pixel in &luminances[width / 5..right] {
                buckets[(pixel >> LUMINANCE_SHIFT) as usize] += 1;
            }
        }
        let black_point = estimate_black_point(&buckets)?;

        let luminances = self.source.matrix();
        let mut matrix = BitMatrix::new(width, height);
        for (y, row) in luminances.chunks_exact(width).enumerate() {
            for (x, &pixel) in row.iter().enumerate() {
                if pixel < black_point {
                    matrix.set(x, y, true);
                }
            }
        }
        Some(matrix)
    }

    fn create_binarizer(&self, source: Arc<dyn LuminanceSource>) -> Box<dyn Binarizer> {
        Box::new(Self::new(source))
    }
}

/// Luminance below which a pixel counts as black, `None` on a unimodal histogram
pub(crate) fn estimate_black_point(buckets: &[u32; LUMINANCE_BUCKETS]) -> Option<u8> {
    let mut max_bucket_count = 0;
    let mut first_peak = 0;
    let mut first_peak_size = 0;
    for (x, &count) in buckets.iter().enumerate() {
        if count > first_peak_size {
            first_peak = x;
            first_peak_size = count;
        }
        max_bucket_count = max_bucket_count.max(count);
    }

    // Second peak: tall and far from the first
    let mut second_peak = 0;
    let mut second_peak_score = 0u64;
    for (x, &count) in buckets.iter().enumerate() {
        let distance = x.abs_diff(first_peak) as u64;
        let score = count as u64 * distance * distance;
        if score > second_peak_score {
            second_peak = x;
            second_peak_score = score;
        }
    }

    if second_peak_score == 0 {
        trace!(first_peak, "single-valued histogram, no black point");
        return None;
    }

    if first_peak > second_peak {
        std::mem::swap(&mut first_peak, &mut second_peak);
    }

    if second_peak - first_peak <= LUMINANCE_BUCKETS / 16 {
        trace!(first_peak, second_peak, "histogram peaks too close, no black point");
        return None;
    }

    // Deepest valley between the peaks, biased towards the white peak
    let mut best_valley = second_peak - 1;
    let mut best_valley_score = -1i64;
    for x in (first_peak + 1..second_peak).rev() {
        let from_first = (x - first_peak) as i64;
        let score = from_first
            * from_first
            * (second_peak - x) as i64
            * (max_bucket_count - buckets[x]) as i64;
        if score > best_valley_score {
            best_valley = x;
            best_valley_score = score;
        }
    }

    Some((best_valley << LUMINANCE_SHIFT) as u8)
}
