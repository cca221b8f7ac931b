use std::cell::OnceCell;
use std::sync::Arc;

use tracing::{debug, trace};

use super::{Binarizer, GlobalHistogramBinarizer};
use crate::luminance::LuminanceSource;
use crate::models::{BitArray, BitMatrix};

const BLOCK_SIZE_POWER: usize = 3;
const BLOCK_SIZE: usize = 1 << BLOCK_SIZE_POWER;
const MINIMUM_DIMENSION: usize = BLOCK_SIZE * 5;
const MIN_DYNAMIC_RANGE: u32 = 24;

/// Local-threshold binarizer over 8x8 blocks
///
/// Each block's threshold is the average of the 5x5 neighbourhood of block
/// estimates, which copes with shadows and lighting gradients. Rows still
/// go through the global histogram path. Frames under 40 pixels on a side
/// fall back to the global matrix.
pub struct HybridBinarizer {
    global: GlobalHistogramBinarizer,
    matrix: OnceCell<Option<BitMatrix>>,
}

impl HybridBinarizer {
    /// Bind to `source`
    pub fn new(source: Arc<dyn LuminanceSource>) -> Self {
        Self {
            global: GlobalHistogramBinarizer::new(source),
            matrix: OnceCell::new(),
        }
    }

    fn compute_matrix(&self) -> Option<BitMatrix> {
        let source = self.global.luminance_source();
        let width = source.width();
        let height = source.height();
        if width < MINIMUM_DIMENSION || height < MINIMUM_DIMENSION {
            debug!(width, height, "frame too small for block thresholds, using global histogram");
            return self.global.black_matrix();
        }

        let luminances = source.matrix();
        let sub_width = width.div_ceil(BLOCK_SIZE);
        let sub_height = height.div_ceil(BLOCK_SIZE);
        let black_points = calculate_black_points(&luminances, sub_width, sub_height, width, height);

        let mut matrix = BitMatrix::new(width, height);
        calculate_threshold_for_block(
            &luminances,
            sub_width,
            sub_height,
            width,
            height,
            &black_points,
            &mut matrix,
        );
        trace!(sub_width, sub_height, "block thresholds applied");
        Some(matrix)
    }
}

impl Binarizer for HybridBinarizer {
    fn luminance_source(&self) -> &Arc<dyn LuminanceSource> {
        self.global.luminance_source()
    }

    fn black_row(&self, y: usize, row: BitArray) -> Option<BitArray> {
        self.global.black_row(y, row)
    }

    fn black_matrix(&self) -> Option<BitMatrix> {
        self.matrix.get_or_init(|| self.compute_matrix()).clone()
    }

    fn create_binarizer(&self, source: Arc<dyn LuminanceSource>) -> Box<dyn Binarizer> {
        Box::new(Self::new(source))
    }
}

/// Per-block black point estimates, `sub_height` rows of `sub_width`
fn calculate_black_points(
    luminances: &[u8],
    sub_width: usize,
    sub_height: usize,
    width: usize,
    height: usize,
) -> Vec<Vec<u32>> {
    let max_y_offset = height - BLOCK_SIZE;
    let max_x_offset = width - BLOCK_SIZE;
    let mut black_points = vec![vec![0u32; sub_width]; sub_height];

    for y in 0..sub_height {
        let y_offset = (y << BLOCK_SIZE_POWER).min(max_y_offset);
        for x in 0..sub_width {
            let x_offset = (x << BLOCK_SIZE_POWER).min(max_x_offset);
            let mut sum = 0u32;
            let mut min = 0xFFu32;
            let mut max = 0u32;
            let mut yy = 0;
            let mut offset = y_offset * width + x_offset;
            while yy < BLOCK_SIZE {
                for &pixel in &luminances[offset..offset + BLOCK_SIZE] {
                    let pixel = pixel as u32;
                    sum += pixel;
                    min = min.min(pixel);
                    max = max.max(pixel);
                }
                yy += 1;
                offset += width;
                if max - min > MIN_DYNAMIC_RANGE {
                    // Contrast settled; only the sum is still needed
                    while yy < BLOCK_SIZE {
                        sum += luminances[offset..offset + BLOCK_SIZE]
                            .iter()
                            .map(|&p| p as u32)
                            .sum::<u32>();
                        yy += 1;
                        offset += width;
                    }
                }
            }

            let mut average = sum >> (BLOCK_SIZE_POWER * 2);
            if max - min <= MIN_DYNAMIC_RANGE {
                // Flat block: assume background, lighter than anything dark nearby
                average = min / 2;
                if y > 0 && x > 0 {
                    let neighbor_average = (black_points[y - 1][x]
                        + 2 * black_points[y][x - 1]
                        + black_points[y - 1][x - 1])
                        / 4;
                    if min < neighbor_average {
                        average = neighbor_average;
                    }
                }
            }
            black_points[y][x] = average;
        }
    }
    black_points
}

fn calculate_threshold_for_block(
    luminances: &[u8],
    sub_width: usize,
    sub_height: usize,
    width: usize,
    height: usize,
    black_points: &[Vec<u32>],
    matrix: &mut BitMatrix,
) {
    let max_y_offset = height - BLOCK_SIZE;
    let max_x_offset = width - BLOCK_SIZE;
    for y in 0..sub_height {
        let y_offset = (y << BLOCK_SIZE_POWER).min(max_y_offset);
        let top = cap(y, sub_height - 3);
        for x in 0..sub_width {
            let x_offset = (x << BLOCK_SIZE_POWER).min(max_x_offset);
            let left = cap(x, sub_width - 3);
            let sum: u32 = black_points[top - 2..=top + 2]
                .iter()
                .map(|row| row[left - 2..=left + 2].iter().sum::<u32>())
                .sum();
            threshold_block(luminances, x_offset, y_offset, sum / 25, width, matrix);
        }
    }
}

#[inline]
fn cap(value: usize, max: usize) -> usize {
    if value < 2 { 2 } else { value.min(max) }
}

fn threshold_block(
    luminances: &[u8],
    x_offset: usize,
    y_offset: usize,
    threshold: u32,
    stride: usize,
    matrix: &mut BitMatrix,
) {
    for y in 0..BLOCK_SIZE {
        let offset = (y_offset + y) * stride + x_offset;
        for x in 0..BLOCK_SIZE {
            if luminances[offset + x] as u32 <= threshold {
                matrix.set(x_offset + x, y_offset + y, true);
            }
        }
    }
}
