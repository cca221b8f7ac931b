use tracing::{debug, trace};

use super::{Decoder, MultipleDecoder, ResultPointCallback};
use crate::binarizer::BinaryBitmap;
use crate::config;
use crate::models::{DecodeHints, DecodedResult};

/// Finds several symbols by decoding, then recursing into the regions left,
/// above, right of and below each hit
///
/// Results are de-duplicated by text and their points translated back into
/// the coordinates of the original frame. Recursion stops at a fixed depth
/// and at regions no larger than the minimum dimension.
pub struct GenericMultipleDecoder<D> {
    delegate: D,
    max_depth: usize,
    min_dimension: usize,
}

impl<D: Decoder> GenericMultipleDecoder<D> {
    /// Wrap `delegate` with the process-wide recursion limits
    pub fn new(delegate: D) -> Self {
        Self::with_limits(delegate, config::multi_max_depth(), config::multi_min_dimension())
    }

    /// Wrap `delegate` with explicit recursion limits
    pub fn with_limits(delegate: D, max_depth: usize, min_dimension: usize) -> Self {
        Self {
            delegate,
            max_depth,
            min_dimension,
        }
    }

    /// Give back the wrapped decoder
    pub fn into_inner(self) -> D {
        self.delegate
    }

    fn decode_region(
        &mut self,
        image: &BinaryBitmap,
        hints: &DecodeHints,
        mut on_point: Option<&mut ResultPointCallback>,
        results: &mut Vec<DecodedResult>,
        offset: (usize, usize),
        depth: usize,
    ) {
        if depth > self.max_depth {
            return;
        }
        let Some(result) = self.delegate.decode(image, hints, on_point.as_deref_mut()) else {
            return;
        };

        let (x_offset, y_offset) = offset;
        let bounds = bounding_box(&result);
        if results.iter().any(|existing| existing.text == result.text) {
            trace!(depth, "duplicate symbol skipped");
        } else {
            results.push(translate_result_points(result, x_offset, y_offset));
        }

        let Some((min_x, min_y, max_x, max_y)) = bounds else {
            return;
        };
        if !image.is_crop_supported() {
            return;
        }

        let width = image.width();
        let height = image.height();
        let min_dimension = self.min_dimension as f32;
        let mut regions = Vec::with_capacity(4);
        if min_x > min_dimension {
            regions.push((0, 0, min_x as usize, height));
        }
        if min_y > min_dimension {
            regions.push((0, 0, width, min_y as usize));
        }
        if max_x < width as f32 - min_dimension {
            let left = max_x.max(0.0) as usize;
            regions.push((left, 0, width - left, height));
        }
        if max_y < height as f32 - min_dimension {
            let top = max_y.max(0.0) as usize;
            regions.push((0, top, width, height - top));
        }

        for (left, top, region_width, region_height) in regions {
            match image.crop(left, top, region_width, region_height) {
                Ok(cropped) => {
                    trace!(depth, left, top, region_width, region_height, "searching region");
                    self.decode_region(
                        &cropped,
                        hints,
                        on_point.as_deref_mut(),
                        results,
                        (x_offset + left, y_offset + top),
                        depth + 1,
                    );
                }
                Err(error) => debug!(%error, "region crop failed"),
            }
        }
    }
}

impl<D: Decoder> MultipleDecoder for GenericMultipleDecoder<D> {
    fn decode_multiple(
        &mut self,
        image: &BinaryBitmap,
        hints: &DecodeHints,
        on_point: Option<&mut ResultPointCallback>,
    ) -> Vec<DecodedResult> {
        let mut results = Vec::new();
        self.decode_region(image, hints, on_point, &mut results, (0, 0), 0);
        debug!(found = results.len(), "multi-symbol search finished");
        results
    }
}

/// `(min_x, min_y, max_x, max_y)` over the result points
fn bounding_box(result: &DecodedResult) -> Option<(f32, f32, f32, f32)> {
    let first = result.result_points.first()?;
    Some(result.result_points.iter().fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    ))
}

fn translate_result_points(mut result: DecodedResult, x_offset: usize, y_offset: usize) -> DecodedResult {
    if x_offset == 0 && y_offset == 0 {
        return result;
    }
    for point in &mut result.result_points {
        *point = point.translate(x_offset as f32, y_offset as f32);
    }
    result
}
