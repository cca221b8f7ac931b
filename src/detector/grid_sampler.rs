use tracing::trace;

use crate::config;
use crate::luminance::LuminanceSource;
use crate::models::{BitMatrix, Point};
use crate::utils::geometry::PerspectiveTransform;

/// Samples a `dimension_x x dimension_y` module grid out of an image
pub trait GridSampler {
    /// Sample with `transform` mapping grid coordinates to image pixels
    ///
    /// Cell `(x, y)` is read at the image point `transform(x + 0.5, y + 0.5)`.
    /// Returns `None` when any cell maps more than one pixel outside the image.
    fn sample_grid(
        &self,
        image: &BitMatrix,
        dimension_x: usize,
        dimension_y: usize,
        transform: &PerspectiveTransform,
    ) -> Option<BitMatrix>;

    /// Sample with the transform taking quadrilateral `to` (grid space) onto
    /// `from` (image space)
    fn sample_grid_quads(
        &self,
        image: &BitMatrix,
        dimension_x: usize,
        dimension_y: usize,
        to: &[Point; 4],
        from: &[Point; 4],
    ) -> Option<BitMatrix> {
        let transform = PerspectiveTransform::quadrilateral_to_quadrilateral(to, from);
        self.sample_grid(image, dimension_x, dimension_y, &transform)
    }
}

/// Grid sampler reading one pixel, or a small neighbourhood vote, per cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultGridSampler {
    range: usize,
}

impl DefaultGridSampler {
    /// Each cell reads the `(2 * range + 1)^2` pixels around its centre;
    /// `0` reads the centre pixel alone
    pub fn new(range: usize) -> Self {
        Self { range }
    }

    /// Neighbourhood radius
    pub fn range(&self) -> usize {
        self.range
    }

    /// Sample a grayscale source directly, thresholding each cell's mean
    /// luminance at `black_point` (below is black)
    pub fn sample_grid_luminance(
        &self,
        source: &dyn LuminanceSource,
        dimension_x: usize,
        dimension_y: usize,
        transform: &PerspectiveTransform,
        black_point: u8,
    ) -> Option<BitMatrix> {
        let width = source.width();
        let height = source.height();
        let luminances = source.matrix();
        self.sample_with(width, height, dimension_x, dimension_y, transform, |x, y| {
            let (x0, x1) = window(x, self.range, width);
            let (y0, y1) = window(y, self.range, height);
            let mut sum = 0u32;
            for row in luminances[y0 * width..(y1 + 1) * width].chunks_exact(width) {
                sum += row[x0..=x1].iter().map(|&v| v as u32).sum::<u32>();
            }
            let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u32;
            sum / count < black_point as u32
        })
    }

    fn sample_with<F>(
        &self,
        width: usize,
        height: usize,
        dimension_x: usize,
        dimension_y: usize,
        transform: &PerspectiveTransform,
        mut is_black: F,
    ) -> Option<BitMatrix>
    where
        F: FnMut(usize, usize) -> bool,
    {
        if dimension_x == 0 || dimension_y == 0 || width == 0 || height == 0 {
            return None;
        }
        let mut bits = BitMatrix::new(dimension_x, dimension_y);
        let mut points = vec![0f32; 2 * dimension_x];
        for y in 0..dimension_y {
            let cell_y = y as f32 + 0.5;
            for (x, pair) in points.chunks_exact_mut(2).enumerate() {
                pair[0] = x as f32 + 0.5;
                pair[1] = cell_y;
            }
            transform.transform_points(&mut points);
            if !check_and_nudge_points(width, height, &mut points) {
                trace!(row = y, "grid row maps outside the image");
                return None;
            }
            for (x, pair) in points.chunks_exact(2).enumerate() {
                if is_black(pair[0] as usize, pair[1] as usize) {
                    bits.set(x, y, true);
                }
            }
        }
        Some(bits)
    }
}

impl Default for DefaultGridSampler {
    fn default() -> Self {
        Self::new(config::sample_radius())
    }
}

impl GridSampler for DefaultGridSampler {
    fn sample_grid(
        &self,
        image: &BitMatrix,
        dimension_x: usize,
        dimension_y: usize,
        transform: &PerspectiveTransform,
    ) -> Option<BitMatrix> {
        let width = image.width();
        let height = image.height();
        let range = self.range;
        self.sample_with(width, height, dimension_x, dimension_y, transform, |x, y| {
            if range == 0 {
                return image.get(x, y);
            }
            let (x0, x1) = window(x, range, width);
            let (y0, y1) = window(y, range, height);
            let mut black = 0;
            let mut total = 0;
            for sy in y0..=y1 {
                for sx in x0..=x1 {
                    total += 1;
                    if image.get(sx, sy) {
                        black += 1;
                    }
                }
            }
            black * 2 >= total
        })
    }
}

/// Inclusive `[center - range, center + range]` clipped to `0..len`
fn window(center: usize, range: usize, len: usize) -> (usize, usize) {
    (center.saturating_sub(range), (center + range).min(len - 1))
}

/// Validate sample points against a `width x height` image
///
/// `points` holds flat `(x, y)` pairs. Points up to one pixel outside the
/// image are moved onto its border; any point further out, or not finite,
/// makes the whole set invalid and `false` is returned.
pub fn check_and_nudge_points(width: usize, height: usize, points: &mut [f32]) -> bool {
    let (max_x, max_y) = (width as f32, height as f32);
    for pair in points.chunks_exact_mut(2) {
        let (x, y) = (pair[0], pair[1]);
        // Negated comparisons so NaN fails too
        if !(x >= -1.0 && x < max_x + 1.0 && y >= -1.0 && y < max_y + 1.0) {
            return false;
        }
        if x < 0.0 {
            pair[0] = 0.0;
        } else if x >= max_x {
            pair[0] = max_x - 1.0;
        }
        if y < 0.0 {
            pair[1] = 0.0;
        } else if y >= max_y {
            pair[1] = max_y - 1.0;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luminance::GrayLuminanceSource;

    fn unit_square(dimension: f32) -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(dimension, 0.0),
            Point::new(dimension, dimension),
            Point::new(0.0, dimension),
        ]
    }

    #[test]
    fn test_nudges_points_within_one_pixel() {
        let mut points = [-0.999, 5.0, 10.999, 5.0, 5.0, -0.5, 5.0, 10.5];
        assert!(check_and_nudge_points(10, 10, &mut points));
        assert_eq!(points, [0.0, 5.0, 9.0, 5.0, 5.0, 0.0, 5.0, 9.0]);
    }

    #[test]
    fn test_rejects_points_beyond_one_pixel() {
        assert!(!check_and_nudge_points(10, 10, &mut [-1.5, 5.0]));
        assert!(!check_and_nudge_points(10, 10, &mut [11.5, 5.0]));
        assert!(!check_and_nudge_points(10, 10, &mut [5.0, -1.5]));
        assert!(!check_and_nudge_points(10, 10, &mut [5.0, 11.5]));
        assert!(!check_and_nudge_points(10, 10, &mut [f32::NAN, 5.0]));
    }

    #[test]
    fn test_interior_failure_is_caught() {
        // Ends in bounds, middle far outside
        let mut points = [1.0, 1.0, 500.0, 1.0, 8.0, 1.0];
        assert!(!check_and_nudge_points(10, 10, &mut points));
    }

    #[test]
    fn test_upscaled_grid_round_trips() {
        // 5x5 pattern drawn at 4 pixels per module
        let pattern = BitMatrix::parse(
            "X X X X X \n\
             X       X \n\
             X   X   X \n\
             X       X \n\
             X X X X X \n",
            "X ",
            "  ",
        )
        .unwrap();
        let mut image = BitMatrix::new(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                image.set(x, y, pattern.get(x / 4, y / 4));
            }
        }
        let sampled = DefaultGridSampler::new(0)
            .sample_grid_quads(&image, 5, 5, &unit_square(5.0), &unit_square(20.0))
            .unwrap();
        assert_eq!(sampled, pattern);

        let voted = DefaultGridSampler::new(1)
            .sample_grid_quads(&image, 5, 5, &unit_square(5.0), &unit_square(20.0))
            .unwrap();
        assert_eq!(voted, pattern);
    }

    #[test]
    fn test_twisted_transform_returns_none() {
        let image = BitMatrix::new(20, 20);
        let twisted = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 20.0),
            Point::new(20.0, 0.0),
            Point::new(0.0, 20.0),
        ];
        let from = [
            Point::new(0.0, 0.0),
            Point::new(60.0, 0.0),
            Point::new(60.0, 60.0),
            Point::new(0.0, 60.0),
        ];
        let sampled =
            DefaultGridSampler::new(0).sample_grid_quads(&image, 20, 20, &twisted, &from);
        assert!(sampled.is_none());
    }

    #[test]
    fn test_zero_dimension_returns_none() {
        let image = BitMatrix::new(4, 4);
        let transform = PerspectiveTransform::square_to_quadrilateral(&unit_square(4.0));
        assert!(DefaultGridSampler::new(0).sample_grid(&image, 0, 3, &transform).is_none());
    }

    #[test]
    fn test_luminance_sampling() {
        let data = (0..16 * 16)
            .map(|i| if (i % 16) < 8 { 40 } else { 210 })
            .collect();
        let source = GrayLuminanceSource::new(data, 16, 16).unwrap();
        let transform = PerspectiveTransform::quadrilateral_to_quadrilateral(
            &unit_square(2.0),
            &unit_square(16.0),
        );
        let bits = DefaultGridSampler::new(1)
            .sample_grid_luminance(&source, 2, 2, &transform, 128)
            .unwrap();
        assert!(bits.get(0, 0) && bits.get(0, 1));
        assert!(!bits.get(1, 0) && !bits.get(1, 1));
    }
}
