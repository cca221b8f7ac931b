/// Geometry utilities for perspective transformations
use crate::models::Point;

/// Perspective transformation matrix (3x3)
///
/// Maps `(x, y)` to `((a11 x + a21 y + a31) / w, (a12 x + a22 y + a32) / w)`
/// with `w = a13 x + a23 y + a33`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    a11: f32,
    a12: f32,
    a13: f32,
    a21: f32,
    a22: f32,
    a23: f32,
    a31: f32,
    a32: f32,
    a33: f32,
}

impl PerspectiveTransform {
    #[allow(clippy::too_many_arguments)]
    fn new(
        a11: f32,
        a21: f32,
        a31: f32,
        a12: f32,
        a22: f32,
        a32: f32,
        a13: f32,
        a23: f32,
        a33: f32,
    ) -> Self {
        Self {
            a11,
            a12,
            a13,
            a21,
            a22,
            a23,
            a31,
            a32,
            a33,
        }
    }

    /// Map the quadrilateral `src` onto the quadrilateral `dst`
    ///
    /// Corners are given in order around the shape, i.e. the images of the
    /// unit square corners (0,0), (1,0), (1,1), (0,1).
    pub fn quadrilateral_to_quadrilateral(src: &[Point; 4], dst: &[Point; 4]) -> Self {
        let q_to_s = Self::quadrilateral_to_square(src);
        let s_to_q = Self::square_to_quadrilateral(dst);
        s_to_q.times(&q_to_s)
    }

    /// Map the unit square onto `quad`
    pub fn square_to_quadrilateral(quad: &[Point; 4]) -> Self {
        let [p0, p1, p2, p3] = *quad;
        let dx3 = p0.x - p1.x + p2.x - p3.x;
        let dy3 = p0.y - p1.y + p2.y - p3.y;
        if dx3 == 0.0 && dy3 == 0.0 {
            // Parallelogram: affine is enough
            return Self::new(
                p1.x - p0.x,
                p2.x - p1.x,
                p0.x,
                p1.y - p0.y,
                p2.y - p1.y,
                p0.y,
                0.0,
                0.0,
                1.0,
            );
        }

        let dx1 = p1.x - p2.x;
        let dx2 = p3.x - p2.x;
        let dy1 = p1.y - p2.y;
        let dy2 = p3.y - p2.y;
        let denominator = dx1 * dy2 - dx2 * dy1;
        let a13 = (dx3 * dy2 - dx2 * dy3) / denominator;
        let a23 = (dx1 * dy3 - dx3 * dy1) / denominator;
        Self::new(
            p1.x - p0.x + a13 * p1.x,
            p3.x - p0.x + a23 * p3.x,
            p0.x,
            p1.y - p0.y + a13 * p1.y,
            p3.y - p0.y + a23 * p3.y,
            p0.y,
            a13,
            a23,
            1.0,
        )
    }

    /// Map `quad` onto the unit square
    pub fn quadrilateral_to_square(quad: &[Point; 4]) -> Self {
        // The adjoint is the inverse up to scale, which the divide by w removes
        Self::square_to_quadrilateral(quad).build_adjoint()
    }

    /// Adjugate matrix
    pub fn build_adjoint(&self) -> Self {
        Self::new(
            self.a22 * self.a33 - self.a23 * self.a32,
            self.a23 * self.a31 - self.a21 * self.a33,
            self.a21 * self.a32 - self.a22 * self.a31,
            self.a13 * self.a32 - self.a12 * self.a33,
            self.a11 * self.a33 - self.a13 * self.a31,
            self.a12 * self.a31 - self.a11 * self.a32,
            self.a12 * self.a23 - self.a13 * self.a22,
            self.a13 * self.a21 - self.a11 * self.a23,
            self.a11 * self.a22 - self.a12 * self.a21,
        )
    }

    /// Compose: the result applies `other` first, then `self`
    pub fn times(&self, other: &Self) -> Self {
        Self::new(
            self.a11 * other.a11 + self.a21 * other.a12 + self.a31 * other.a13,
            self.a11 * other.a21 + self.a21 * other.a22 + self.a31 * other.a23,
            self.a11 * other.a31 + self.a21 * other.a32 + self.a31 * other.a33,
            self.a12 * other.a11 + self.a22 * other.a12 + self.a32 * other.a13,
            self.a12 * other.a21 + self.a22 * other.a22 + self.a32 * other.a23,
            self.a12 * other.a31 + self.a22 * other.a32 + self.a32 * other.a33,
            self.a13 * other.a11 + self.a23 * other.a12 + self.a33 * other.a13,
            self.a13 * other.a21 + self.a23 * other.a22 + self.a33 * other.a23,
            self.a13 * other.a31 + self.a23 * other.a32 + self.a33 * other.a33,
        )
    }

    /// Transform flat `[x0, y0, x1, y1, ...]` pairs in place
    pub fn transform_points(&self, points: &mut [f32]) {
        for pair in points.chunks_exact_mut(2) {
            let x = pair[0];
            let y = pair[1];
            let denominator = self.a13 * x + self.a23 * y + self.a33;
            pair[0] = (self.a11 * x + self.a21 * y + self.a31) / denominator;
            pair[1] = (self.a12 * x + self.a22 * y + self.a32) / denominator;
        }
    }

    /// Transform separate x and y coordinate slices in place
    pub fn transform_points_xy(&self, xs: &mut [f32], ys: &mut [f32]) {
        for (x, y) in xs.iter_mut().zip(ys.iter_mut()) {
            let denominator = self.a13 * *x + self.a23 * *y + self.a33;
            let new_x = (self.a11 * *x + self.a21 * *y + self.a31) / denominator;
            let new_y = (self.a12 * *x + self.a22 * *y + self.a32) / denominator;
            *x = new_x;
            *y = new_y;
        }
    }

    /// Transform a point using this perspective matrix
    pub fn transform(&self, p: &Point) -> Point {
        let mut pair = [p.x, p.y];
        self.transform_points(&mut pair);
        Point::new(pair[0], pair[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(p: Point, x: f32, y: f32) {
        assert!(
            (p.x - x).abs() < 0.01 && (p.y - y).abs() < 0.01,
            "expected ({x}, {y}), got ({}, {})",
            p.x,
            p.y
        );
    }

    #[test]
    fn test_square_to_quadrilateral_maps_corners() {
        let quad = [
            Point::new(10.0, 12.0),
            Point::new(95.0, 20.0),
            Point::new(80.0, 90.0),
            Point::new(5.0, 70.0),
        ];
        let t = PerspectiveTransform::square_to_quadrilateral(&quad);
        assert_close(t.transform(&Point::new(0.0, 0.0)), 10.0, 12.0);
        assert_close(t.transform(&Point::new(1.0, 0.0)), 95.0, 20.0);
        assert_close(t.transform(&Point::new(1.0, 1.0)), 80.0, 90.0);
        assert_close(t.transform(&Point::new(0.0, 1.0)), 5.0, 70.0);
    }

    #[test]
    fn test_parallelogram_is_affine() {
        let quad = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(60.0, 40.0),
            Point::new(10.0, 40.0),
        ];
        let t = PerspectiveTransform::square_to_quadrilateral(&quad);
        assert_eq!(t.a13, 0.0);
        assert_eq!(t.a23, 0.0);
        assert_close(t.transform(&Point::new(0.5, 0.5)), 30.0, 20.0);
    }

    #[test]
    fn test_quadrilateral_to_quadrilateral() {
        let src = [
            Point::new(3.5, 3.5),
            Point::new(17.5, 3.5),
            Point::new(17.5, 17.5),
            Point::new(3.5, 17.5),
        ];
        let dst = [
            Point::new(100.0, 120.0),
            Point::new(240.0, 110.0),
            Point::new(260.0, 250.0),
            Point::new(90.0, 270.0),
        ];
        let t = PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst);
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_close(t.transform(s), d.x, d.y);
        }
    }

    #[test]
    fn test_transform_points_in_place() {
        let quad = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let t = PerspectiveTransform::square_to_quadrilateral(&quad);
        let mut points = [0.5, 0.5, 0.25, 0.75];
        t.transform_points(&mut points);
        assert!((points[0] - 50.0).abs() < 1e-4);
        assert!((points[3] - 75.0).abs() < 1e-4);

        let mut xs = [0.5];
        let mut ys = [0.25];
        t.transform_points_xy(&mut xs, &mut ys);
        assert!((xs[0] - 50.0).abs() < 1e-4 && (ys[0] - 25.0).abs() < 1e-4);
    }
}
