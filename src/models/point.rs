/// 2D point with floating point coordinates
///
/// Used for result points (finder patterns, bar ends) reported by decoders.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Calculate squared distance (faster, no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Translate point by (dx, dy)
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Z component of the cross product of `a - b` and `c - b`
    pub fn cross_product(a: &Point, b: &Point, c: &Point) -> f32 {
        let bx = b.x;
        let by = b.y;
        (c.x - bx) * (a.y - by) - (c.y - by) * (a.x - bx)
    }

    /// Order three finder pattern centres as `[A, B, C]`
    ///
    /// `B` is the corner opposite the longest side, and `A`, `B`, `C` run in
    /// the same rotational direction as the top-left, top-right, bottom-left
    /// corners of an upright symbol.
    pub fn order_best_patterns(patterns: [Point; 3]) -> [Point; 3] {
        let zero_one = patterns[0].distance(&patterns[1]);
        let one_two = patterns[1].distance(&patterns[2]);
        let zero_two = patterns[0].distance(&patterns[2]);

        let (mut a, b, mut c) = if one_two >= zero_one && one_two >= zero_two {
            (patterns[1], patterns[0], patterns[2])
        } else if zero_two >= one_two && zero_two >= zero_one {
            (patterns[0], patterns[1], patterns[2])
        } else {
            (patterns[0], patterns[2], patterns[1])
        };

        if Self::cross_product(&a, &b, &c) < 0.0 {
            std::mem::swap(&mut a, &mut c);
        }
        [a, b, c]
    }
}
