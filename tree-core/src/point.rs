//! Small convenience operations on [`Point`].

use crate::types::Point;

/// Translation and distance helpers for [`Point`].
pub trait PointExt {
    /// Moves this point by `(dx, dy)` in place.
    fn translate(&mut self, dx: f32, dy: f32);

    /// Returns a copy of this point moved by `(dx, dy)`.
    fn translated(self, dx: f32, dy: f32) -> Self;

    /// Euclidean distance between `self` and `other`.
    fn distance_to(self, other: Self) -> f32;
}

impl PointExt for Point {
    #[inline]
    fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    #[inline]
    fn translated(self, dx: f32, dy: f32) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }

    #[inline]
    fn distance_to(self, other: Self) -> f32 {
        (other - self).length()
    }
}
