//! Static line-segment obstacles (walls, shelving rows).

use crowd_core::Vec2;

/// A wall segment from `start` to `end`.  Degenerate segments
/// (`start == end`) behave as point obstacles.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub start: Vec2,
    pub end: Vec2,
}

impl Obstacle {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// The point on the segment closest to `p`.
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let seg = self.end - self.start;
        let len_sq = seg.length_squared();
        if len_sq < 1e-12 {
            return self.start;
        }
        let t = ((p - self.start).dot(seg) / len_sq).clamp(0.0, 1.0);
        self.start + seg * t
    }

    /// Distance from `p` to the segment.
    #[inline]
    pub fn distance_to(&self, p: Vec2) -> f64 {
        (p - self.closest_point(p)).length()
    }
}
