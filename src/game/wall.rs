//! Wall obstacles placed into grid cells

use serde::{Deserialize, Serialize};

/// Default wall fill color
pub const WALL_COLOR: &str = "#4a9eff";

/// A rectangular wall, centered on `(x, y)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
}

impl Wall {
    /// Create a wall; its position is assigned when placed into a grid
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            color: WALL_COLOR.to_string(),
        }
    }

    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Circle overlap using the closest point on the rectangle
    pub fn overlaps_circle(&self, x: f32, y: f32, radius: f32) -> bool {
        let closest_x = x.clamp(self.left(), self.right());
        let closest_y = y.clamp(self.top(), self.bottom());
        let dx = x - closest_x;
        let dy = y - closest_y;
        dx * dx + dy * dy < radius * radius
    }

    /// Segment test against the four edges of the rectangle
    pub fn intersects_segment(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        let (l, r, t, b) = (self.left(), self.right(), self.top(), self.bottom());
        segments_intersect(x1, y1, x2, y2, l, t, r, t)
            || segments_intersect(x1, y1, x2, y2, r, t, r, b)
            || segments_intersect(x1, y1, x2, y2, r, b, l, b)
            || segments_intersect(x1, y1, x2, y2, l, b, l, t)
    }
}

/// Parametric segment intersection. Parallel segments never intersect.
#[allow(clippy::too_many_arguments)]
pub fn segments_intersect(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    x3: f32,
    y3: f32,
    x4: f32,
    y4: f32,
) -> bool {
    let denominator = (x2 - x1) * (y4 - y3) - (y2 - y1) * (x4 - x3);
    if denominator == 0.0 {
        return false;
    }

    let ua = ((x4 - x3) * (y1 - y3) - (y4 - y3) * (x1 - x3)) / denominator;
    let ub = ((x2 - x1) * (y1 - y3) - (y2 - y1) * (x1 - x3)) / denominator;

    (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub)
}
