//! Straight line segment.

use super::{ShapeKind, ShapeTrait};
use kurbo::{BezPath, Point, Size};
use serde::{Deserialize, Serialize};

/// A line segment in local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
}

impl Line {
    /// Create a new line from local points.
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Build a line between two scene points, returning it with the top-left of
    /// its box so the local points start at the origin.
    pub fn spanning(start: Point, end: Point) -> (Self, Point) {
        let origin = Point::new(start.x.min(end.x), start.y.min(end.y));
        let offset = origin.to_vec2();
        (Self::new(start - offset, end - offset), origin)
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }
}

impl ShapeTrait for Line {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn size(&self) -> Size {
        Size::new(
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        super::point_to_segment_dist(point, self.start, self.end) <= tolerance
    }
}
