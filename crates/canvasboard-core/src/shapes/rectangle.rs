//! Rectangle shape.

use super::{ShapeKind, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Create a rectangle from two corner points, returning it with its top-left
    /// corner.
    pub fn from_corners(p1: Point, p2: Point) -> (Self, Point) {
        let origin = Point::new(p1.x.min(p2.x), p1.y.min(p2.y));
        let rect = Self::new((p2.x - p1.x).abs(), (p2.y - p1.y).abs());
        (rect, origin)
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl ShapeTrait for Rectangle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Rectangle
    }

    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_from_corners() {
        let (rect, origin) =
            Rectangle::from_corners(Point::new(100.0, 50.0), Point::new(0.0, 0.0));
        assert!((origin.x - 0.0).abs() < f64::EPSILON);
        assert!((origin.y - 0.0).abs() < f64::EPSILON);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new(100.0, 100.0);
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(103.0, 50.0), 5.0));
    }
}
