//! Circle shape.

use super::{ShapeKind, ShapeTrait};
use kurbo::{BezPath, Ellipse, Point, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// A circle whose local box is `2r x 2r`.
///
/// Non-uniform drawable scale turns it into an ellipse on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn center(&self) -> Point {
        Point::new(self.radius, self.radius)
    }
}

impl ShapeTrait for Circle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Circle
    }

    fn size(&self) -> Size {
        Size::new(self.radius * 2.0, self.radius * 2.0)
    }

    fn to_path(&self) -> BezPath {
        Ellipse::new(self.center(), (self.radius, self.radius), 0.0).to_path(0.1)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.center()).hypot() <= self.radius + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_size() {
        let c = Circle::new(50.0);
        let size = c.size();
        assert!((size.width - 100.0).abs() < f64::EPSILON);
        assert!((size.height - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let c = Circle::new(50.0);
        assert!(c.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(c.hit_test(Point::new(100.0, 50.0), 0.0));
        // Corner of the box is outside the circle.
        assert!(!c.hit_test(Point::new(2.0, 2.0), 0.0));
    }
}
