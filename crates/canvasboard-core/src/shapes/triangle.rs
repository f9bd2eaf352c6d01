//! Triangle shape.

use super::{ShapeKind, ShapeTrait};
use kurbo::{BezPath, Point, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// An isosceles triangle with its apex at the top-center of its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub width: f64,
    pub height: f64,
}

impl Triangle {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Apex, bottom-right and bottom-left vertices.
    pub fn vertices(&self) -> [Point; 3] {
        [
            Point::new(self.width / 2.0, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ]
    }
}

impl ShapeTrait for Triangle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Triangle
    }

    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.to_path().contains(point) {
            return true;
        }
        let [a, b, c] = self.vertices();
        super::point_to_polyline_dist(point, &[a, b, c, a]) <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_test() {
        let t = Triangle::new(100.0, 100.0);
        assert!(t.hit_test(Point::new(50.0, 60.0), 0.0));
        // Top-left corner of the box is outside the triangle.
        assert!(!t.hit_test(Point::new(5.0, 5.0), 0.0));
        assert!(t.hit_test(Point::new(50.0, 102.0), 3.0));
    }
}
