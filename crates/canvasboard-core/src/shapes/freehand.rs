//! Freehand pen stroke.

use super::{ShapeKind, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// A polyline captured from a pen drag, stored in local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    /// Points along the stroke.
    pub points: Vec<Point>,
}

impl Freehand {
    /// Build a stroke from scene points, returning it with the top-left of its
    /// box. Returns `None` for an empty point list.
    pub fn from_points(points: &[Point]) -> Option<(Self, Point)> {
        let first = points.first()?;
        let bbox = points
            .iter()
            .fold(Rect::from_points(*first, *first), |acc, p| {
                acc.union_pt(*p)
            });
        let origin = bbox.origin();
        let offset = origin.to_vec2();
        let local = points.iter().map(|p| *p - offset).collect();
        Some((Self { points: local }, origin))
    }
}

impl ShapeTrait for Freehand {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Freehand
    }

    fn size(&self) -> Size {
        self.points.iter().fold(Size::ZERO, |acc, p| {
            Size::new(acc.width.max(p.x), acc.height.max(p.y))
        })
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        if let Some((first, rest)) = self.points.split_first() {
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
        }
        path
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        super::point_to_polyline_dist(point, &self.points) <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_normalizes_origin() {
        let pts = [
            Point::new(30.0, 40.0),
            Point::new(10.0, 60.0),
            Point::new(50.0, 20.0),
        ];
        let (stroke, origin) = Freehand::from_points(&pts).unwrap();
        assert!((origin.x - 10.0).abs() < f64::EPSILON);
        assert!((origin.y - 20.0).abs() < f64::EPSILON);
        assert!((stroke.points[0].x - 20.0).abs() < f64::EPSILON);
        let size = stroke.size();
        assert!((size.width - 40.0).abs() < f64::EPSILON);
        assert!((size.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_points_empty() {
        assert!(Freehand::from_points(&[]).is_none());
    }

    #[test]
    fn test_hit_test() {
        let (stroke, _) =
            Freehand::from_points(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)]).unwrap();
        assert!(stroke.hit_test(Point::new(50.0, 2.0), 3.0));
        assert!(!stroke.hit_test(Point::new(50.0, 20.0), 3.0));
    }
}
