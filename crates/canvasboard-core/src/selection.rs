//! Selection state and corner-handle manipulation.

use crate::scene::Scene;
use crate::shapes::{Drawable, ShapeId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// What the user currently has selected.
///
/// `Background` is the sentinel for "the canvas itself": it recolors the
/// background and cannot be deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Single(ShapeId),
    /// Ordered by selection time.
    Group(Vec<ShapeId>),
    Background,
}

impl Selection {
    /// Selected object ids, in selection order.
    pub fn ids(&self) -> Vec<ShapeId> {
        match self {
            Selection::Single(id) => vec![*id],
            Selection::Group(ids) => ids.clone(),
            Selection::None | Selection::Background => Vec::new(),
        }
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        match self {
            Selection::Single(selected) => *selected == id,
            Selection::Group(ids) => ids.contains(&id),
            Selection::None | Selection::Background => false,
        }
    }

    /// True when no object is selected (the background sentinel counts as empty).
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None | Selection::Background)
    }

    pub fn is_background(&self) -> bool {
        matches!(self, Selection::Background)
    }

    /// Whether deleting the selection would remove anything.
    pub fn is_deletable(&self) -> bool {
        !self.is_empty()
    }

    /// Shift-click: none becomes single, single becomes a group of both,
    /// a group grows by one.
    pub fn extend_with(&mut self, id: ShapeId) {
        *self = match std::mem::take(self) {
            Selection::None | Selection::Background => Selection::Single(id),
            Selection::Single(existing) if existing == id => Selection::Single(existing),
            Selection::Single(existing) => Selection::Group(vec![existing, id]),
            Selection::Group(mut ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
                Selection::Group(ids)
            }
        };
    }

    /// Drop a removed object. Returns whether the selection changed.
    pub fn prune(&mut self, id: ShapeId) -> bool {
        match self {
            Selection::Single(selected) if *selected == id => {
                *self = Selection::None;
                true
            }
            Selection::Group(ids) if ids.contains(&id) => {
                ids.retain(|member| *member != id);
                *self = match ids.as_slice() {
                    [] => Selection::None,
                    [only] => Selection::Single(*only),
                    _ => return true,
                };
                true
            }
            _ => false,
        }
    }
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Position of this corner on a rectangle.
    pub fn of(self, bounds: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(bounds.x0, bounds.y0),
            Corner::TopRight => Point::new(bounds.x1, bounds.y0),
            Corner::BottomLeft => Point::new(bounds.x0, bounds.y1),
            Corner::BottomRight => Point::new(bounds.x1, bounds.y1),
        }
    }

    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Find which corner handle (if any) of `bounds` is hit.
/// `tolerance` is in scene units, so callers divide by the zoom.
pub fn hit_test_corners(bounds: Rect, point: Point, tolerance: f64) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .find(|corner| (corner.of(bounds) - point).hypot() <= tolerance)
}

/// An in-progress drag on selected objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Manipulation {
    /// Translate every listed object by the drag delta.
    Move {
        start: Point,
        origins: Vec<(ShapeId, Point)>,
    },
    /// Rescale one object about the corner opposite the dragged handle.
    Resize {
        original: Drawable,
        corner: Corner,
        anchor: Point,
    },
}

impl Manipulation {
    /// Start moving the given objects.
    pub fn begin_move(scene: &Scene, ids: &[ShapeId], start: Point) -> Option<Self> {
        let origins: Vec<_> = ids
            .iter()
            .filter_map(|id| scene.get(*id).map(|d| (*id, d.position())))
            .collect();
        if origins.is_empty() {
            return None;
        }
        Some(Manipulation::Move { start, origins })
    }

    /// Start resizing from a corner handle.
    pub fn begin_resize(drawable: &Drawable, corner: Corner) -> Self {
        let anchor = corner.opposite().of(drawable.bounds());
        Manipulation::Resize {
            original: drawable.clone(),
            corner,
            anchor,
        }
    }

    /// Ids of the objects this drag touches.
    pub fn targets(&self) -> Vec<ShapeId> {
        match self {
            Manipulation::Move { origins, .. } => origins.iter().map(|(id, _)| *id).collect(),
            Manipulation::Resize { original, .. } => vec![original.id()],
        }
    }

    /// Re-apply the drag for the current pointer position, always relative to
    /// the state captured when the drag began.
    pub fn apply(&self, scene: &mut Scene, current: Point) {
        match self {
            Manipulation::Move { start, origins } => {
                let delta: Vec2 = current - *start;
                for (id, origin) in origins {
                    if let Some(drawable) = scene.get_mut(*id) {
                        drawable.left = origin.x + delta.x;
                        drawable.top = origin.y + delta.y;
                    }
                }
            }
            Manipulation::Resize {
                original,
                corner,
                anchor,
            } => {
                let dragged = corner.of(original.bounds());
                let span = dragged - *anchor;
                let reach = current - *anchor;
                let sx = if span.x.abs() < f64::EPSILON { 1.0 } else { reach.x / span.x };
                let sy = if span.y.abs() < f64::EPSILON { 1.0 } else { reach.y / span.y };
                let mut resized = original.clone();
                resized.scale_about(*anchor, sx, sy);
                scene.replace(resized);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape, ShapeStyle};
    use uuid::Uuid;

    #[test]
    fn test_extend_with_follows_shift_rules() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let mut sel = Selection::None;
        sel.extend_with(a);
        assert_eq!(sel, Selection::Single(a));
        sel.extend_with(b);
        assert_eq!(sel, Selection::Group(vec![a, b]));
        sel.extend_with(c);
        sel.extend_with(b);
        assert_eq!(sel, Selection::Group(vec![a, b, c]));
    }

    #[test]
    fn test_background_is_not_deletable() {
        let mut sel = Selection::Background;
        assert!(!sel.is_deletable());
        assert!(sel.ids().is_empty());
        let a = Uuid::new_v4();
        sel.extend_with(a);
        assert_eq!(sel, Selection::Single(a));
    }

    #[test]
    fn test_prune_collapses_group() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut sel = Selection::Group(vec![a, b]);
        assert!(sel.prune(a));
        assert_eq!(sel, Selection::Single(b));
        assert!(!sel.prune(a));
        assert!(sel.prune(b));
        assert_eq!(sel, Selection::None);
    }

    #[test]
    fn test_hit_test_corners() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            hit_test_corners(bounds, Point::new(98.0, 52.0), 5.0),
            Some(Corner::BottomRight)
        );
        assert_eq!(hit_test_corners(bounds, Point::new(50.0, 25.0), 5.0), None);
    }

    #[test]
    fn test_resize_from_bottom_right() {
        let mut scene = Scene::new(800.0, 600.0);
        let rect = Drawable::new(
            Shape::Rectangle(Rectangle::new(100.0, 100.0)),
            Point::new(10.0, 10.0),
            ShapeStyle::default(),
        );
        let id = rect.id();
        let manip = Manipulation::begin_resize(&rect, Corner::BottomRight);
        scene.add(rect);

        manip.apply(&mut scene, Point::new(210.0, 60.0));
        let bounds = scene.get(id).unwrap().bounds();
        assert!((bounds.x0 - 10.0).abs() < 1e-9);
        assert!((bounds.y0 - 10.0).abs() < 1e-9);
        assert!((bounds.width() - 200.0).abs() < 1e-9);
        assert!((bounds.height() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_translates_all_targets() {
        let mut scene = Scene::new(800.0, 600.0);
        let a = Drawable::new(
            Shape::Rectangle(Rectangle::new(10.0, 10.0)),
            Point::new(0.0, 0.0),
            ShapeStyle::default(),
        );
        let b = Drawable::new(
            Shape::Rectangle(Rectangle::new(10.0, 10.0)),
            Point::new(50.0, 50.0),
            ShapeStyle::default(),
        );
        let ids = [a.id(), b.id()];
        scene.add(a);
        scene.add(b);

        let manip = Manipulation::begin_move(&scene, &ids, Point::new(5.0, 5.0)).unwrap();
        manip.apply(&mut scene, Point::new(15.0, 25.0));
        assert_eq!(scene.get(ids[0]).unwrap().position(), Point::new(10.0, 20.0));
        assert_eq!(scene.get(ids[1]).unwrap().position(), Point::new(60.0, 70.0));
    }
}
