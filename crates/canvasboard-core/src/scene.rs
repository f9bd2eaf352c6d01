//! Scene store: drawables in z-order plus canvas-level properties.

use crate::shapes::{Drawable, SerializableColor, ShapeId};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Version tag written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors produced while encoding or decoding scene snapshots.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("snapshot is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("duplicate object id {0} in snapshot")]
    DuplicateId(ShapeId),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// On-the-wire form of a scene: objects listed back to front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub version: u32,
    pub width: f64,
    pub height: f64,
    pub background: SerializableColor,
    pub objects: Vec<Drawable>,
}

/// The live set of drawables.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Logical canvas width.
    pub width: f64,
    /// Logical canvas height.
    pub height: f64,
    /// Canvas background color.
    pub background: SerializableColor,
    shapes: HashMap<ShapeId, Drawable>,
    /// Back to front.
    z_order: Vec<ShapeId>,
}

impl Scene {
    /// Create an empty scene with a white background.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: SerializableColor::white(),
            shapes: HashMap::new(),
            z_order: Vec::new(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Add a drawable on top of everything else.
    pub fn add(&mut self, drawable: Drawable) -> ShapeId {
        let id = drawable.id();
        if self.shapes.insert(id, drawable).is_none() {
            self.z_order.push(id);
        }
        id
    }

    /// Overwrite an existing drawable in place, keeping its z position.
    /// Returns false if no drawable with that id exists.
    pub fn replace(&mut self, drawable: Drawable) -> bool {
        match self.shapes.get_mut(&drawable.id()) {
            Some(slot) => {
                *slot = drawable;
                true
            }
            None => false,
        }
    }

    /// Remove a drawable.
    pub fn remove(&mut self, id: ShapeId) -> Option<Drawable> {
        let removed = self.shapes.remove(&id)?;
        self.z_order.retain(|&shape_id| shape_id != id);
        Some(removed)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Drawable> {
        self.shapes.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Drawable> {
        self.shapes.get_mut(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Drawables back to front.
    pub fn ordered(&self) -> impl Iterator<Item = &Drawable> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Ids back to front.
    pub fn ids(&self) -> &[ShapeId] {
        &self.z_order
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Topmost drawable under a scene point.
    pub fn shape_at(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.z_order.iter().rev().copied().find(|id| {
            self.shapes
                .get(id)
                .is_some_and(|d| d.hit_test(point, tolerance))
        })
    }

    /// Apply a per-axis ratio to the canvas size and to every drawable.
    pub fn rescale(&mut self, sx: f64, sy: f64) {
        self.width *= sx;
        self.height *= sy;
        for drawable in self.shapes.values_mut() {
            drawable.rescale(sx, sy);
        }
    }

    /// Build the serializable form, objects in z-order.
    pub fn to_snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            version: SNAPSHOT_VERSION,
            width: self.width,
            height: self.height,
            background: self.background,
            objects: self.ordered().cloned().collect(),
        }
    }

    /// Rebuild a scene from its serializable form.
    pub fn from_snapshot(snapshot: SceneSnapshot) -> SceneResult<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SceneError::UnsupportedVersion(snapshot.version));
        }
        let mut scene = Self::new(snapshot.width, snapshot.height);
        scene.background = snapshot.background;
        for drawable in snapshot.objects {
            let id = drawable.id();
            if scene.contains(id) {
                return Err(SceneError::DuplicateId(id));
            }
            scene.add(drawable);
        }
        Ok(scene)
    }

    /// Serialize the scene to a JSON string.
    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string(&self.to_snapshot()).map_err(SceneError::Encode)
    }

    /// Deserialize a scene from a JSON string.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let snapshot: SceneSnapshot = serde_json::from_str(json).map_err(SceneError::Decode)?;
        Self::from_snapshot(snapshot)
    }

    /// Structural equality: same canvas properties and the same drawables in
    /// the same order, compared field by field.
    pub fn same_content(&self, other: &Scene) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.background == other.background
            && self.ordered().eq(other.ordered())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Line, Rectangle, Shape, ShapeStyle, Text};

    fn rect_at(x: f64, y: f64) -> Drawable {
        Drawable::new(
            Shape::Rectangle(Rectangle::new(100.0, 100.0)),
            Point::new(x, y),
            ShapeStyle::default(),
        )
    }

    #[test]
    fn test_add_remove() {
        let mut scene = Scene::new(800.0, 600.0);
        let id = scene.add(rect_at(0.0, 0.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.remove(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.ids().is_empty());
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn test_shape_at_returns_topmost() {
        let mut scene = Scene::new(800.0, 600.0);
        let bottom = scene.add(rect_at(0.0, 0.0));
        let top = scene.add(rect_at(50.0, 50.0));
        assert_eq!(scene.shape_at(Point::new(75.0, 75.0), 0.0), Some(top));
        assert_eq!(scene.shape_at(Point::new(10.0, 10.0), 0.0), Some(bottom));
        assert_eq!(scene.shape_at(Point::new(500.0, 500.0), 0.0), None);
    }

    #[test]
    fn test_replace_keeps_z_order() {
        let mut scene = Scene::new(800.0, 600.0);
        let a = scene.add(rect_at(0.0, 0.0));
        let b = scene.add(rect_at(10.0, 10.0));
        let mut moved = scene.get(a).unwrap().clone();
        moved.left = 300.0;
        assert!(scene.replace(moved));
        assert_eq!(scene.ids(), &[a, b]);
        assert!((scene.get(a).unwrap().left - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_roundtrip_preserves_structure() {
        let mut scene = Scene::new(1024.0, 768.0);
        scene.background = SerializableColor::new(16, 16, 30, 255);
        scene.add(rect_at(10.0, 20.0));
        scene.add(Drawable::new(
            Shape::Circle(Circle::new(50.0)),
            Point::new(300.0, 300.0),
            ShapeStyle::filled(SerializableColor::black()),
        ));
        let (line, origin) = Line::spanning(Point::new(50.0, 50.0), Point::new(200.0, 200.0));
        scene.add(Drawable::new(
            Shape::Line(line),
            origin,
            ShapeStyle::stroked(SerializableColor::black(), 3.0),
        ));
        scene.add(Drawable::new(
            Shape::Text(Text::placeholder()),
            Point::new(400.0, 300.0),
            ShapeStyle::default(),
        ));

        let json = scene.to_json().unwrap();
        let restored = Scene::from_json(&json).unwrap();
        assert!(restored.same_content(&scene));
        assert_eq!(restored.ids(), scene.ids());
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            Scene::from_json("not json"),
            Err(SceneError::Decode(_))
        ));
        let future = r#"{"version":99,"width":1,"height":1,"background":{"r":0,"g":0,"b":0,"a":255},"objects":[]}"#;
        assert!(matches!(
            Scene::from_json(future),
            Err(SceneError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_rescale() {
        let mut scene = Scene::new(800.0, 600.0);
        let id = scene.add(rect_at(100.0, 100.0));
        scene.rescale(2.0, 0.5);
        assert!((scene.width - 1600.0).abs() < f64::EPSILON);
        assert!((scene.height - 300.0).abs() < f64::EPSILON);
        let d = scene.get(id).unwrap();
        assert!((d.left - 200.0).abs() < f64::EPSILON);
        assert!((d.top - 50.0).abs() < f64::EPSILON);
        assert!((d.scale_x - 2.0).abs() < f64::EPSILON);
        assert!((d.scale_y - 0.5).abs() < f64::EPSILON);
    }
}
