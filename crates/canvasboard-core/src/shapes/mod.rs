//! Drawable object definitions.
//!
//! Every object on the canvas is a [`Drawable`]: a shared envelope (identity,
//! position, per-axis scale, style) around one [`Shape`] variant that only knows
//! its own local geometry.

mod circle;
mod freehand;
mod line;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use freehand::Freehand;
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::Text;
pub use triangle::Triangle;

use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Smallest scale factor a resize gesture may produce.
pub const MIN_SCALE: f64 = 0.05;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Returned when a color string is not `#rgb`, `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color: {0}")]
pub struct ColorParseError(pub String);

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS hex color.
    pub fn from_hex(value: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(value.to_string());
        let hex = value.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Ok(Self::new(r, g, b, 255))
            }
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(err()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Style properties shared by every drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    /// Stroke color (None = no outline).
    pub stroke: Option<SerializableColor>,
    /// Stroke width in local units.
    #[serde(default)]
    pub stroke_width: f64,
}

impl ShapeStyle {
    /// Solid fill, no outline.
    pub fn filled(color: SerializableColor) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
        }
    }

    /// Outline only.
    pub fn stroked(color: SerializableColor, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            stroke_width: width,
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::filled(SerializableColor::white())
    }
}

/// Unique identifier for drawables.
pub type ShapeId = Uuid;

/// The kinds of object a user can place on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Text,
    Freehand,
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Local geometry of a shape variant.
///
/// Local coordinates put the origin at the top-left of the shape's unscaled
/// box; the owning [`Drawable`] maps them into the scene.
pub trait ShapeTrait {
    /// The variant tag.
    fn kind(&self) -> ShapeKind;

    /// Unscaled size of the local box.
    fn size(&self) -> Size;

    /// Outline in local coordinates.
    fn to_path(&self) -> BezPath;

    /// Closed shapes take the fill color; open ones are stroked.
    fn is_closed(&self) -> bool {
        true
    }

    /// Check if a local point hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;
}

/// Closed set of shape variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Line(Line),
    Text(Text),
    Freehand(Freehand),
}

impl Shape {
    fn geometry(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Line(s) => s,
            Shape::Text(s) => s,
            Shape::Freehand(s) => s,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry().kind()
    }

    pub fn size(&self) -> Size {
        self.geometry().size()
    }

    pub fn to_path(&self) -> BezPath {
        self.geometry().to_path()
    }

    pub fn is_closed(&self) -> bool {
        self.geometry().is_closed()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.geometry().hit_test(point, tolerance)
    }

    /// Get the text if this shape is a text box.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get the mutable text if this shape is a text box.
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

/// A shape placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    pub(crate) id: ShapeId,
    /// Left edge of the local box in scene coordinates.
    pub left: f64,
    /// Top edge of the local box in scene coordinates.
    pub top: f64,
    /// Horizontal scale applied to the local geometry.
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    /// Vertical scale applied to the local geometry.
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    /// Style properties.
    pub style: ShapeStyle,
    /// Variant geometry.
    pub shape: Shape,
}

impl Drawable {
    /// Place a shape with its local origin at `origin`.
    pub fn new(shape: Shape, origin: Point, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            left: origin.x,
            top: origin.y,
            scale_x: 1.0,
            scale_y: 1.0,
            style,
            shape,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Top-left corner in scene coordinates.
    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Local-to-scene transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.left, self.top))
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Bounding box in scene coordinates.
    pub fn bounds(&self) -> Rect {
        self.transform()
            .transform_rect_bbox(self.shape.size().to_rect())
    }

    /// Outline in scene coordinates.
    pub fn to_path(&self) -> BezPath {
        self.transform() * self.shape.to_path()
    }

    /// Check if a scene point hits this drawable.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.scale_x.abs() < f64::EPSILON || self.scale_y.abs() < f64::EPSILON {
            return false;
        }
        let local = self.transform().inverse() * point;
        let scale = self.scale_x.abs().min(self.scale_y.abs());
        let tolerance = tolerance / scale + self.style.stroke_width / 2.0;
        self.shape.hit_test(local, tolerance)
    }

    /// Multiply position and scale by per-axis factors (viewport rescale).
    pub fn rescale(&mut self, sx: f64, sy: f64) {
        self.left *= sx;
        self.top *= sy;
        self.scale_x *= sx;
        self.scale_y *= sy;
    }

    /// Scale about a fixed scene point, keeping scale above [`MIN_SCALE`].
    pub fn scale_about(&mut self, anchor: Point, sx: f64, sy: f64) {
        let new_scale_x = (self.scale_x * sx).max(MIN_SCALE);
        let new_scale_y = (self.scale_y * sy).max(MIN_SCALE);
        let sx = new_scale_x / self.scale_x;
        let sy = new_scale_y / self.scale_y;
        self.left = anchor.x + (self.left - anchor.x) * sx;
        self.top = anchor.y + (self.top - anchor.y) * sy;
        self.scale_x = new_scale_x;
        self.scale_y = new_scale_y;
    }

    /// Apply a color the way the color picker does: fill for closed shapes and
    /// text, stroke for open paths.
    pub fn recolor(&mut self, color: SerializableColor) {
        if self.shape.is_closed() {
            self.style.fill = Some(color);
        } else {
            self.style.stroke = Some(color);
        }
    }
}
