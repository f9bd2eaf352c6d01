//! Text box shape.

use super::{ShapeKind, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// A fixed-width text box. Lines wrap at `width`; height grows with content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// The text content.
    pub content: String,
    /// Wrap width in local units.
    pub width: f64,
    /// Font size in pixels.
    pub font_size: f64,
}

impl Text {
    /// Placeholder content for freshly created text boxes.
    pub const PLACEHOLDER: &'static str = "Type here";
    /// Default wrap width.
    pub const DEFAULT_WIDTH: f64 = 200.0;
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.16;
    /// Average glyph advance as a multiple of the font size.
    const CHAR_WIDTH_FACTOR: f64 = 0.55;

    /// Create a new text box.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            width: Self::DEFAULT_WIDTH,
            font_size: Self::DEFAULT_FONT_SIZE,
        }
    }

    /// Create a text box holding the placeholder content.
    pub fn placeholder() -> Self {
        Self::new(Self::PLACEHOLDER)
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of visual lines after wrapping.
    pub fn line_count(&self) -> usize {
        let per_line = ((self.width / (self.font_size * Self::CHAR_WIDTH_FACTOR)).floor()
            as usize)
            .max(1);
        // split('\n') keeps the trailing empty line after a final newline.
        self.content
            .split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum()
    }

    fn as_rect(&self) -> Rect {
        self.size().to_rect()
    }
}

impl ShapeTrait for Text {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Text
    }

    fn size(&self) -> Size {
        Size::new(
            self.width,
            self.line_count() as f64 * self.font_size * Self::LINE_HEIGHT,
        )
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
    fn test_placeholder_defaults() {
        let text = Text::placeholder();
        assert_eq!(text.content(), "Type here");
        assert!((text.width - 200.0).abs() < f64::EPSILON);
        assert!((text.font_size - 24.0).abs() < f64::EPSILON);
        assert_eq!(text.line_count(), 1);
    }

    #[test]
    fn test_height_grows_with_lines() {
        let one = Text::new("hello");
        let two = Text::new("hello\nworld");
        let trailing = Text::new("hello\n");
        assert_eq!(two.line_count(), 2);
        assert_eq!(trailing.line_count(), 2);
        assert!(two.size().height > one.size().height);
    }

    #[test]
    fn test_long_line_wraps() {
        let text = Text::new("x".repeat(40));
        assert!(text.line_count() > 1);
    }
}
