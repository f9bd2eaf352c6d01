//! Pan and zoom of the editor view.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level of a freshly reset view.
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Lower zoom bound.
pub const MIN_ZOOM: f64 = 0.2;
/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 5.0;
/// Base of the exponential wheel zoom: one wheel unit scales by this factor.
pub const WHEEL_ZOOM_BASE: f64 = 0.999;

/// Maps scene coordinates to screen coordinates.
///
/// `screen = offset + scene * zoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen position of the scene origin.
    pub offset: Vec2,
    /// Current zoom level.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-scene transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom by `factor`, keeping `screen_point` fixed.
    /// Returns whether the zoom changed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        let anchor = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        let moved = self.world_to_screen(anchor);
        self.offset += screen_point - moved;
        true
    }

    /// Apply a wheel delta: zoom by `0.999^delta_y` about the pointer.
    pub fn zoom_by_wheel(&mut self, screen_point: Point, delta_y: f64) -> bool {
        self.zoom_at(screen_point, WHEEL_ZOOM_BASE.powf(delta_y))
    }

    /// Back to identity.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The part of the scene visible through a viewport of `viewport` pixels.
    pub fn visible_world_rect(&self, viewport: Size) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(viewport.width, viewport.height));
        Rect::from_points(top_left, bottom_right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let camera = Camera::new();
        let p = Point::new(100.0, 200.0);
        let world = camera.screen_to_world(p);
        assert!((world.x - p.x).abs() < f64::EPSILON);
        assert!((world.y - p.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset_and_zoom() {
        let camera = Camera {
            offset: Vec2::new(50.0, 100.0),
            zoom: 2.0,
        };
        let world = camera.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_zoom_keeps_pointer_fixed() {
        let mut camera = Camera::new();
        let pointer = Point::new(400.0, 300.0);
        let before = camera.screen_to_world(pointer);
        assert!(camera.zoom_by_wheel(pointer, -200.0));
        assert!(camera.zoom > 1.0);
        let after = camera.screen_to_world(pointer);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_by_wheel(Point::ZERO, 100_000.0);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
        camera.zoom_by_wheel(Point::ZERO, -100_000.0);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
        // Already at the bound: nothing changes.
        assert!(!camera.zoom_by_wheel(Point::ZERO, -10.0));
    }

    #[test]
    fn test_visible_world_rect() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(-100.0, 0.0));
        camera.zoom = 2.0;
        let visible = camera.visible_world_rect(Size::new(800.0, 600.0));
        assert!((visible.x0 - 50.0).abs() < 1e-9);
        assert!((visible.width() - 400.0).abs() < 1e-9);
        assert!((visible.height() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        camera.zoom = 3.0;
        camera.reset();
        assert_eq!(camera, Camera::default());
    }
}
