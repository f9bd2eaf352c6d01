//! Tool mode and in-progress gesture state.

use crate::selection::Manipulation;
use crate::shapes::ShapeKind;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Stroke width of pen strokes and lines.
pub const PEN_WIDTH: f64 = 3.0;

/// Available tool modes. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolMode {
    /// Selection and dragging of existing objects.
    #[default]
    None,
    /// Plain drag pans the view.
    Move,
    /// A shape button in the toolbar is active.
    Shape(ShapeKind),
    /// Drag draws freehand strokes.
    Pen,
    /// Text placement.
    Text,
}

/// What the current pointer drag is doing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pen drag; points in scene coordinates.
    Stroking { points: Vec<Point> },
    /// View pan; last pointer position in screen coordinates.
    Panning { last: Point },
    /// Moving or resizing selected objects.
    Manipulating { manipulation: Manipulation, changed: bool },
}

/// Manages the current tool and its gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    mode: ToolMode,
    gesture: Gesture,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Switch tool. The previous gesture is suspended; a pen stroke with at
    /// least two points is handed back so the caller can commit it.
    pub fn set_tool(&mut self, mode: ToolMode) -> Option<Vec<Point>> {
        let finished = self.end_gesture();
        if self.mode != mode {
            log::debug!("tool {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        finished
    }

    /// Toolbar toggle: activating the active tool turns it off.
    pub fn toggle_tool(&mut self, mode: ToolMode) -> Option<Vec<Point>> {
        let next = if self.mode == mode { ToolMode::None } else { mode };
        self.set_tool(next)
    }

    /// End whatever gesture is running. Returns a finished pen stroke, if any.
    pub fn end_gesture(&mut self) -> Option<Vec<Point>> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Stroking { points } if points.len() >= 2 => Some(points),
            Gesture::Stroking { .. } => {
                log::debug!("discarding single-point stroke");
                None
            }
            _ => None,
        }
    }

    /// Start a pen stroke.
    pub fn begin_stroke(&mut self, point: Point) {
        self.gesture = Gesture::Stroking {
            points: vec![point],
        };
    }

    /// Add a point to the running stroke.
    pub fn extend_stroke(&mut self, point: Point) {
        if let Gesture::Stroking { points } = &mut self.gesture {
            if points.last() != Some(&point) {
                points.push(point);
            }
        }
    }

    /// Points of the stroke in progress.
    pub fn stroke_points(&self) -> &[Point] {
        match &self.gesture {
            Gesture::Stroking { points } => points,
            _ => &[],
        }
    }

    /// Start panning from a screen position.
    pub fn begin_pan(&mut self, screen: Point) {
        self.gesture = Gesture::Panning { last: screen };
    }

    /// Advance the pan; returns the screen delta since the last call.
    pub fn pan_to(&mut self, screen: Point) -> Option<Vec2> {
        match &mut self.gesture {
            Gesture::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                Some(delta)
            }
            _ => None,
        }
    }

    /// Start dragging selected objects.
    pub fn begin_manipulation(&mut self, manipulation: Manipulation) {
        self.gesture = Gesture::Manipulating {
            manipulation,
            changed: false,
        };
    }

    /// The drag in progress, marking it as having changed the scene.
    pub fn manipulation_mut(&mut self) -> Option<&Manipulation> {
        match &mut self.gesture {
            Gesture::Manipulating {
                manipulation,
                changed,
            } => {
                *changed = true;
                Some(manipulation)
            }
            _ => None,
        }
    }

    /// Whether the running drag has moved anything.
    pub fn manipulation_changed(&self) -> bool {
        matches!(self.gesture, Gesture::Manipulating { changed: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_tool() {
        let mut tools = ToolManager::new();
        tools.toggle_tool(ToolMode::Pen);
        assert_eq!(tools.mode(), ToolMode::Pen);
        tools.toggle_tool(ToolMode::Pen);
        assert_eq!(tools.mode(), ToolMode::None);
        tools.toggle_tool(ToolMode::Move);
        tools.toggle_tool(ToolMode::Shape(ShapeKind::Circle));
        assert_eq!(tools.mode(), ToolMode::Shape(ShapeKind::Circle));
    }

    #[test]
    fn test_switching_away_finalizes_stroke() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolMode::Pen);
        tools.begin_stroke(Point::new(0.0, 0.0));
        tools.extend_stroke(Point::new(5.0, 5.0));
        tools.extend_stroke(Point::new(10.0, 5.0));

        let stroke = tools.set_tool(ToolMode::Move).unwrap();
        assert_eq!(stroke.len(), 3);
        assert!(!tools.is_active());
    }

    #[test]
    fn test_single_point_stroke_discarded() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolMode::Pen);
        tools.begin_stroke(Point::new(1.0, 1.0));
        tools.extend_stroke(Point::new(1.0, 1.0));
        assert!(tools.end_gesture().is_none());
        assert!(!tools.is_active());
    }

    #[test]
    fn test_pan_deltas() {
        let mut tools = ToolManager::new();
        tools.begin_pan(Point::new(10.0, 10.0));
        assert_eq!(tools.pan_to(Point::new(15.0, 30.0)), Some(Vec2::new(5.0, 20.0)));
        assert_eq!(tools.pan_to(Point::new(15.0, 31.0)), Some(Vec2::new(0.0, 1.0)));
        tools.end_gesture();
        assert_eq!(tools.pan_to(Point::new(0.0, 0.0)), None);
    }
}
