//! The editor session: owns the live scene and turns input into edits.

use crate::camera::Camera;
use crate::input::{Key, KeyEvent, MouseButton, PointerEvent};
use crate::persistence::{
    CanvasDocument, LoadTicket, PersistenceError, PersistenceResult, SaveDialog, SaveRequest,
};
use crate::scene::{Scene, SceneResult};
use crate::selection::{HANDLE_HIT_TOLERANCE, Manipulation, Selection, hit_test_corners};
use crate::shapes::{
    Circle, Drawable, Freehand, Line, Rectangle, SerializableColor, Shape, ShapeId, ShapeKind,
    ShapeStyle, Text, Triangle,
};
use crate::text_edit::{EditOutcome, TextEditState};
use crate::tools::{PEN_WIDTH, ToolManager, ToolMode};
use crate::view_sync::{PreviewFrame, PreviewJob, ViewSync};
use kurbo::{Point, Rect, Size};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Object hit tolerance in screen pixels.
pub const HIT_TOLERANCE: f64 = 4.0;
/// Circle radius for new circles.
pub const CIRCLE_RADIUS: f64 = 50.0;
/// Side of new triangles.
pub const TRIANGLE_SIZE: f64 = 100.0;
/// Horizontal and vertical extent of new lines.
pub const LINE_SPAN: f64 = 150.0;

/// Notifications for the host, drained with [`EditorSession::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SelectionChanged(Selection),
    ObjectAdded(ShapeId),
    ObjectRemoved(ShapeId),
    ObjectModified(ShapeId),
    BackgroundChanged(SerializableColor),
    ViewportResized(Size),
    /// Pan or zoom changed.
    ViewChanged,
    TextEditingStarted(ShapeId),
    TextEditingEnded(ShapeId),
    /// A loaded document replaced the scene.
    SceneReplaced(Uuid),
    Saved(Uuid),
    /// A save or load failed; the message is also kept in `last_error`.
    Error(String),
}

/// One open canvas.
#[derive(Debug)]
pub struct EditorSession {
    scene: Scene,
    camera: Camera,
    tools: ToolManager,
    selection: Selection,
    color: SerializableColor,
    viewport: Size,
    rng: StdRng,
    view_sync: ViewSync,
    save_dialog: SaveDialog,
    text_edit: Option<TextEditState>,
    alive: bool,
    load_seq: u64,
    dirty: bool,
    /// Edit count captured by the save in flight.
    save_edits: Option<u64>,
    document_id: Option<Uuid>,
    events: Vec<EditorEvent>,
    last_error: Option<String>,
}

impl EditorSession {
    /// Create a session whose scene matches the viewport.
    pub fn new(viewport: Size) -> Self {
        Self::with_rng(viewport, StdRng::from_os_rng())
    }

    /// Same as [`EditorSession::new`] with deterministic placement.
    pub fn with_seed(viewport: Size, seed: u64) -> Self {
        Self::with_rng(viewport, StdRng::seed_from_u64(seed))
    }

    fn with_rng(viewport: Size, rng: StdRng) -> Self {
        Self {
            scene: Scene::new(viewport.width, viewport.height),
            camera: Camera::new(),
            tools: ToolManager::new(),
            selection: Selection::None,
            color: SerializableColor::black(),
            viewport,
            rng,
            view_sync: ViewSync::new(),
            save_dialog: SaveDialog::Closed,
            text_edit: None,
            alive: true,
            load_seq: 0,
            dirty: false,
            save_edits: None,
            document_id: None,
            events: Vec::new(),
            last_error: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tool(&self) -> ToolMode {
        self.tools.mode()
    }

    /// Points of the pen stroke being drawn, for live feedback.
    pub fn stroke_in_progress(&self) -> &[Point] {
        self.tools.stroke_points()
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn text_editing(&self) -> Option<&TextEditState> {
        self.text_edit.as_ref()
    }

    pub fn save_dialog(&self) -> &SaveDialog {
        &self.save_dialog
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Id of the document last saved or loaded.
    pub fn document_id(&self) -> Option<Uuid> {
        self.document_id
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    /// Record a scene mutation.
    fn touched(&mut self) {
        self.view_sync.mark_changed();
        self.dirty = true;
    }

    fn set_selection(&mut self, selection: Selection) {
        if self.selection != selection {
            self.selection = selection;
            self.emit(EditorEvent::SelectionChanged(self.selection.clone()));
        }
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::None);
    }

    /// Select one object. Ignored if the id is not in the scene.
    pub fn select(&mut self, id: ShapeId) {
        if self.scene.contains(id) {
            self.set_selection(Selection::Single(id));
        }
    }

    // ---- tools ----

    /// Activate a tool, suspending the previous tool's gesture.
    pub fn set_tool(&mut self, mode: ToolMode) {
        self.end_text_editing();
        if let Some(points) = self.tools.set_tool(mode) {
            self.commit_stroke(&points);
        }
    }

    /// Toolbar semantics: activating the active tool turns it off.
    pub fn toggle_tool(&mut self, mode: ToolMode) {
        self.end_text_editing();
        if let Some(points) = self.tools.toggle_tool(mode) {
            self.commit_stroke(&points);
        }
    }

    /// Set the active color and apply it to the selection or the background.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color;
        match self.selection.clone() {
            Selection::Background => {
                self.scene.background = color;
                self.touched();
                self.emit(EditorEvent::BackgroundChanged(color));
            }
            Selection::None => {}
            selection => {
                for id in selection.ids() {
                    if let Some(drawable) = self.scene.get_mut(id) {
                        drawable.recolor(color);
                        self.emit(EditorEvent::ObjectModified(id));
                    }
                }
                self.touched();
            }
        }
    }

    // ---- creation ----

    fn visible_rect(&self) -> Rect {
        self.camera.visible_world_rect(self.viewport)
    }

    fn build(&self, kind: ShapeKind, visible: Rect) -> Option<(Shape, ShapeStyle)> {
        let fill = ShapeStyle::filled(self.color);
        let built = match kind {
            ShapeKind::Rectangle => (
                Shape::Rectangle(Rectangle::new(visible.width() / 4.0, visible.height() / 4.0)),
                fill,
            ),
            ShapeKind::Circle => (Shape::Circle(Circle::new(CIRCLE_RADIUS)), fill),
            ShapeKind::Triangle => (
                Shape::Triangle(Triangle::new(TRIANGLE_SIZE, TRIANGLE_SIZE)),
                fill,
            ),
            ShapeKind::Line => (
                Shape::Line(Line::new(Point::ZERO, Point::new(LINE_SPAN, LINE_SPAN))),
                ShapeStyle::stroked(self.color, PEN_WIDTH),
            ),
            ShapeKind::Text => (Shape::Text(Text::placeholder()), fill),
            ShapeKind::Freehand => return None,
        };
        Some(built)
    }

    /// Place a new object and select it. With `at`, the object is centered on
    /// that scene point; otherwise the position is random. Either way it lies
    /// inside the visible part of the scene whenever it fits.
    fn place(&mut self, kind: ShapeKind, at: Option<Point>) -> Option<ShapeId> {
        let visible = self.visible_rect();
        let (shape, style) = self.build(kind, visible)?;
        let size = shape.size();
        let slack_x = (visible.width() - size.width).max(0.0);
        let slack_y = (visible.height() - size.height).max(0.0);
        let origin = match at {
            Some(center) => Point::new(
                (center.x - size.width / 2.0).clamp(visible.x0, visible.x0 + slack_x),
                (center.y - size.height / 2.0).clamp(visible.y0, visible.y0 + slack_y),
            ),
            None => Point::new(
                visible.x0 + self.rng.random_range(0.0..=slack_x),
                visible.y0 + self.rng.random_range(0.0..=slack_y),
            ),
        };
        let id = self.scene.add(Drawable::new(shape, origin, style));
        log::debug!("added {kind:?} {id} at ({:.1}, {:.1})", origin.x, origin.y);
        self.touched();
        self.emit(EditorEvent::ObjectAdded(id));
        self.set_selection(Selection::Single(id));
        Some(id)
    }

    /// Add an object of the given kind at a random visible position.
    /// Freehand strokes are only created by drawing; returns `None` for them.
    pub fn add_shape(&mut self, kind: ShapeKind) -> Option<ShapeId> {
        self.end_text_editing();
        self.place(kind, None)
    }

    pub fn add_rectangle(&mut self) -> Option<ShapeId> {
        self.add_shape(ShapeKind::Rectangle)
    }

    pub fn add_circle(&mut self) -> Option<ShapeId> {
        self.add_shape(ShapeKind::Circle)
    }

    pub fn add_triangle(&mut self) -> Option<ShapeId> {
        self.add_shape(ShapeKind::Triangle)
    }

    pub fn add_line(&mut self) -> Option<ShapeId> {
        self.add_shape(ShapeKind::Line)
    }

    pub fn add_text(&mut self) -> Option<ShapeId> {
        self.add_shape(ShapeKind::Text)
    }

    fn commit_stroke(&mut self, points: &[Point]) {
        let Some((stroke, origin)) = Freehand::from_points(points) else {
            return;
        };
        let drawable = Drawable::new(
            Shape::Freehand(stroke),
            origin,
            ShapeStyle::stroked(self.color, PEN_WIDTH),
        );
        let id = self.scene.add(drawable);
        log::debug!("committed stroke {id} with {} points", points.len());
        self.touched();
        self.emit(EditorEvent::ObjectAdded(id));
    }

    // ---- removal ----

    /// Remove one object, pruning it from the selection.
    pub fn remove_object(&mut self, id: ShapeId) -> bool {
        if self.scene.remove(id).is_none() {
            return false;
        }
        if self.text_edit.as_ref().is_some_and(|edit| edit.target() == id) {
            self.text_edit = None;
            self.emit(EditorEvent::TextEditingEnded(id));
        }
        self.touched();
        self.emit(EditorEvent::ObjectRemoved(id));
        if self.selection.prune(id) {
            self.emit(EditorEvent::SelectionChanged(self.selection.clone()));
        }
        true
    }

    /// Delete every selected object. Returns how many were removed.
    pub fn delete_selection(&mut self) -> usize {
        if !self.selection.is_deletable() {
            return 0;
        }
        let ids = self.selection.ids();
        let mut removed = 0;
        for id in ids {
            if self.scene.remove(id).is_some() {
                if self.text_edit.as_ref().is_some_and(|edit| edit.target() == id) {
                    self.text_edit = None;
                    self.emit(EditorEvent::TextEditingEnded(id));
                }
                self.emit(EditorEvent::ObjectRemoved(id));
                removed += 1;
            }
        }
        if removed > 0 {
            self.touched();
        }
        self.set_selection(Selection::None);
        log::debug!("deleted {removed} objects");
        removed
    }

    // ---- viewport ----

    /// Scale the scene by the ratio between the new and old viewport sizes.
    /// A gesture in progress is finished first, so a pending stroke is
    /// rescaled with the rest and a drag does not restore old positions.
    pub fn resize_viewport(&mut self, new_size: Size) {
        let old = self.viewport;
        if new_size.width <= 0.0 || new_size.height <= 0.0 {
            log::warn!("ignoring degenerate viewport size {new_size:?}");
            return;
        }
        self.finish_gesture();
        if old.width > 0.0 && old.height > 0.0 {
            let sx = new_size.width / old.width;
            let sy = new_size.height / old.height;
            self.scene.rescale(sx, sy);
            self.touched();
        }
        self.viewport = new_size;
        self.emit(EditorEvent::ViewportResized(new_size));
    }

    /// Reset pan and zoom.
    pub fn reset_view(&mut self) {
        if self.camera != Camera::default() {
            self.camera.reset();
            self.view_changed();
        }
    }

    // ---- input ----

    fn view_changed(&mut self) {
        self.view_sync.mark_view_changed();
        self.emit(EditorEvent::ViewChanged);
    }

    fn world_tolerance(&self, screen_px: f64) -> f64 {
        screen_px / self.camera.zoom
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers.shift, modifiers.ctrl),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } => self.finish_gesture(),
            PointerEvent::DoubleClick { position } => self.double_click(position),
            PointerEvent::Wheel { position, delta_y } => {
                if self.camera.zoom_by_wheel(position, delta_y) {
                    self.view_changed();
                }
            }
        }
    }

    fn pointer_down(&mut self, screen: Point, button: MouseButton, shift: bool, ctrl: bool) {
        let world = self.camera.screen_to_world(screen);

        if let Some(edit) = &self.text_edit {
            let inside = self
                .scene
                .get(edit.target())
                .is_some_and(|d| d.hit_test(world, self.world_tolerance(HIT_TOLERANCE)));
            if !inside {
                self.end_text_editing();
            } else {
                return;
            }
        }

        if button == MouseButton::Middle || ctrl || self.tools.mode() == ToolMode::Move {
            self.tools.begin_pan(screen);
            return;
        }
        if button != MouseButton::Left {
            return;
        }
        if self.tools.mode() == ToolMode::Pen {
            self.tools.begin_stroke(world);
            return;
        }

        if let Selection::Single(id) = self.selection {
            if let Some(drawable) = self.scene.get(id) {
                let tolerance = self.world_tolerance(HANDLE_HIT_TOLERANCE);
                if let Some(corner) = hit_test_corners(drawable.bounds(), world, tolerance) {
                    let manipulation = Manipulation::begin_resize(drawable, corner);
                    self.tools.begin_manipulation(manipulation);
                    return;
                }
            }
        }

        match self
            .scene
            .shape_at(world, self.world_tolerance(HIT_TOLERANCE))
        {
            Some(id) => {
                if shift {
                    let mut selection = self.selection.clone();
                    selection.extend_with(id);
                    self.set_selection(selection);
                } else if !self.selection.contains(id) {
                    self.set_selection(Selection::Single(id));
                }
                let ids = self.selection.ids();
                if let Some(manipulation) = Manipulation::begin_move(&self.scene, &ids, world) {
                    self.tools.begin_manipulation(manipulation);
                }
            }
            None => match self.tools.mode() {
                ToolMode::Shape(kind) => {
                    self.place(kind, Some(world));
                }
                ToolMode::Text => {
                    self.place(ShapeKind::Text, Some(world));
                }
                _ if !shift => self.clear_selection(),
                _ => {}
            },
        }
    }

    fn pointer_move(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        if !self.tools.stroke_points().is_empty() {
            self.tools.extend_stroke(world);
        } else if let Some(delta) = self.tools.pan_to(screen) {
            self.camera.pan(delta);
            self.view_changed();
        } else if let Some(manipulation) = self.tools.manipulation_mut() {
            manipulation.apply(&mut self.scene, world);
            self.view_sync.mark_changed();
            self.dirty = true;
        }
    }

    /// End the current gesture: commit a stroke, report moved objects.
    fn finish_gesture(&mut self) {
        let moved = if self.tools.manipulation_changed() {
            self.tools.manipulation_mut().map(Manipulation::targets)
        } else {
            None
        };
        if let Some(points) = self.tools.end_gesture() {
            self.commit_stroke(&points);
        }
        for id in moved.into_iter().flatten() {
            self.emit(EditorEvent::ObjectModified(id));
        }
    }

    fn double_click(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        match self
            .scene
            .shape_at(world, self.world_tolerance(HIT_TOLERANCE))
        {
            Some(id) => {
                self.tools.end_gesture();
                self.begin_text_editing(id);
            }
            None => {
                self.end_text_editing();
                self.set_selection(Selection::Background);
            }
        }
    }

    /// Enter editing on a text box with its content selected.
    /// Returns false if `id` is not a text box.
    pub fn begin_text_editing(&mut self, id: ShapeId) -> bool {
        let Some(text) = self.scene.get(id).and_then(|d| d.shape.as_text()) else {
            return false;
        };
        let edit = TextEditState::select_all(id, text);
        self.end_text_editing();
        self.set_selection(Selection::Single(id));
        self.text_edit = Some(edit);
        self.emit(EditorEvent::TextEditingStarted(id));
        true
    }

    /// Leave text editing, if active.
    pub fn end_text_editing(&mut self) {
        if let Some(edit) = self.text_edit.take() {
            self.emit(EditorEvent::TextEditingEnded(edit.target()));
        }
    }

    /// Dispatch a key press. Returns whether the key was consumed.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        if let Some(edit) = self.text_edit.as_mut() {
            let target = edit.target();
            let Some(text) = self.scene.get_mut(target).and_then(|d| d.shape.as_text_mut())
            else {
                self.text_edit = None;
                return false;
            };
            match edit.apply(text, &event.key) {
                EditOutcome::Changed => {
                    self.touched();
                    self.emit(EditorEvent::ObjectModified(target));
                }
                EditOutcome::Unchanged => {}
                EditOutcome::Exit => self.end_text_editing(),
            }
            return true;
        }

        match event.key {
            Key::Delete | Key::Backspace => {
                self.delete_selection();
                true
            }
            Key::Character('r') | Key::Character('R') => {
                self.reset_view();
                true
            }
            Key::Escape => {
                if let Some(points) = self.tools.end_gesture() {
                    self.commit_stroke(&points);
                }
                self.clear_selection();
                true
            }
            _ => false,
        }
    }

    // ---- view sync ----

    /// Serialized scene, cached until the next mutation.
    pub fn snapshot(&mut self) -> SceneResult<&str> {
        self.view_sync.snapshot(&self.scene)
    }

    /// A preview job for the current revision, if one is needed.
    pub fn pending_preview(&mut self) -> Option<PreviewJob> {
        self.view_sync.pending_preview(&self.scene, &self.camera)
    }

    /// Offer a finished preview; stale frames are dropped.
    pub fn accept_preview(&mut self, frame: PreviewFrame) -> bool {
        self.view_sync.accept_preview(frame)
    }

    pub fn preview(&self) -> Option<&PreviewFrame> {
        self.view_sync.preview()
    }

    pub fn revision(&self) -> u64 {
        self.view_sync.revision()
    }

    // ---- persistence ----

    pub fn open_save_dialog(&mut self) {
        self.save_dialog.open();
    }

    pub fn set_save_name(&mut self, name: impl Into<String>) {
        self.save_dialog.set_name(name);
    }

    pub fn cancel_save(&mut self) -> bool {
        self.save_dialog.cancel()
    }

    /// Submit the dialog: serialize the scene as it is now and hand back the
    /// request to send. Refused while another save is in flight.
    pub fn begin_save(&mut self) -> PersistenceResult<SaveRequest> {
        if !self.save_dialog.can_submit() {
            return Err(self
                .save_dialog
                .submit()
                .err()
                .unwrap_or_else(|| PersistenceError::Validation("Cannot save now".into())));
        }
        let canvas_data = self.snapshot()?.to_string();
        let name = self.save_dialog.submit()?;
        self.save_edits = Some(self.view_sync.edits());
        Ok(SaveRequest { name, canvas_data })
    }

    /// Apply the outcome of a save. The dialog closes either way. Edits made
    /// after `begin_save` are not part of the save and stay unsaved.
    pub fn finish_save(&mut self, result: PersistenceResult<CanvasDocument>) {
        self.save_dialog.finish();
        let saved_edits = self.save_edits.take();
        match result {
            Ok(document) => {
                log::info!("saved canvas '{}' as {}", document.name, document.id);
                if saved_edits == Some(self.view_sync.edits()) {
                    self.dirty = false;
                }
                self.last_error = None;
                self.document_id = Some(document.id);
                self.emit(EditorEvent::Saved(document.id));
            }
            Err(e) => self.report(e),
        }
    }

    /// Start loading a document. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self, canvas_id: Uuid) -> LoadTicket {
        self.load_seq += 1;
        LoadTicket {
            seq: self.load_seq,
            canvas_id,
        }
    }

    /// Apply a loaded document if the session is open and `ticket` is the
    /// latest. Returns whether the scene was replaced.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: PersistenceResult<CanvasDocument>,
    ) -> bool {
        if !self.alive {
            log::debug!("session closed, dropping load of {}", ticket.canvas_id);
            return false;
        }
        if ticket.seq != self.load_seq {
            log::debug!("stale load of {} ignored", ticket.canvas_id);
            return false;
        }
        let document = match result {
            Ok(document) => document,
            Err(e) => {
                self.report(e);
                return false;
            }
        };
        let mut scene = match Scene::from_json(&document.canvas_data) {
            Ok(scene) => scene,
            Err(e) => {
                self.report(e.into());
                return false;
            }
        };
        if let Some(points) = self.tools.end_gesture() {
            self.commit_stroke(&points);
        }
        self.end_text_editing();
        self.set_selection(Selection::None);
        // The live canvas keeps the session's dimensions.
        scene.width = self.viewport.width;
        scene.height = self.viewport.height;
        self.scene = scene;
        self.view_sync.mark_changed();
        self.dirty = false;
        self.last_error = None;
        self.document_id = Some(document.id);
        log::info!("loaded canvas '{}' ({} objects)", document.name, self.scene.len());
        self.emit(EditorEvent::SceneReplaced(document.id));
        true
    }

    fn report(&mut self, error: PersistenceError) {
        log::warn!("{error}");
        let message = error.to_string();
        self.last_error = Some(message.clone());
        self.emit(EditorEvent::Error(message));
    }

    /// Close the session. Late load results are ignored afterwards.
    pub fn close(&mut self) {
        self.alive = false;
        self.tools.end_gesture();
        self.text_edit = None;
    }
}
