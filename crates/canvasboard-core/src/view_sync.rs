//! Keeps the overview preview and the cached snapshot in step with the scene.

use crate::camera::Camera;
use crate::scene::{Scene, SceneResult};

/// Scale of the overview preview relative to the scene.
pub const PREVIEW_SCALE: f64 = 0.15;

/// A request to rasterize the scene as of `revision`, seen through `camera`.
#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub revision: u64,
    pub scene: Scene,
    pub camera: Camera,
    pub scale: f64,
}

/// A rasterized preview, RGBA8 with straight alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFrame {
    pub revision: u64,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Turns preview jobs into frames. Implemented outside the core crate.
pub trait PreviewRasterizer {
    type Error: std::error::Error;

    fn rasterize(&self, job: &PreviewJob) -> Result<PreviewFrame, Self::Error>;
}

/// Revision tracking for derived views of the scene.
///
/// `revision` moves on every scene edit and every pan or zoom; `edits` only
/// on scene edits.
#[derive(Debug, Default)]
pub struct ViewSync {
    revision: u64,
    edits: u64,
    snapshot: Option<String>,
    /// Latest revision a preview job was handed out for.
    requested: Option<u64>,
    displayed: Option<PreviewFrame>,
}

impl ViewSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current preview revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of scene mutations so far.
    pub fn edits(&self) -> u64 {
        self.edits
    }

    /// Record a scene mutation.
    pub fn mark_changed(&mut self) {
        self.revision += 1;
        self.edits += 1;
        self.snapshot = None;
    }

    /// Record a pan or zoom. The cached snapshot stays valid.
    pub fn mark_view_changed(&mut self) {
        self.revision += 1;
    }

    /// Serialized scene, regenerated only after a mutation.
    pub fn snapshot(&mut self, scene: &Scene) -> SceneResult<&str> {
        let json = match self.snapshot.take() {
            Some(json) => json,
            None => scene.to_json()?,
        };
        Ok(self.snapshot.insert(json).as_str())
    }

    /// Whether a cached snapshot is available without re-serializing.
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The displayed preview lags behind the scene.
    pub fn is_preview_stale(&self) -> bool {
        self.displayed_revision() < self.revision
    }

    fn displayed_revision(&self) -> u64 {
        self.displayed.as_ref().map_or(0, |frame| frame.revision)
    }

    /// Hand out a job for the current revision unless one was already issued.
    pub fn pending_preview(&mut self, scene: &Scene, camera: &Camera) -> Option<PreviewJob> {
        if !self.is_preview_stale() || self.requested == Some(self.revision) {
            return None;
        }
        self.requested = Some(self.revision);
        Some(PreviewJob {
            revision: self.revision,
            scene: scene.clone(),
            camera: camera.clone(),
            scale: PREVIEW_SCALE,
        })
    }

    /// Install a finished frame if it is newer than the one on display.
    pub fn accept_preview(&mut self, frame: PreviewFrame) -> bool {
        if frame.revision <= self.displayed_revision() || frame.revision > self.revision {
            log::debug!("dropping out-of-order preview for revision {}", frame.revision);
            return false;
        }
        self.displayed = Some(frame);
        true
    }

    /// Preview currently on display.
    pub fn preview(&self) -> Option<&PreviewFrame> {
        self.displayed.as_ref()
    }
}
