//! Canvasboard Core Library
//!
//! Editor session, scene store and persistence bridge for the Canvasboard
//! drawing tool. Rendering and the storage server live in sibling crates.

pub mod camera;
pub mod config;
pub mod editor;
pub mod input;
pub mod persistence;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod text_edit;
pub mod tools;
pub mod view_sync;

pub use camera::Camera;
pub use config::ClientConfig;
pub use editor::{EditorEvent, EditorSession};
pub use input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use persistence::{
    CanvasApi, CanvasDocument, IdentityProvider, PersistenceBridge, PersistenceError,
    PersistenceResult, SaveDialog,
};
pub use scene::{Scene, SceneError};
pub use selection::Selection;
pub use shapes::{Drawable, SerializableColor, Shape, ShapeId, ShapeKind, ShapeStyle};
pub use tools::ToolMode;
pub use view_sync::{PreviewFrame, PreviewJob, PreviewRasterizer};
