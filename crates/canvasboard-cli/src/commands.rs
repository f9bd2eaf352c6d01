//! Command implementations, generic over the bridge and output sink.

use canvasboard_core::persistence::{PersistenceBridge, PersistenceError, SaveRequest};
use canvasboard_core::scene::{Scene, SceneError};
use canvasboard_render::{RenderError, render_png, to_data_url};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("missing {0}; set it with a flag or environment variable")]
    MissingIdentity(&'static str),
    #[error("export needs --file or --id")]
    NoSource,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

pub(crate) fn write_line(out: &mut impl Write, line: &str) -> CliResult<()> {
    writeln!(out, "{line}")?;
    Ok(())
}

pub(crate) fn read_scene(path: &Path) -> CliResult<Scene> {
    let json = std::fs::read_to_string(path)?;
    Ok(Scene::from_json(&json)?)
}

pub(crate) async fn fetch_scene(bridge: &PersistenceBridge, id: Uuid) -> CliResult<Scene> {
    let document = bridge.load(id).await?;
    log::info!("loaded canvas '{}' ({})", document.name, document.id);
    Ok(Scene::from_json(&document.canvas_data)?)
}

pub(crate) async fn list(bridge: &PersistenceBridge, out: &mut impl Write) -> CliResult<()> {
    let documents = bridge.list().await?;
    if documents.is_empty() {
        return write_line(out, "No saved canvases");
    }
    for doc in documents {
        write_line(
            out,
            &format!("{}  {}  {}", doc.id, doc.created_at.format("%Y-%m-%d %H:%M"), doc.name),
        )?;
    }
    Ok(())
}

pub(crate) async fn save(
    bridge: &PersistenceBridge,
    scene: &Scene,
    name: &str,
    out: &mut impl Write,
) -> CliResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PersistenceError::Validation("Canvas name is required".into()).into());
    }
    let request = SaveRequest {
        name: name.to_string(),
        canvas_data: scene.to_json()?,
    };
    let document = bridge.save(request).await?;
    write_line(out, &format!("Saved '{}' as {}", document.name, document.id))
}

pub(crate) fn export(scene: &Scene, out: &Path, scale: f64, data_url: bool) -> CliResult<()> {
    let png = render_png(scene, scale)?;
    if data_url {
        std::fs::write(out, to_data_url(&png))?;
    } else {
        std::fs::write(out, &png)?;
    }
    log::info!("exported {} objects at scale {scale} to {}", scene.len(), out.display());
    Ok(())
}
