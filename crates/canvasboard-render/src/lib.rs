//! Canvasboard Render Library
//!
//! Scene export to SVG and raster previews through `resvg`.

mod preview;
mod svg;

pub use preview::{ResvgRasterizer, encode_png, render_png, to_data_url};
pub use svg::{scene_to_svg, scene_view_to_svg};

use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG could not be parsed: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
