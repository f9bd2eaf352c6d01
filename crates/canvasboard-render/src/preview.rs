//! Raster previews of a scene.

use crate::svg::scene_view_to_svg;
use crate::{RenderError, RenderResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use canvasboard_core::Scene;
use canvasboard_core::view_sync::{PreviewFrame, PreviewJob, PreviewRasterizer};
use kurbo::Affine;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree, fontdb};
use std::fmt;
use std::sync::Arc;

/// Families tried, in order, for the generic `sans-serif` font.
const SANS_SERIF_CANDIDATES: [&str; 6] = [
    "Arial",
    "Helvetica",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "FreeSans",
];

/// Rasterizes scenes with `resvg`, using the system fonts for text.
#[derive(Clone)]
pub struct ResvgRasterizer {
    options: Arc<Options<'static>>,
}

impl fmt::Debug for ResvgRasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResvgRasterizer")
            .field("font_faces", &self.font_count())
            .finish()
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        let mut options = Options::default();
        let fonts = options.fontdb_mut();
        fonts.load_system_fonts();
        set_generic_families(fonts);
        log::debug!("loaded {} font faces", fonts.len());
        Self {
            options: Arc::new(options),
        }
    }

    /// Number of font faces available for text.
    pub fn font_count(&self) -> usize {
        self.options.fontdb.len()
    }

    /// Render a scene at `scale`, returning width, height and straight-alpha RGBA8.
    pub fn render_rgba(&self, scene: &Scene, scale: f64) -> RenderResult<(u32, u32, Vec<u8>)> {
        self.render_view_rgba(scene, Affine::IDENTITY, scale)
    }

    /// Render a scene through a view transform, then scale the result.
    pub fn render_view_rgba(
        &self,
        scene: &Scene,
        view: Affine,
        scale: f64,
    ) -> RenderResult<(u32, u32, Vec<u8>)> {
        let svg = scene_view_to_svg(scene, view);
        let tree = Tree::from_str(&svg, &self.options)?;

        let width = (scene.width * scale).ceil().max(1.0) as u32;
        let height = (scene.height * scale).ceil().max(1.0) as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })?;
        resvg::render(
            &tree,
            Transform::from_scale(scale as f32, scale as f32),
            &mut pixmap.as_mut(),
        );

        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Ok((width, height, rgba))
    }
}

impl PreviewRasterizer for ResvgRasterizer {
    type Error = RenderError;

    fn rasterize(&self, job: &PreviewJob) -> RenderResult<PreviewFrame> {
        let (width, height, rgba) =
            self.render_view_rgba(&job.scene, job.camera.transform(), job.scale)?;
        log::debug!("rasterized revision {} at {width}x{height}", job.revision);
        Ok(PreviewFrame {
            revision: job.revision,
            width,
            height,
            rgba,
        })
    }
}

/// Encode RGBA8 pixels as PNG.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}

/// Render a scene straight to PNG bytes.
pub fn render_png(scene: &Scene, scale: f64) -> RenderResult<Vec<u8>> {
    let (width, height, rgba) = ResvgRasterizer::new().render_rgba(scene, scale)?;
    encode_png(&rgba, width, height)
}

/// Point the generic `sans-serif` and `serif` families at an installed face,
/// since usvg falls back to them when a named family is missing.
fn set_generic_families(fonts: &mut fontdb::Database) {
    let db: &fontdb::Database = fonts;
    let installed = |name: &str| {
        db.query(&fontdb::Query {
            families: &[fontdb::Family::Name(name)],
            ..fontdb::Query::default()
        })
        .is_some()
    };
    let family = SANS_SERIF_CANDIDATES
        .into_iter()
        .find(|name| installed(*name))
        .map(str::to_string)
        .or_else(|| {
            db.faces()
                .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        });
    if let Some(family) = family {
        fonts.set_sans_serif_family(family.clone());
        fonts.set_serif_family(family);
    }
}

/// Wrap PNG bytes in a `data:` URL.
pub fn to_data_url(png_data: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_data))
}
