//! Scene to SVG.

use canvasboard_core::Scene;
use canvasboard_core::shapes::{Drawable, SerializableColor, Shape, Text};
use kurbo::Affine;
use std::fmt::Write;

fn paint(out: &mut String, attr: &str, color: Option<SerializableColor>) {
    match color {
        Some(c) if c.a > 0 => {
            let _ = write!(out, r##" {attr}="#{:02x}{:02x}{:02x}""##, c.r, c.g, c.b);
            if c.a < 255 {
                let _ = write!(out, r#" {attr}-opacity="{:.3}""#, f64::from(c.a) / 255.0);
            }
        }
        _ => {
            let _ = write!(out, r#" {attr}="none""#);
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn write_text(out: &mut String, text: &Text, color: Option<SerializableColor>) {
    let _ = write!(
        out,
        r#"<text font-family="sans-serif" font-size="{}""#,
        text.font_size
    );
    paint(out, "fill", color);
    out.push('>');
    let line_height = text.font_size * Text::LINE_HEIGHT;
    for (i, line) in text.content.split('\n').enumerate() {
        let _ = write!(
            out,
            r#"<tspan x="0" y="{}">{}</tspan>"#,
            text.font_size + line_height * i as f64,
            escape(line)
        );
    }
    out.push_str("</text>");
}

fn write_drawable(out: &mut String, drawable: &Drawable) {
    let [a, b, c, d, e, f] = drawable.transform().as_coeffs();
    let _ = write!(out, r#"<g transform="matrix({a} {b} {c} {d} {e} {f})">"#);
    match &drawable.shape {
        Shape::Text(text) => write_text(out, text, drawable.style.fill),
        shape => {
            let _ = write!(out, r#"<path d="{}""#, shape.to_path().to_svg());
            if shape.is_closed() {
                paint(out, "fill", drawable.style.fill);
            } else {
                out.push_str(r#" fill="none" stroke-linecap="round" stroke-linejoin="round""#);
            }
            paint(out, "stroke", drawable.style.stroke);
            if drawable.style.stroke.is_some() {
                let _ = write!(out, r#" stroke-width="{}""#, drawable.style.stroke_width);
            }
            out.push_str("/>");
        }
    }
    out.push_str("</g>");
}

/// Render a scene as a standalone SVG document in scene units.
pub fn scene_to_svg(scene: &Scene) -> String {
    scene_view_to_svg(scene, Affine::IDENTITY)
}

/// Like [`scene_to_svg`], with the objects placed through a view transform
/// (pan and zoom). The background always covers the whole document.
pub fn scene_view_to_svg(scene: &Scene, view: Affine) -> String {
    let (w, h) = (scene.width.max(1.0), scene.height.max(1.0));
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    out.push_str(r#"<rect x="0" y="0" width="100%" height="100%""#);
    paint(&mut out, "fill", Some(scene.background));
    out.push_str("/>");
    let viewed = view != Affine::IDENTITY;
    if viewed {
        let [a, b, c, d, e, f] = view.as_coeffs();
        let _ = write!(out, r#"<g transform="matrix({a} {b} {c} {d} {e} {f})">"#);
    }
    for drawable in scene.ordered() {
        write_drawable(&mut out, drawable);
    }
    if viewed {
        out.push_str("</g>");
    }
    out.push_str("</svg>");
    out
}
