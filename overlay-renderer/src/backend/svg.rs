//! SVG surface.
//!
//! Accumulates draw calls as SVG elements. The document's pixel size is the
//! backing store and its `viewBox` is the CSS box, so the uniform scale maps
//! one onto the other the same way a canvas transform does.

use std::fmt::Write;

use overlay_core::{BackingSize, CssPoint};

use super::Surface;
use crate::style::{BlendMode, CompositeStyle, FONT_FAMILY};
use crate::{BackendType, RenderResult};

/// Surface that produces an SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    backing: BackingSize,
    scale: f64,
    composite: CompositeStyle,
    background: Option<String>,
    body: String,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backing: BackingSize {
                width: 0,
                height: 0,
            },
            scale: 1.0,
            composite: CompositeStyle::NORMAL,
            background: None,
            body: String::with_capacity(4096),
        }
    }

    /// Show an image (URL or data URI) underneath the annotations.
    #[must_use]
    pub fn with_background(mut self, href: impl Into<String>) -> Self {
        self.background = Some(href.into());
        self
    }

    /// Finish the document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let BackingSize { width, height } = self.backing;
        let view_w = f64::from(width) / self.scale;
        let view_h = f64::from(height) / self.scale;

        let mut svg = String::with_capacity(self.body.len() + 512);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );
        if let Some(href) = &self.background {
            let _ = write!(
                svg,
                "<image href=\"{}\" x=\"0\" y=\"0\" width=\"{view_w}\" height=\"{view_h}\" preserveAspectRatio=\"none\"/>",
                escape_xml(href),
            );
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }

    fn composite_attrs(&self) -> String {
        let mut attrs = String::new();
        if (self.composite.alpha - 1.0).abs() > f64::EPSILON {
            let _ = write!(attrs, " opacity=\"{}\"", self.composite.alpha);
        }
        if self.composite.blend == BlendMode::Multiply {
            let _ = write!(attrs, " style=\"mix-blend-mode:{}\"", BlendMode::Multiply.css_name());
        }
        attrs
    }
}

impl Surface for SvgSurface {
    fn backend_type(&self) -> BackendType {
        BackendType::Svg
    }

    fn resize_backing(&mut self, size: BackingSize) -> RenderResult<()> {
        self.backing = size;
        self.scale = 1.0;
        self.composite = CompositeStyle::NORMAL;
        self.body.clear();
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) -> RenderResult<()> {
        self.scale = scale;
        Ok(())
    }

    fn clear(&mut self, _css_width: f64, _css_height: f64) -> RenderResult<()> {
        self.body.clear();
        Ok(())
    }

    fn set_composite(&mut self, style: CompositeStyle) -> RenderResult<()> {
        self.composite = style;
        Ok(())
    }

    fn stroke_polyline(
        &mut self,
        points: &[CssPoint],
        color: &str,
        line_width: f64,
    ) -> RenderResult<()> {
        let mut coords = String::with_capacity(points.len() * 16);
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                coords.push(' ');
            }
            let _ = write!(coords, "{},{}", p.x, p.y);
        }
        let attrs = self.composite_attrs();
        let _ = write!(
            self.body,
            "<polyline points=\"{coords}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{line_width}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"{attrs}/>",
            escape_xml(color),
        );
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        at: CssPoint,
        color: &str,
        font_px: f64,
    ) -> RenderResult<()> {
        let attrs = self.composite_attrs();
        let _ = write!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-family=\"{FONT_FAMILY}\" font-size=\"{font_px}\" fill=\"{}\"{attrs}>{}</text>",
            at.x,
            at.y,
            escape_xml(color),
            escape_xml(text),
        );
        Ok(())
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_size_is_backing_store_and_viewbox_is_css() {
        let mut svg = SvgSurface::new();
        svg.resize_backing(BackingSize {
            width: 800,
            height: 600,
        })
        .expect("resize");
        svg.set_scale(2.0).expect("scale");
        let out = svg.to_svg();
        assert!(out.starts_with("<svg"));
        assert!(out.contains("width=\"800\""));
        assert!(out.contains("viewBox=\"0 0 400 300\""));
        assert!(out.ends_with("</svg>"));
    }

    #[test]
    fn highlight_composite_becomes_blend_attributes() {
        let mut svg = SvgSurface::new();
        svg.set_composite(CompositeStyle::HIGHLIGHT).expect("composite");
        svg.stroke_polyline(
            &[CssPoint { x: 0.0, y: 0.0 }, CssPoint { x: 10.0, y: 5.0 }],
            "#FFEB3B",
            18.0,
        )
        .expect("draw");
        let out = svg.to_svg();
        assert!(out.contains("points=\"0,0 10,5\""));
        assert!(out.contains("opacity=\"0.15\""));
        assert!(out.contains("mix-blend-mode:multiply"));
    }

    #[test]
    fn text_is_escaped() {
        let mut svg = SvgSurface::new();
        svg.fill_text("a < b & \"c\"", CssPoint { x: 1.0, y: 2.0 }, "#000", 30.0)
            .expect("draw");
        let out = svg.to_svg();
        assert!(out.contains("a &lt; b &amp; &quot;c&quot;"));
        assert!(!out.contains("opacity"));
    }

    #[test]
    fn clear_drops_previous_frame() {
        let mut svg = SvgSurface::new().with_background("page.png");
        svg.fill_text("old", CssPoint { x: 0.0, y: 0.0 }, "#000", 10.0)
            .expect("draw");
        svg.clear(100.0, 100.0).expect("clear");
        let out = svg.to_svg();
        assert!(!out.contains("old"));
        assert!(out.contains("href=\"page.png\""));
    }
}
