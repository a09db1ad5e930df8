//! Browser 2D canvas surface.

use overlay_core::{BackingSize, CssPoint};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Surface;
use crate::style::{CompositeStyle, FONT_FAMILY};
use crate::{BackendType, RenderError, RenderResult};

/// `CanvasRenderingContext2d`-backed surface.
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    /// Wrap a canvas element.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoSurface`] if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> RenderResult<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| RenderError::NoSurface(js_message(&e)))?
            .ok_or_else(|| RenderError::NoSurface("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::NoSurface("not a 2d context".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    /// The wrapped canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for Canvas2dSurface {
    fn backend_type(&self) -> BackendType {
        BackendType::Canvas2D
    }

    fn resize_backing(&mut self, size: BackingSize) -> RenderResult<()> {
        // Assigning either dimension resets the context state.
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) -> RenderResult<()> {
        self.ctx
            .set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0)
            .map_err(|e| RenderError::Surface(js_message(&e)))
    }

    fn clear(&mut self, css_width: f64, css_height: f64) -> RenderResult<()> {
        self.ctx.clear_rect(0.0, 0.0, css_width, css_height);
        Ok(())
    }

    fn set_composite(&mut self, style: CompositeStyle) -> RenderResult<()> {
        self.ctx.set_global_alpha(style.alpha);
        self.ctx
            .set_global_composite_operation(style.blend.css_name())
            .map_err(|e| RenderError::Surface(js_message(&e)))
    }

    fn stroke_polyline(
        &mut self,
        points: &[CssPoint],
        color: &str,
        line_width: f64,
    ) -> RenderResult<()> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.stroke();
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        at: CssPoint,
        color: &str,
        font_px: f64,
    ) -> RenderResult<()> {
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(&format!("{font_px}px {FONT_FAMILY}"));
        self.ctx
            .fill_text(text, at.x, at.y)
            .map_err(|e| RenderError::Draw(js_message(&e)))
    }
}

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}
