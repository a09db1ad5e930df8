//! # Saorsa Overlay Renderer
//!
//! Draws normalized annotations onto a 2D surface with per-tool compositing.
//!
//! ## Surfaces
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Surface Trait                 │
//! ├─────────────┬─────────────┬─────────────────┤
//! │ Canvas 2D   │ SVG         │ Recording       │
//! │ (browser)   │ (headless)  │ (tests)         │
//! └─────────────┴─────────────┴─────────────────┘
//! ```
//!
//! The renderer maps normalized points through the current CSS content box;
//! backing-store pixels only appear when the surface is resized.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod style;

pub use backend::recording::{DrawCommand, RecordingSurface};
pub use backend::svg::SvgSurface;
pub use backend::Surface;
pub use error::{RenderError, RenderResult};
pub use style::{BlendMode, CompositeStyle};

#[cfg(feature = "wasm")]
pub use backend::canvas2d::Canvas2dSurface;

use overlay_core::{Annotation, CssPoint, Effect, Engine, Segment, Shape, SurfaceMetrics};

/// Available surface backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Browser `CanvasRenderingContext2d`.
    Canvas2D,
    /// SVG document.
    Svg,
    /// Command log.
    Recording,
}

/// Draws annotations onto a [`Surface`].
pub struct Renderer<S: Surface> {
    surface: S,
    metrics: Option<SurfaceMetrics>,
    frame_count: u64,
}

impl<S: Surface> Renderer<S> {
    /// Create a renderer over an uncalibrated surface.
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            metrics: None,
            frame_count: 0,
        }
    }

    /// The surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Give the surface back.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Number of full redraws so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the active backend type.
    #[must_use]
    pub fn active_backend(&self) -> BackendType {
        self.surface.backend_type()
    }

    /// Metrics the surface was last sized from.
    #[must_use]
    pub fn metrics(&self) -> Option<&SurfaceMetrics> {
        self.metrics.as_ref()
    }

    /// Resize the backing store and reapply the pixel-ratio scale.
    ///
    /// Zero-area metrics are ignored; the surface keeps its previous size.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the size or transform.
    pub fn recalibrate(&mut self, metrics: SurfaceMetrics) -> RenderResult<()> {
        if !metrics.is_sized() {
            tracing::debug!("Skipping calibration of unsized surface");
            return Ok(());
        }
        let backing = metrics.backing_size();
        self.surface.resize_backing(backing)?;
        self.surface.set_scale(metrics.surface_scale())?;
        tracing::debug!(
            "Surface {}x{} backing for {}x{} css at dpr {}",
            backing.width,
            backing.height,
            metrics.content_box.width,
            metrics.content_box.height,
            metrics.device_pixel_ratio
        );
        self.metrics = Some(metrics);
        Ok(())
    }

    /// Clear the surface and draw `annotations` in order.
    ///
    /// Callers pass one page's annotations; strokes with fewer than two
    /// points and empty labels are skipped. Does nothing before calibration.
    ///
    /// # Errors
    ///
    /// Returns the first failing draw. The composite state is restored
    /// regardless.
    pub fn redraw<'a, I>(&mut self, annotations: I) -> RenderResult<()>
    where
        I: IntoIterator<Item = &'a Annotation>,
    {
        let Some(metrics) = self.metrics else {
            tracing::trace!("Redraw before calibration ignored");
            return Ok(());
        };
        let (css_w, css_h) = metrics.css_size();
        self.surface.clear(css_w, css_h)?;
        let mut drawn = 0usize;
        for annotation in annotations {
            if annotation.is_renderable() {
                self.draw_annotation(&metrics, annotation)?;
                drawn += 1;
            }
        }
        self.frame_count += 1;
        tracing::trace!("Frame {}: {} annotations", self.frame_count, drawn);
        Ok(())
    }

    /// Draw one in-progress segment on top of the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the draw call fails. The composite state is
    /// restored regardless.
    pub fn draw_segment(&mut self, segment: &Segment) -> RenderResult<()> {
        let Some(metrics) = self.metrics else {
            return Ok(());
        };
        let (composite, line_width) = style::stroke_style(segment.kind, segment.stroke_width);
        let points = [metrics.to_css(&segment.from), metrics.to_css(&segment.to)];
        let color = segment.color.as_str();
        self.composited(composite, |surface| {
            surface.stroke_polyline(&points, color, line_width)
        })
    }

    /// Carry out an engine effect.
    ///
    /// A page change redraws the new page at the current size; the host
    /// recalibrates separately once the page content has laid out.
    ///
    /// # Errors
    ///
    /// Returns an error if a surface call fails.
    pub fn apply(&mut self, engine: &Engine, effect: &Effect) -> RenderResult<()> {
        match effect {
            Effect::DrawSegment(segment) if segment.page == engine.current_page() => {
                self.draw_segment(segment)
            }
            Effect::Redraw | Effect::ShowPage(_) => self.redraw(engine.visible_annotations()),
            Effect::Recalibrate => {
                if let Some(metrics) = engine.metrics() {
                    self.recalibrate(*metrics)?;
                }
                self.redraw(engine.visible_annotations())
            }
            Effect::DrawSegment(_) | Effect::None | Effect::RequestText(_) => Ok(()),
        }
    }

    fn draw_annotation(
        &mut self,
        metrics: &SurfaceMetrics,
        annotation: &Annotation,
    ) -> RenderResult<()> {
        let color = annotation.color.as_str();
        match &annotation.shape {
            Shape::Stroke { points, kind } => {
                let (composite, line_width) = style::stroke_style(*kind, annotation.stroke_width);
                let css: Vec<CssPoint> = points.iter().map(|p| metrics.to_css(p)).collect();
                self.composited(composite, |surface| {
                    surface.stroke_polyline(&css, color, line_width)
                })
            }
            Shape::Text { anchor, text } => {
                let at = metrics.to_css(anchor);
                let font_px = style::font_size(annotation.stroke_width);
                self.composited(CompositeStyle::NORMAL, |surface| {
                    surface.fill_text(text, at, color, font_px)
                })
            }
        }
    }

    /// Run `draw` under `composite`, then restore opaque normal blending even
    /// if the draw failed.
    fn composited<F>(&mut self, composite: CompositeStyle, draw: F) -> RenderResult<()>
    where
        F: FnOnce(&mut S) -> RenderResult<()>,
    {
        let drawn = self
            .surface
            .set_composite(composite)
            .and_then(|()| draw(&mut self.surface));
        let restored = self.surface.set_composite(CompositeStyle::NORMAL);
        if let Err(e) = &drawn {
            tracing::warn!("Annotation draw failed: {}", e);
        }
        drawn.and(restored)
    }
}
