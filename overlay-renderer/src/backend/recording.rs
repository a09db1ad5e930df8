//! Surface that records draw calls instead of producing pixels.
//!
//! Used for headless checks of what the renderer asked for and in which
//! composite state.

use overlay_core::{BackingSize, CssPoint};

use super::Surface;
use crate::style::CompositeStyle;
use crate::{BackendType, RenderError, RenderResult};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Backing store resized.
    Resize(BackingSize),
    /// Transform replaced by a uniform scale.
    Scale(f64),
    /// Area cleared.
    Clear {
        /// CSS width.
        width: f64,
        /// CSS height.
        height: f64,
    },
    /// Composite state changed.
    Composite(CompositeStyle),
    /// Polyline stroked.
    Polyline {
        /// CSS points.
        points: Vec<CssPoint>,
        /// Stroke color.
        color: String,
        /// Line width in CSS pixels.
        line_width: f64,
        /// Composite state at the time of the call.
        composite: CompositeStyle,
    },
    /// Text filled.
    Text {
        /// Label.
        text: String,
        /// Baseline start.
        at: CssPoint,
        /// Fill color.
        color: String,
        /// Font size in CSS pixels.
        font_px: f64,
        /// Composite state at the time of the call.
        composite: CompositeStyle,
    },
}

/// In-memory command log.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    composite: CompositeStyle,
    backing: BackingSize,
    scale: f64,
    failing_draws: usize,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Create an empty, unsized surface.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            composite: CompositeStyle::NORMAL,
            backing: BackingSize {
                width: 0,
                height: 0,
            },
            scale: 1.0,
            failing_draws: 0,
        }
    }

    /// Make the next `count` draw calls fail.
    pub fn fail_next_draws(&mut self, count: usize) {
        self.failing_draws = count;
    }

    /// Every call so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the log.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Composite state the surface is currently in.
    #[must_use]
    pub fn composite(&self) -> CompositeStyle {
        self.composite
    }

    /// Current backing-store size.
    #[must_use]
    pub fn backing(&self) -> BackingSize {
        self.backing
    }

    /// Current uniform scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of draw calls (polylines and text) recorded.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polyline { .. } | DrawCommand::Text { .. }))
            .count()
    }

    fn check_draw(&mut self) -> RenderResult<()> {
        if self.failing_draws > 0 {
            self.failing_draws -= 1;
            return Err(RenderError::Draw("injected failure".to_string()));
        }
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn backend_type(&self) -> BackendType {
        BackendType::Recording
    }

    fn resize_backing(&mut self, size: BackingSize) -> RenderResult<()> {
        self.backing = size;
        self.scale = 1.0;
        self.composite = CompositeStyle::NORMAL;
        self.commands.push(DrawCommand::Resize(size));
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) -> RenderResult<()> {
        self.scale = scale;
        self.commands.push(DrawCommand::Scale(scale));
        Ok(())
    }

    fn clear(&mut self, width: f64, height: f64) -> RenderResult<()> {
        self.commands.push(DrawCommand::Clear { width, height });
        Ok(())
    }

    fn set_composite(&mut self, style: CompositeStyle) -> RenderResult<()> {
        self.composite = style;
        self.commands.push(DrawCommand::Composite(style));
        Ok(())
    }

    fn stroke_polyline(
        &mut self,
        points: &[CssPoint],
        color: &str,
        line_width: f64,
    ) -> RenderResult<()> {
        self.check_draw()?;
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            color: color.to_string(),
            line_width,
            composite: self.composite,
        });
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        at: CssPoint,
        color: &str,
        font_px: f64,
    ) -> RenderResult<()> {
        self.check_draw()?;
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            color: color.to_string(),
            font_px,
            composite: self.composite,
        });
        Ok(())
    }
}
