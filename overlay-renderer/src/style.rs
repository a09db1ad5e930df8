//! Per-tool compositing rules.
//!
//! | Kind        | Alpha | Blend    | Size                   |
//! |-------------|-------|----------|------------------------|
//! | Pen         | 1.0   | normal   | line `stroke_width * 2` |
//! | Highlighter | 0.15  | multiply | line `stroke_width * 6` |
//! | Text        | 1.0   | normal   | font `stroke_width * 10` |

use overlay_core::StrokeKind;

/// Pen line width per brush unit.
pub const PEN_WIDTH_FACTOR: f64 = 2.0;
/// Highlighter line width per brush unit.
pub const HIGHLIGHTER_WIDTH_FACTOR: f64 = 6.0;
/// Highlighter opacity.
pub const HIGHLIGHTER_ALPHA: f64 = 0.15;
/// Font pixel size per brush unit.
pub const TEXT_FONT_FACTOR: f64 = 10.0;
/// Font family for text labels.
pub const FONT_FAMILY: &str = "Arial";

/// How new pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Paint over (`source-over`).
    Normal,
    /// Darken by multiplying (`multiply`).
    Multiply,
}

impl BlendMode {
    /// Canvas `globalCompositeOperation` / CSS blend name.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Normal => "source-over",
            Self::Multiply => "multiply",
        }
    }
}

/// Global alpha plus blend mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeStyle {
    /// Global alpha, `0.0..=1.0`.
    pub alpha: f64,
    /// Blend mode.
    pub blend: BlendMode,
}

impl CompositeStyle {
    /// Opaque, normal blending. Every draw leaves the surface in this state.
    pub const NORMAL: Self = Self {
        alpha: 1.0,
        blend: BlendMode::Normal,
    };

    /// Translucent multiply used by highlighters.
    pub const HIGHLIGHT: Self = Self {
        alpha: HIGHLIGHTER_ALPHA,
        blend: BlendMode::Multiply,
    };

    /// Whether this is the resting state.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        *self == Self::NORMAL
    }
}

/// Composite and line width for a stroke.
#[must_use]
pub fn stroke_style(kind: StrokeKind, stroke_width: f64) -> (CompositeStyle, f64) {
    match kind {
        StrokeKind::Pen => (CompositeStyle::NORMAL, stroke_width * PEN_WIDTH_FACTOR),
        StrokeKind::Highlighter => (
            CompositeStyle::HIGHLIGHT,
            stroke_width * HIGHLIGHTER_WIDTH_FACTOR,
        ),
    }
}

/// Font pixel size for a text label.
#[must_use]
pub fn font_size(stroke_width: f64) -> f64 {
    stroke_width * TEXT_FONT_FACTOR
}
