//! Drawing tools and the user's current tool selection.

use serde::{Deserialize, Serialize};

use crate::annotation::validate_stroke_width;
use crate::schema::DEFAULT_SIZE;
use crate::{Color, OverlayResult, StrokeKind};

/// The tool that interprets a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Opaque freehand ink.
    #[default]
    Pen,
    /// Translucent freehand marker.
    Highlighter,
    /// Removes annotations near the pointer.
    Eraser,
    /// Places a text label.
    Text,
}

impl Tool {
    /// Every tool, in toolbar order.
    pub const ALL: [Self; 4] = [Self::Pen, Self::Highlighter, Self::Eraser, Self::Text];

    /// CSS cursor the surface should show while this tool is active.
    #[must_use]
    pub const fn cursor(self) -> &'static str {
        match self {
            Self::Pen | Self::Highlighter => "crosshair",
            Self::Eraser => "not-allowed",
            Self::Text => "text",
        }
    }

    /// Stroke kind produced by a drawing tool.
    #[must_use]
    pub const fn stroke_kind(self) -> Option<StrokeKind> {
        match self {
            Self::Pen => Some(StrokeKind::Pen),
            Self::Highlighter => Some(StrokeKind::Highlighter),
            Self::Eraser | Self::Text => None,
        }
    }

    /// Wire name (`"pen"`, `"highlighter"`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pen => "pen",
            Self::Highlighter => "highlighter",
            Self::Eraser => "eraser",
            Self::Text => "text",
        }
    }

    /// Look a tool up by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Active tool, color and brush size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolState {
    /// Selected tool.
    pub active_tool: Tool,
    /// Ink color for new annotations.
    pub color: Color,
    /// Brush size for new annotations.
    pub stroke_width: f64,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            active_tool: Tool::Pen,
            color: Color::default(),
            stroke_width: DEFAULT_SIZE,
        }
    }
}

impl ToolState {
    /// Select a tool.
    pub fn select_tool(&mut self, tool: Tool) {
        self.active_tool = tool;
    }

    /// Select a color from a hex string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OverlayError::InvalidColor`]; the current color is kept.
    pub fn select_color(&mut self, color: &str) -> OverlayResult<()> {
        self.color = Color::parse(color)?;
        Ok(())
    }

    /// Set the brush size.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OverlayError::InvalidStrokeWidth`]; the current size is kept.
    pub fn set_stroke_width(&mut self, width: f64) -> OverlayResult<()> {
        self.stroke_width = validate_stroke_width(width)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_palette() {
        let state = ToolState::default();
        assert_eq!(state.active_tool, Tool::Pen);
        assert_eq!(state.color.as_str(), "#FFEB3B");
        assert!((state.stroke_width - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cursors() {
        assert_eq!(Tool::Pen.cursor(), "crosshair");
        assert_eq!(Tool::Highlighter.cursor(), "crosshair");
        assert_eq!(Tool::Eraser.cursor(), "not-allowed");
        assert_eq!(Tool::Text.cursor(), "text");
    }

    #[test]
    fn names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("laser"), None);
    }

    #[test]
    fn invalid_selection_keeps_previous_value() {
        let mut state = ToolState::default();
        assert!(state.select_color("nope").is_err());
        assert!(state.set_stroke_width(-4.0).is_err());
        assert_eq!(state, ToolState::default());

        state.select_color("#00f").expect("valid color");
        state.set_stroke_width(5.0).expect("valid width");
        assert_eq!(state.color.as_str(), "#00f");
    }
}
