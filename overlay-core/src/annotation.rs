//! Annotations - the markup drawn over document pages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::AnnotationRecord;
use crate::{OverlayError, OverlayResult};

/// Default annotation color (the original palette's yellow).
pub const DEFAULT_COLOR: &str = "#FFEB3B";

/// Hex RGB color, `#RGB` or `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse and validate a hex color string.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidColor`] unless the input is `#` followed by
    /// three or six hex digits.
    pub fn parse(value: &str) -> OverlayResult<Self> {
        let digits = value
            .strip_prefix('#')
            .ok_or_else(|| OverlayError::InvalidColor(value.to_string()))?;
        let valid_len = digits.len() == 3 || digits.len() == 6;
        if valid_len && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(value.to_string()))
        } else {
            Err(OverlayError::InvalidColor(value.to_string()))
        }
    }

    /// The color as it was given, e.g. `#FFEB3B`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = OverlayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// A point relative to the CSS-layout content box of a page.
///
/// `(0, 0)` is the top-left corner of the box and `(1, 1)` the bottom-right.
/// Points captured while the pointer is outside the box fall outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// Fraction of the box width from the left edge.
    pub x: f64,
    /// Fraction of the box height from the top edge.
    pub y: f64,
}

impl NormalizedPoint {
    /// Create a new normalized point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in normalized units.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Which pen produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeKind {
    /// Opaque ink.
    Pen,
    /// Translucent multiply-blended marker.
    Highlighter,
}

/// Geometry of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Freehand polyline.
    Stroke {
        /// Points in capture order.
        points: Vec<NormalizedPoint>,
        /// Pen or highlighter.
        kind: StrokeKind,
    },
    /// A text label anchored at a point.
    Text {
        /// Baseline start of the text.
        anchor: NormalizedPoint,
        /// Label content, never empty.
        text: String,
    },
}

/// A single piece of markup on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnnotationRecord", into = "AnnotationRecord")]
pub struct Annotation {
    /// Ink color.
    pub color: Color,
    /// Brush size; line width and font size are derived from it.
    pub stroke_width: f64,
    /// Zero-based page index.
    pub page: usize,
    /// Geometry.
    pub shape: Shape,
}

impl Annotation {
    /// Create a stroke annotation.
    #[must_use]
    pub fn stroke(
        kind: StrokeKind,
        color: Color,
        stroke_width: f64,
        page: usize,
        points: Vec<NormalizedPoint>,
    ) -> Self {
        Self {
            color,
            stroke_width,
            page,
            shape: Shape::Stroke { points, kind },
        }
    }

    /// Create a text annotation.
    #[must_use]
    pub fn text(
        color: Color,
        stroke_width: f64,
        page: usize,
        anchor: NormalizedPoint,
        text: impl Into<String>,
    ) -> Self {
        Self {
            color,
            stroke_width,
            page,
            shape: Shape::Text {
                anchor,
                text: text.into(),
            },
        }
    }

    /// Whether this annotation can be drawn and persisted.
    ///
    /// Strokes need at least two points; text needs content.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        match &self.shape {
            Shape::Stroke { points, .. } => points.len() >= 2,
            Shape::Text { text, .. } => !text.is_empty(),
        }
    }

    /// Stroke kind, or `None` for text.
    #[must_use]
    pub fn stroke_kind(&self) -> Option<StrokeKind> {
        match &self.shape {
            Shape::Stroke { kind, .. } => Some(*kind),
            Shape::Text { .. } => None,
        }
    }

    /// Whether any part of this annotation lies within `threshold` of `point`.
    ///
    /// Text is hit through its anchor, strokes through any of their points.
    #[must_use]
    pub fn is_near(&self, point: &NormalizedPoint, threshold: f64) -> bool {
        match &self.shape {
            Shape::Text { anchor, .. } => anchor.distance_to(point) <= threshold,
            Shape::Stroke { points, .. } => {
                points.iter().any(|p| p.distance_to(point) <= threshold)
            }
        }
    }
}

/// Validate a brush size.
///
/// # Errors
///
/// Returns [`OverlayError::InvalidStrokeWidth`] for zero, negative or non-finite sizes.
pub fn validate_stroke_width(width: f64) -> OverlayResult<f64> {
    if width.is_finite() && width > 0.0 {
        Ok(width)
    } else {
        Err(OverlayError::InvalidStrokeWidth(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_accepts_short_and_long_hex() {
        assert!(Color::parse("#fff").is_ok());
        assert!(Color::parse("#FFEB3B").is_ok());
        assert_eq!(Color::default().as_str(), DEFAULT_COLOR);
    }

    #[test]
    fn color_rejects_garbage() {
        for bad in ["FFEB3B", "#FFEB3", "#GGGGGG", "", "#", "red"] {
            assert!(
                matches!(Color::parse(bad), Err(OverlayError::InvalidColor(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn single_point_stroke_is_not_renderable() {
        let p = NormalizedPoint::new(0.2, 0.2);
        let one = Annotation::stroke(StrokeKind::Pen, Color::default(), 3.0, 0, vec![p]);
        let two = Annotation::stroke(StrokeKind::Pen, Color::default(), 3.0, 0, vec![p, p]);
        assert!(!one.is_renderable());
        assert!(two.is_renderable());
    }

    #[test]
    fn empty_text_is_not_renderable() {
        let anchor = NormalizedPoint::new(0.5, 0.5);
        assert!(!Annotation::text(Color::default(), 3.0, 0, anchor, "").is_renderable());
        assert!(Annotation::text(Color::default(), 3.0, 0, anchor, "note").is_renderable());
    }

    #[test]
    fn stroke_is_near_through_any_point() {
        let stroke = Annotation::stroke(
            StrokeKind::Highlighter,
            Color::default(),
            3.0,
            0,
            vec![NormalizedPoint::new(0.1, 0.1), NormalizedPoint::new(0.9, 0.9)],
        );
        assert!(stroke.is_near(&NormalizedPoint::new(0.88, 0.9), 0.05));
        assert!(!stroke.is_near(&NormalizedPoint::new(0.5, 0.5), 0.05));
    }

    #[test]
    fn stroke_width_validation() {
        assert!(validate_stroke_width(3.0).is_ok());
        assert!(validate_stroke_width(0.0).is_err());
        assert!(validate_stroke_width(-1.0).is_err());
        assert!(validate_stroke_width(f64::NAN).is_err());
    }
}
