//! Stroke capture state machine.
//!
//! ```text
//!  Idle ──begin──▶ Capturing ──extend──▶ Capturing
//!   ▲                  │
//!   └──────finish──────┘   (commit iff ≥ 2 points)
//! ```
//!
//! Only drawing tools enter `Capturing`. Eraser and text input never touch
//! this machine; the engine routes them elsewhere while it stays idle.

use crate::{Annotation, Color, NormalizedPoint, Shape, StrokeKind};

/// Stroke being drawn right now.
#[derive(Debug, Clone, PartialEq)]
struct ActiveStroke {
    annotation: Annotation,
    last_point: NormalizedPoint,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum CaptureState {
    #[default]
    Idle,
    Capturing(ActiveStroke),
}

/// Incremental piece of a stroke to draw immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Previous point.
    pub from: NormalizedPoint,
    /// New point.
    pub to: NormalizedPoint,
    /// Pen or highlighter.
    pub kind: StrokeKind,
    /// Ink color.
    pub color: Color,
    /// Brush size.
    pub stroke_width: f64,
    /// Page the stroke belongs to.
    pub page: usize,
}

/// Result of ending a contact.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The stroke had at least two points.
    Committed(Annotation),
    /// The stroke was a single tap and was dropped.
    Discarded,
    /// Nothing was being captured.
    NotCapturing,
}

/// The capture state machine.
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    state: CaptureState,
}

impl StrokeCapture {
    /// Create an idle machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing(_))
    }

    /// The in-progress stroke, if any.
    #[must_use]
    pub fn in_progress(&self) -> Option<&Annotation> {
        match &self.state {
            CaptureState::Capturing(active) => Some(&active.annotation),
            CaptureState::Idle => None,
        }
    }

    /// Start a stroke seeded with `point`.
    ///
    /// Returns `false` and changes nothing if a stroke is already in progress.
    pub fn begin(
        &mut self,
        kind: StrokeKind,
        color: Color,
        stroke_width: f64,
        page: usize,
        point: NormalizedPoint,
    ) -> bool {
        if self.is_capturing() {
            return false;
        }
        tracing::debug!(?kind, page, "Capture started");
        self.state = CaptureState::Capturing(ActiveStroke {
            annotation: Annotation::stroke(kind, color, stroke_width, page, vec![point]),
            last_point: point,
        });
        true
    }

    /// Append a point; returns the segment to draw.
    pub fn extend(&mut self, point: NormalizedPoint) -> Option<Segment> {
        let CaptureState::Capturing(active) = &mut self.state else {
            return None;
        };
        let Shape::Stroke { points, kind } = &mut active.annotation.shape else {
            return None;
        };
        points.push(point);
        let segment = Segment {
            from: active.last_point,
            to: point,
            kind: *kind,
            color: active.annotation.color.clone(),
            stroke_width: active.annotation.stroke_width,
            page: active.annotation.page,
        };
        active.last_point = point;
        Some(segment)
    }

    /// End the contact.
    pub fn finish(&mut self) -> CaptureOutcome {
        match std::mem::take(&mut self.state) {
            CaptureState::Idle => CaptureOutcome::NotCapturing,
            CaptureState::Capturing(active) if active.annotation.is_renderable() => {
                tracing::debug!(page = active.annotation.page, "Stroke committed");
                CaptureOutcome::Committed(active.annotation)
            }
            CaptureState::Capturing(_) => {
                tracing::debug!("Single-point stroke discarded");
                CaptureOutcome::Discarded
            }
        }
    }

    /// Drop any in-progress stroke without committing it.
    ///
    /// Used when the document underneath is replaced.
    pub fn abandon(&mut self) -> bool {
        let was_capturing = self.is_capturing();
        self.state = CaptureState::Idle;
        was_capturing
    }
}
