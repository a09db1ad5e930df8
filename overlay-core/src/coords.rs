//! Coordinate normalization between viewport pixels, CSS layout and the
//! drawing surface's backing store.
//!
//! Three spaces are involved:
//!
//! - **viewport** - raw `clientX/clientY` of pointer and touch events;
//! - **normalized** - fractions of the content box, what annotations store;
//! - **CSS render space** - normalized points scaled by the *current* content
//!   box size, what the renderer draws in.
//!
//! The backing store is `css size × device pixel ratio` device pixels. It is
//! only used to size the surface and to derive its uniform scale transform, so
//! one CSS pixel maps onto `dpr` crisp device pixels. Nothing else should ever
//! see backing-store coordinates.

use serde::{Deserialize, Serialize};

use crate::NormalizedPoint;

/// Bounding box of the page content in CSS pixels, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentBox {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Layout width.
    pub width: f64,
    /// Layout height.
    pub height: f64,
}

impl ContentBox {
    /// Create a content box.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether the box has a usable, non-zero area.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A point in CSS render space (pixels from the content box's top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssPoint {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// Backing-store dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackingSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

/// Everything needed to map between input, annotation and surface space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "MetricsFields")]
pub struct SurfaceMetrics {
    /// Current content box.
    pub content_box: ContentBox,
    /// Device pixel ratio of the display.
    pub device_pixel_ratio: f64,
}

#[derive(Deserialize)]
struct MetricsFields {
    content_box: ContentBox,
    device_pixel_ratio: f64,
}

impl From<MetricsFields> for SurfaceMetrics {
    fn from(fields: MetricsFields) -> Self {
        Self::new(fields.content_box, fields.device_pixel_ratio)
    }
}

impl SurfaceMetrics {
    /// Create metrics; an unusable pixel ratio falls back to `1.0`.
    #[must_use]
    pub fn new(content_box: ContentBox, device_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            content_box,
            device_pixel_ratio,
        }
    }

    /// Whether a surface can be sized from these metrics.
    #[must_use]
    pub fn is_sized(&self) -> bool {
        self.content_box.has_area()
    }

    /// Convert a viewport coordinate into annotation space.
    ///
    /// Returns `None` while the content box has no area.
    #[must_use]
    pub fn normalize(&self, client_x: f64, client_y: f64) -> Option<NormalizedPoint> {
        if !self.is_sized() {
            return None;
        }
        let b = &self.content_box;
        Some(NormalizedPoint::new(
            (client_x - b.left) / b.width,
            (client_y - b.top) / b.height,
        ))
    }

    /// Map a normalized point into CSS render space of the current box.
    #[must_use]
    pub fn to_css(&self, point: &NormalizedPoint) -> CssPoint {
        CssPoint {
            x: point.x * self.content_box.width,
            y: point.y * self.content_box.height,
        }
    }

    /// CSS size of the drawing surface (equal to the content box).
    #[must_use]
    pub fn css_size(&self) -> (f64, f64) {
        (self.content_box.width, self.content_box.height)
    }

    /// Device-pixel size the surface's backing store must have.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backing_size(&self) -> BackingSize {
        let scale = |css: f64| {
            if css.is_finite() && css > 0.0 {
                (css * self.device_pixel_ratio).round() as u32
            } else {
                0
            }
        };
        BackingSize {
            width: scale(self.content_box.width),
            height: scale(self.content_box.height),
        }
    }

    /// Uniform scale from CSS render space to backing-store pixels.
    #[must_use]
    pub fn surface_scale(&self) -> f64 {
        self.device_pixel_ratio
    }
}
