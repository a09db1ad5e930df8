//! Proximity eraser.

use serde::{Deserialize, Serialize};

use crate::{AnnotationSet, NormalizedPoint, OverlayError, OverlayResult};

/// Hit radius in normalized units.
pub const ERASE_THRESHOLD: f64 = 0.05;

/// Check an eraser radius.
///
/// # Errors
///
/// Returns [`OverlayError::InvalidEraseThreshold`] unless the radius is
/// positive and finite.
pub fn validate_threshold(threshold: f64) -> OverlayResult<f64> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(threshold)
    } else {
        Err(OverlayError::InvalidEraseThreshold(threshold))
    }
}

/// Removes whole annotations near a point on one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eraser {
    /// Euclidean hit radius, inclusive.
    pub threshold: f64,
}

impl Default for Eraser {
    fn default() -> Self {
        Self {
            threshold: ERASE_THRESHOLD,
        }
    }
}

impl Eraser {
    /// Create an eraser with a custom radius.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Erase at `point` on `page`. Returns the number of annotations removed.
    pub fn erase(&self, set: &mut AnnotationSet, page: usize, point: &NormalizedPoint) -> usize {
        let removed = set.remove_near(page, point, self.threshold);
        if removed > 0 {
            tracing::debug!(page, removed, "Erased annotations");
        }
        removed
    }
}
