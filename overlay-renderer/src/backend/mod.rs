//! Drawing surface implementations.

#[cfg(feature = "wasm")]
pub mod canvas2d;
pub mod recording;
pub mod svg;

use overlay_core::{BackingSize, CssPoint};

use crate::style::CompositeStyle;
use crate::{BackendType, RenderResult};

/// A 2D surface the renderer draws annotations on.
///
/// Coordinates passed to drawing calls are CSS pixels; the surface maps them
/// onto its backing store through the scale set by [`Surface::set_scale`].
pub trait Surface {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Resize the backing store. Implementations may reset their transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be resized.
    fn resize_backing(&mut self, size: BackingSize) -> RenderResult<()>;

    /// Replace the current transform with a uniform scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform is rejected.
    fn set_scale(&mut self, scale: f64) -> RenderResult<()>;

    /// Clear a CSS-sized area starting at the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if clearing fails.
    fn clear(&mut self, css_width: f64, css_height: f64) -> RenderResult<()>;

    /// Set global alpha and blend mode for subsequent draws.
    ///
    /// # Errors
    ///
    /// Returns an error if the composite state is rejected.
    fn set_composite(&mut self, style: CompositeStyle) -> RenderResult<()>;

    /// Stroke an open polyline with round caps and joins.
    ///
    /// # Errors
    ///
    /// Returns an error if the draw call fails.
    fn stroke_polyline(&mut self, points: &[CssPoint], color: &str, line_width: f64)
        -> RenderResult<()>;

    /// Fill a single line of text with its baseline starting at `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the draw call fails.
    fn fill_text(
        &mut self,
        text: &str,
        at: CssPoint,
        color: &str,
        font_px: f64,
    ) -> RenderResult<()>;
}
