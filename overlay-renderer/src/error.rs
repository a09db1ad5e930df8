//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The drawing surface could not be obtained.
    #[error("No drawing surface available: {0}")]
    NoSurface(String),

    /// The surface rejected a state change (size, transform, composite).
    #[error("Surface error: {0}")]
    Surface(String),

    /// A draw call failed.
    #[error("Draw call failed: {0}")]
    Draw(String),
}
