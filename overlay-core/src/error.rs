//! Error types for overlay operations.

use thiserror::Error;

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors that can occur in overlay operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Color string is not `#RGB` or `#RRGGBB`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Stroke width must be a positive, finite number.
    #[error("Invalid stroke width: {0}")]
    InvalidStrokeWidth(f64),

    /// Eraser radius must be a positive, finite number.
    #[error("Invalid eraser radius: {0}")]
    InvalidEraseThreshold(f64),

    /// Operation needs a loaded document.
    #[error("No document loaded")]
    NoDocument,

    /// Annotation serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors reported by a persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Connection, timeout or HTTP status failure.
    #[error("Document service unreachable: {0}")]
    Transport(String),

    /// The service answered with an explicit error payload.
    #[error("Document service error: {0}")]
    Service(String),

    /// The requested document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The response could not be interpreted.
    #[error("Malformed document service response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Returns true for transient transport failures.
    ///
    /// The engine never retries on its own; callers may use this to decide
    /// whether offering a manual retry makes sense.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
