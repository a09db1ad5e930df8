//! # Saorsa Overlay Core
//!
//! Resolution-independent annotation overlay for paginated documents.
//! Compiles to WASM and runs natively.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 overlay-core                │
//! ├─────────────────────────────────────────────┤
//! │  Input           │  Model                   │
//! │  - Mouse/touch   │  - Annotations           │
//! │  - Normalizer    │  - Page-scoped store     │
//! │  - Capture FSM   │  - Wire schema           │
//! ├─────────────────────────────────────────────┤
//! │  Engine          │  Persistence             │
//! │  - Tools/eraser  │  - Gateway trait         │
//! │  - Pages/layout  │  - Load/save tickets     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Annotations are stored in coordinates normalized to the page's CSS
//! content box, so the same set replays identically at any window size,
//! pixel density or orientation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod annotation;
pub mod capture;
pub mod coords;
pub mod document;
pub mod engine;
pub mod eraser;
pub mod error;
pub mod event;
pub mod gateway;
pub mod layout;
pub mod navigator;
pub mod schema;
pub mod store;
pub mod tool;

pub use annotation::{Annotation, Color, NormalizedPoint, Shape, StrokeKind, DEFAULT_COLOR};
pub use capture::{CaptureOutcome, Segment, StrokeCapture};
pub use coords::{BackingSize, ContentBox, CssPoint, SurfaceMetrics};
pub use document::{Document, PageContent};
pub use engine::{Effect, Engine, EngineConfig, LoadTicket, Notice, PendingSave, TextRequest};
pub use eraser::{Eraser, ERASE_THRESHOLD};
pub use error::{GatewayError, OverlayError, OverlayResult};
pub use event::{InputEvent, PointerPhase, TouchEvent, TouchPhase, TouchPoint, UnifiedInput};
pub use gateway::{MemoryGateway, PersistenceGateway};
pub use layout::{LayoutChange, LayoutCoalescer, LayoutTicket};
pub use navigator::PageNavigator;
pub use schema::{AnnotationRecord, LoadedDocument, SaveRequest};
pub use store::AnnotationSet;
pub use tool::{Tool, ToolState};

/// Overlay core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
