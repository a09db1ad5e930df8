//! The overlay engine.
//!
//! [`Engine`] owns the document, tool selection, capture machine, navigator
//! and surface metrics. Every operation returns an [`Effect`] telling the host
//! what to draw or ask for next; the engine itself never touches a surface or
//! the network.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotation::validate_stroke_width;
use crate::capture::{CaptureOutcome, Segment, StrokeCapture};
use crate::coords::SurfaceMetrics;
use crate::document::Document;
use crate::eraser::{validate_threshold, Eraser, ERASE_THRESHOLD};
use crate::event::{InputEvent, UnifiedInput};
use crate::layout::{LayoutChange, LayoutCoalescer, LayoutTicket};
use crate::navigator::PageNavigator;
use crate::schema::{LoadedDocument, SaveRequest};
use crate::tool::{Tool, ToolState};
use crate::{
    Annotation, AnnotationSet, Color, GatewayError, NormalizedPoint, OverlayError, OverlayResult,
};

/// Engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Eraser hit radius in normalized units.
    pub erase_threshold: f64,
    /// Trailing delay after a resize burst.
    pub resize_delay_ms: u32,
    /// Trailing delay after an orientation change.
    pub orientation_delay_ms: u32,
    /// Initial tool selection.
    pub tools: ToolState,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            erase_threshold: ERASE_THRESHOLD,
            resize_delay_ms: 150,
            orientation_delay_ms: 500,
            tools: ToolState::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Serialization`] for malformed JSON and the
    /// errors of [`EngineConfig::validate`].
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric setting.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidEraseThreshold`] for an unusable eraser
    /// radius and [`OverlayError::InvalidStrokeWidth`] for an unusable brush.
    pub fn validate(&self) -> OverlayResult<()> {
        validate_threshold(self.erase_threshold)?;
        validate_stroke_width(self.tools.stroke_width)?;
        Ok(())
    }

    /// Replace unusable settings with their defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if let Err(e) = validate_threshold(self.erase_threshold) {
            tracing::warn!("{}; using {}", e, defaults.erase_threshold);
            self.erase_threshold = defaults.erase_threshold;
        }
        if let Err(e) = validate_stroke_width(self.tools.stroke_width) {
            tracing::warn!("{}; using {}", e, defaults.tools.stroke_width);
            self.tools.stroke_width = defaults.tools.stroke_width;
        }
        self
    }
}

/// What the host must do after an engine operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Nothing to draw.
    None,
    /// Draw one in-progress segment on top of the current surface.
    DrawSegment(Segment),
    /// Clear and redraw the current page.
    Redraw,
    /// Resize the backing store from the current metrics, then redraw.
    Recalibrate,
    /// Render this page's content; calibrate once it is laid out.
    ShowPage(usize),
    /// Ask the user for label text.
    RequestText(TextRequest),
}

/// Outstanding request for text-label content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    /// Ticket id; only the latest request can be resolved.
    pub id: u64,
    /// Page the label goes on.
    pub page: usize,
    /// Where the user clicked.
    pub anchor: NormalizedPoint,
    /// Color at request time.
    pub color: Color,
    /// Brush size at request time.
    pub stroke_width: f64,
}

/// Identifies one document load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id: u64,
    document_id: String,
}

impl LoadTicket {
    /// The document being loaded.
    #[must_use]
    pub fn document_id(&self) -> &str {
        &self.document_id
    }
}

/// A save handed to the gateway, with the revision it captured.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    /// Payload for the gateway.
    pub request: SaveRequest,
    revision: u64,
    opened: u64,
}

/// User-visible outcome of a load or save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    /// A document was opened.
    #[serde(rename_all = "camelCase")]
    Loaded {
        /// Document id.
        document_id: String,
        /// Pages in the document.
        page_count: usize,
        /// Annotations loaded.
        annotation_count: usize,
    },
    /// A load failed; the previous document is still open.
    #[serde(rename_all = "camelCase")]
    LoadFailed {
        /// Document id.
        document_id: String,
        /// Failure description.
        message: String,
    },
    /// Annotations were saved.
    #[serde(rename_all = "camelCase")]
    Saved {
        /// Document id.
        document_id: String,
        /// Annotations written.
        annotation_count: usize,
    },
    /// A save failed; nothing changed locally.
    #[serde(rename_all = "camelCase")]
    SaveFailed {
        /// Document id.
        document_id: String,
        /// Failure description.
        message: String,
    },
}

impl Notice {
    /// Whether the notice reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::LoadFailed { .. } | Self::SaveFailed { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded {
                document_id,
                page_count,
                annotation_count,
            } => write!(
                f,
                "Opened {document_id}: {page_count} page(s), {annotation_count} annotation(s)"
            ),
            Self::LoadFailed {
                document_id,
                message,
            } => write!(f, "Could not open {document_id}: {message}"),
            Self::Saved {
                document_id,
                annotation_count,
            } => write!(f, "Saved {annotation_count} annotation(s) to {document_id}"),
            Self::SaveFailed {
                document_id,
                message,
            } => write!(f, "Could not save {document_id}: {message}"),
        }
    }
}

/// The annotation overlay engine.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    tools: ToolState,
    eraser: Eraser,
    document: Option<Document>,
    navigator: PageNavigator,
    capture: StrokeCapture,
    metrics: Option<SurfaceMetrics>,
    layout: LayoutCoalescer,
    pending_text: Option<TextRequest>,
    next_text_id: u64,
    latest_load: u64,
    opened: u64,
    revision: u64,
    saved_revision: u64,
    notices: VecDeque<Notice>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine with no document loaded.
    ///
    /// Unusable numeric settings fall back to their defaults.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        Self {
            tools: config.tools.clone(),
            eraser: Eraser::new(config.erase_threshold),
            layout: LayoutCoalescer::new(config.resize_delay_ms, config.orientation_delay_ms),
            config,
            document: None,
            navigator: PageNavigator::default(),
            capture: StrokeCapture::new(),
            metrics: None,
            pending_text: None,
            next_text_id: 0,
            latest_load: 0,
            opened: 0,
            revision: 0,
            saved_revision: 0,
            notices: VecDeque::new(),
        }
    }

    // ---- accessors ---------------------------------------------------------

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current tool selection.
    #[must_use]
    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    /// CSS cursor for the active tool.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        self.tools.active_tool.cursor()
    }

    /// Open document, if any.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Annotations of the open document.
    #[must_use]
    pub fn annotations(&self) -> Option<&AnnotationSet> {
        self.document.as_ref().map(|d| &d.annotations)
    }

    /// Zero-based current page.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.navigator.current()
    }

    /// Page count of the open document, zero without one.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.navigator.total()
    }

    /// Page indicator text.
    #[must_use]
    pub fn page_label(&self) -> String {
        self.navigator.label()
    }

    /// Whether "previous page" is available.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.navigator.can_go_back()
    }

    /// Whether "next page" is available.
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.navigator.can_go_forward()
    }

    /// Last calibrated surface metrics.
    #[must_use]
    pub fn metrics(&self) -> Option<&SurfaceMetrics> {
        self.metrics.as_ref()
    }

    /// Stroke being drawn, if any.
    #[must_use]
    pub fn in_progress(&self) -> Option<&Annotation> {
        self.capture.in_progress()
    }

    /// Whether a stroke is being drawn.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    /// Outstanding text request.
    #[must_use]
    pub fn pending_text(&self) -> Option<&TextRequest> {
        self.pending_text.as_ref()
    }

    /// Whether the store changed since the last successful save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.document.is_some() && self.revision != self.saved_revision
    }

    /// What a full redraw of the current page shows, in z-order.
    ///
    /// Committed annotations come first, then the in-progress stroke when it
    /// belongs to the current page.
    pub fn visible_annotations(&self) -> impl Iterator<Item = &Annotation> {
        let page = self.navigator.current();
        self.annotations()
            .into_iter()
            .flat_map(move |set| set.on_page(page))
            .chain(self.capture.in_progress().filter(move |a| a.page == page))
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // ---- tool selection ----------------------------------------------------

    /// Select a tool. A stroke in progress keeps its own kind.
    pub fn select_tool(&mut self, tool: Tool) {
        tracing::debug!(tool = tool.name(), "Tool selected");
        self.tools.select_tool(tool);
    }

    /// Select the ink color.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidColor`]; the selection is unchanged.
    pub fn select_color(&mut self, color: &str) -> OverlayResult<()> {
        self.tools.select_color(color)
    }

    /// Select the brush size.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidStrokeWidth`]; the selection is unchanged.
    pub fn set_stroke_width(&mut self, width: f64) -> OverlayResult<()> {
        self.tools.set_stroke_width(width)
    }

    // ---- input -------------------------------------------------------------

    /// Feed a raw mouse or touch event.
    pub fn handle_input(&mut self, event: &InputEvent) -> Effect {
        match event.unify() {
            Some(UnifiedInput::Begin { client_x, client_y }) => {
                self.pointer_down(client_x, client_y)
            }
            Some(UnifiedInput::Extend { client_x, client_y }) => {
                self.pointer_move(client_x, client_y)
            }
            Some(UnifiedInput::Finish) => self.pointer_up(),
            None => Effect::None,
        }
    }

    /// Contact started at a viewport position.
    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) -> Effect {
        if self.document.is_none() || self.capture.is_capturing() {
            return Effect::None;
        }
        let Some(point) = self.normalize(client_x, client_y) else {
            return Effect::None;
        };
        let page = self.navigator.current();
        let tool = self.tools.active_tool;
        match tool {
            Tool::Pen | Tool::Highlighter => {
                if let Some(kind) = tool.stroke_kind() {
                    self.capture.begin(
                        kind,
                        self.tools.color.clone(),
                        self.tools.stroke_width,
                        page,
                        point,
                    );
                }
                Effect::None
            }
            Tool::Eraser => self.erase_at(point),
            Tool::Text => {
                self.next_text_id += 1;
                let request = TextRequest {
                    id: self.next_text_id,
                    page,
                    anchor: point,
                    color: self.tools.color.clone(),
                    stroke_width: self.tools.stroke_width,
                };
                if let Some(old) = self.pending_text.replace(request.clone()) {
                    tracing::debug!(superseded = old.id, "Text request superseded");
                }
                Effect::RequestText(request)
            }
        }
    }

    /// Contact moved to a viewport position.
    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) -> Effect {
        if !self.capture.is_capturing() {
            return Effect::None;
        }
        self.normalize(client_x, client_y)
            .and_then(|point| self.capture.extend(point))
            .map_or(Effect::None, Effect::DrawSegment)
    }

    /// Contact ended.
    pub fn pointer_up(&mut self) -> Effect {
        match self.capture.finish() {
            CaptureOutcome::Committed(annotation) => match self.document.as_mut() {
                Some(document) => {
                    document.annotations.push(annotation);
                    self.revision += 1;
                    self.redraw()
                }
                None => Effect::None,
            },
            CaptureOutcome::Discarded | CaptureOutcome::NotCapturing => Effect::None,
        }
    }

    /// Erase around a normalized point on the current page.
    pub fn erase_at(&mut self, point: NormalizedPoint) -> Effect {
        let page = self.navigator.current();
        let Some(document) = self.document.as_mut() else {
            return Effect::None;
        };
        if self.eraser.erase(&mut document.annotations, page, &point) == 0 {
            return Effect::None;
        }
        self.revision += 1;
        self.redraw()
    }

    /// Remove every annotation on the current page.
    pub fn clear_page(&mut self) -> Effect {
        let page = self.navigator.current();
        let Some(document) = self.document.as_mut() else {
            return Effect::None;
        };
        let removed = document.annotations.clear_page(page);
        tracing::debug!(page, removed, "Page cleared");
        if removed == 0 {
            return Effect::None;
        }
        self.revision += 1;
        self.redraw()
    }

    /// Answer a text request. `None` or empty text cancels it.
    ///
    /// Requests that are stale or superseded are ignored.
    pub fn resolve_text(&mut self, request_id: u64, text: Option<String>) -> Effect {
        if self.pending_text.as_ref().map(|r| r.id) != Some(request_id) {
            tracing::debug!(request_id, "Ignoring stale text request");
            return Effect::None;
        }
        let Some(request) = self.pending_text.take() else {
            return Effect::None;
        };
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Effect::None;
        };
        let Some(document) = self.document.as_mut() else {
            return Effect::None;
        };
        document.annotations.push(Annotation::text(
            request.color,
            request.stroke_width,
            request.page,
            request.anchor,
            text,
        ));
        self.revision += 1;
        self.redraw()
    }

    /// Cancel a text request.
    pub fn cancel_text(&mut self, request_id: u64) -> Effect {
        self.resolve_text(request_id, None)
    }

    // ---- pages & layout ----------------------------------------------------

    /// Move by `delta` pages; out-of-range moves do nothing.
    pub fn advance(&mut self, delta: i64) -> Effect {
        if self.document.is_none() {
            return Effect::None;
        }
        match self.navigator.advance(delta) {
            Some(page) => {
                tracing::debug!(page, "Page changed");
                Effect::ShowPage(page)
            }
            None => Effect::None,
        }
    }

    /// Adopt freshly measured surface metrics.
    ///
    /// With a zero-area box the metrics are stored but drawing is deferred
    /// until a later calibration has a usable size.
    pub fn calibrate(&mut self, metrics: SurfaceMetrics) -> Effect {
        self.metrics = Some(metrics);
        if metrics.is_sized() {
            tracing::debug!(
                width = metrics.content_box.width,
                height = metrics.content_box.height,
                dpr = metrics.device_pixel_ratio,
                "Surface calibrated"
            );
            Effect::Recalibrate
        } else {
            tracing::debug!("Calibration deferred: content box has no area");
            Effect::None
        }
    }

    /// Note a resize or orientation change; schedule the returned ticket.
    pub fn note_layout_change(&mut self, change: LayoutChange) -> LayoutTicket {
        self.layout.note(change)
    }

    /// A layout timer fired; recalibrate if it was the last of its burst.
    pub fn settle_layout(&mut self, ticket: LayoutTicket, metrics: SurfaceMetrics) -> Effect {
        if self.layout.settle(ticket) {
            self.calibrate(metrics)
        } else {
            Effect::None
        }
    }

    // ---- persistence -------------------------------------------------------

    /// Start loading a document. Any earlier load becomes stale.
    pub fn begin_load(&mut self, document_id: impl Into<String>) -> LoadTicket {
        self.latest_load += 1;
        let document_id = document_id.into();
        tracing::debug!(document = %document_id, ticket = self.latest_load, "Load started");
        LoadTicket {
            id: self.latest_load,
            document_id,
        }
    }

    /// Apply the outcome of a load.
    ///
    /// On success the open document is replaced atomically: any stroke in
    /// progress and any pending text request are dropped. On failure nothing
    /// changes except a queued notice.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<LoadedDocument, GatewayError>,
    ) -> Effect {
        if ticket.id != self.latest_load {
            tracing::debug!(document = %ticket.document_id, "Ignoring superseded load");
            return Effect::None;
        }
        match result {
            Ok(loaded) => {
                let document = Document::from_loaded(loaded);
                tracing::info!(
                    document = %document.id,
                    pages = document.page_count(),
                    annotations = document.annotations.len(),
                    "Document loaded"
                );
                self.capture.abandon();
                self.pending_text = None;
                self.navigator.reset(document.page_count());
                self.opened += 1;
                self.revision = 0;
                self.saved_revision = 0;
                self.notices.push_back(Notice::Loaded {
                    document_id: document.id.clone(),
                    page_count: document.page_count(),
                    annotation_count: document.annotations.len(),
                });
                self.document = Some(document);
                Effect::ShowPage(0)
            }
            Err(e) => {
                tracing::warn!(document = %ticket.document_id, "Load failed: {}", e);
                self.notices.push_back(Notice::LoadFailed {
                    document_id: ticket.document_id.clone(),
                    message: e.to_string(),
                });
                Effect::None
            }
        }
    }

    /// Snapshot the store for saving. Drawing may continue meanwhile.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::NoDocument`] when nothing is open.
    pub fn save_request(&self) -> OverlayResult<PendingSave> {
        let document = self.document.as_ref().ok_or(OverlayError::NoDocument)?;
        Ok(PendingSave {
            request: SaveRequest {
                document_id: document.id.clone(),
                annotations: document.annotations.snapshot(),
            },
            revision: self.revision,
            opened: self.opened,
        })
    }

    /// Apply the outcome of a save.
    ///
    /// Only a save taken from the currently open copy of the document can
    /// mark it clean; one that outlived a reload or discard only reports.
    pub fn finish_save(&mut self, pending: &PendingSave, result: Result<(), GatewayError>) {
        let document_id = pending.request.document_id.clone();
        match result {
            Ok(()) => {
                tracing::info!(
                    document = %document_id,
                    annotations = pending.request.annotations.len(),
                    "Annotations saved"
                );
                // A reload or discard since the snapshot invalidates its revision.
                let same_opening = self.document.is_some() && pending.opened == self.opened;
                if same_opening && pending.revision > self.saved_revision {
                    self.saved_revision = pending.revision;
                }
                self.notices.push_back(Notice::Saved {
                    document_id,
                    annotation_count: pending.request.annotations.len(),
                });
            }
            Err(e) => {
                tracing::warn!(document = %document_id, "Save failed: {}", e);
                self.notices.push_back(Notice::SaveFailed {
                    document_id,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Close the open document, e.g. after it was deleted.
    pub fn discard_document(&mut self) -> Effect {
        let Some(document) = self.document.take() else {
            return Effect::None;
        };
        tracing::debug!(document = %document.id, "Document discarded");
        self.capture.abandon();
        self.pending_text = None;
        self.navigator.reset(0);
        self.opened += 1;
        self.revision = 0;
        self.saved_revision = 0;
        self.redraw()
    }

    fn normalize(&self, client_x: f64, client_y: f64) -> Option<NormalizedPoint> {
        self.metrics.and_then(|m| m.normalize(client_x, client_y))
    }

    fn redraw(&self) -> Effect {
        if self.metrics.is_some_and(|m| m.is_sized()) {
            Effect::Redraw
        } else {
            Effect::None
        }
    }
}
