//! # Saorsa Overlay Inspector
//!
//! Command-line access to the document service: list documents, summarize
//! their annotations per page and render a page with its markup to SVG.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p overlay-cli -- list
//! cargo run -p overlay-cli -- show doc-1
//! cargo run -p overlay-cli -- render doc-1 --page 2 --dpr 2 --out page2.svg
//! ```
//!
//! The service address comes from `--service-url` or `OVERLAY_SERVICE_URL`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use overlay_core::{ContentBox, Document, GatewayError, StrokeKind, SurfaceMetrics};
use overlay_gateway::{
    ConfigError, GatewayConfig, DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_MS, SERVICE_URL_ENV,
    TIMEOUT_ENV,
};
use overlay_renderer::{RenderError, Renderer, SvgSurface};
use serde::Serialize;
use thiserror::Error;

/// Command-line arguments for overlay-inspect.
#[derive(Debug, Clone, Parser)]
#[command(name = "overlay-inspect")]
#[command(about = "Inspect annotated documents in the Saorsa Overlay service")]
#[command(version)]
pub struct CliArgs {
    /// Document service base URL
    #[arg(long, env = SERVICE_URL_ENV, default_value = DEFAULT_SERVICE_URL)]
    pub service_url: String,

    /// Request timeout in milliseconds
    #[arg(long, env = TIMEOUT_ENV, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Inspector subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List documents known to the service
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Summarize a document's annotations page by page
    Show {
        /// Document id
        id: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Render one page with its annotations to SVG
    Render {
        /// Document id
        id: String,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Layout width in CSS pixels
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        /// Layout height in CSS pixels
        #[arg(long, default_value_t = 1100.0)]
        height: f64,
        /// Device pixel ratio
        #[arg(long, default_value_t = 1.0)]
        dpr: f64,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete a document and its annotations
    Delete {
        /// Document id
        id: String,
    },
}

impl CliArgs {
    /// Gateway configuration from the service arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for an unusable service URL.
    pub fn gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        GatewayConfig::new(&self.service_url, Duration::from_millis(self.timeout_ms))
    }
}

/// Inspector failures.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The requested page does not exist.
    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Requested page, 1-based.
        page: usize,
        /// Pages in the document.
        count: usize,
    },

    /// Layout size unusable for rendering.
    #[error("Invalid layout size {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// Drawing failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The document service failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Annotation counts of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page number, starting at 1.
    pub page: usize,
    /// Pen strokes.
    pub pens: usize,
    /// Highlighter strokes.
    pub highlighters: usize,
    /// Text labels.
    pub texts: usize,
}

impl PageSummary {
    /// All annotations on the page.
    #[must_use]
    pub fn total(&self) -> usize {
        self.pens + self.highlighters + self.texts
    }
}

impl fmt::Display for PageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {:>3}: {:>3} pen  {:>3} highlighter  {:>3} text",
            self.page, self.pens, self.highlighters, self.texts
        )
    }
}

/// Per-page annotation counts for every page of `document`.
#[must_use]
pub fn page_summaries(document: &Document) -> Vec<PageSummary> {
    (0..document.page_count())
        .map(|page| {
            let mut summary = PageSummary {
                page: page + 1,
                pens: 0,
                highlighters: 0,
                texts: 0,
            };
            for annotation in document.annotations.on_page(page) {
                match annotation.stroke_kind() {
                    Some(StrokeKind::Pen) => summary.pens += 1,
                    Some(StrokeKind::Highlighter) => summary.highlighters += 1,
                    None => summary.texts += 1,
                }
            }
            summary
        })
        .collect()
}

/// Render page `page` (1-based) of `document` at the given layout size.
///
/// Image pages are placed underneath the annotations.
///
/// # Errors
///
/// Returns [`InspectError::PageOutOfRange`] for a missing page,
/// [`InspectError::InvalidSize`] for a zero-area layout and
/// [`InspectError::Render`] if drawing fails.
pub fn render_page(
    document: &Document,
    page: usize,
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
) -> Result<String, InspectError> {
    let count = document.page_count();
    if page == 0 || page > count {
        return Err(InspectError::PageOutOfRange { page, count });
    }
    let index = page - 1;

    let metrics = SurfaceMetrics::new(
        ContentBox {
            left: 0.0,
            top: 0.0,
            width,
            height,
        },
        device_pixel_ratio,
    );
    if !metrics.is_sized() {
        return Err(InspectError::InvalidSize { width, height });
    }

    let surface = match document.content.image(index) {
        Some(href) => SvgSurface::new().with_background(href),
        None => SvgSurface::new(),
    };
    let mut renderer = Renderer::new(surface);
    renderer.recalibrate(metrics)?;
    renderer.redraw(document.annotations.on_page(index))?;
    tracing::debug!(
        "Rendered page {} of {} with {} annotations",
        page,
        document.id,
        document.annotations.count_on_page(index)
    );
    Ok(renderer.into_surface().to_svg())
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_core::{Annotation, Color, NormalizedPoint, PageContent};

    fn document() -> Document {
        let mut doc = Document::new(
            "doc-1",
            "scan.pdf",
            PageContent::Images(vec!["p1.png".into(), "p2.png".into()]),
        );
        let points = vec![NormalizedPoint::new(0.1, 0.1), NormalizedPoint::new(0.5, 0.1)];
        doc.annotations.push(Annotation::stroke(
            StrokeKind::Pen,
            Color::default(),
            3.0,
            0,
            points.clone(),
        ));
        doc.annotations.push(Annotation::stroke(
            StrokeKind::Highlighter,
            Color::default(),
            3.0,
            1,
            points,
        ));
        doc.annotations.push(Annotation::text(
            Color::default(),
            2.0,
            1,
            NormalizedPoint::new(0.5, 0.5),
            "note",
        ));
        doc
    }

    #[test]
    fn parses_render_arguments() {
        let args = CliArgs::try_parse_from([
            "overlay-inspect",
            "--service-url",
            "http://docs.local:8080/",
            "render",
            "doc-1",
            "--page",
            "2",
            "--dpr",
            "2",
        ])
        .expect("parse");
        assert_eq!(args.service_url, "http://docs.local:8080/");
        match args.command {
            Command::Render { id, page, dpr, .. } => {
                assert_eq!(id, "doc-1");
                assert_eq!(page, 2);
                assert!((dpr - 2.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn summaries_count_by_kind() {
        let summaries = page_summaries(&document());
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].pens, 1);
        assert_eq!(summaries[0].total(), 1);
        assert_eq!(summaries[1].highlighters, 1);
        assert_eq!(summaries[1].texts, 1);
    }

    #[test]
    fn render_scales_backing_by_pixel_ratio() {
        let svg = render_page(&document(), 1, 400.0, 300.0, 2.0).expect("render");
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("viewBox=\"0 0 400 300\""));
        assert!(svg.contains("p1.png"));
        assert!(!svg.contains("note"));
    }

    #[test]
    fn render_rejects_missing_page() {
        let err = render_page(&document(), 3, 400.0, 300.0, 1.0).unwrap_err();
        assert!(matches!(err, InspectError::PageOutOfRange { page: 3, count: 2 }));
        let err = render_page(&document(), 0, 400.0, 300.0, 1.0).unwrap_err();
        assert!(matches!(err, InspectError::PageOutOfRange { .. }));
    }

    #[test]
    fn render_rejects_zero_area() {
        let err = render_page(&document(), 1, 0.0, 300.0, 1.0).unwrap_err();
        assert!(matches!(err, InspectError::InvalidSize { .. }));
    }
}
