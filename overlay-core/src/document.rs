//! The loaded document: page content plus its annotations.

use serde::{Deserialize, Serialize};

use crate::schema::LoadedDocument;
use crate::{Annotation, AnnotationSet};

/// What the pages are made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageContent {
    /// One raster image per page (URLs or data URIs).
    Images(Vec<String>),
    /// A single page of plain text.
    Text(String),
}

impl PageContent {
    /// Number of pages; plain text and an empty image list count as one.
    #[must_use]
    pub fn page_count(&self) -> usize {
        match self {
            Self::Images(images) => images.len().max(1),
            Self::Text(_) => 1,
        }
    }

    /// Image source for a page, if the content is raster.
    #[must_use]
    pub fn image(&self, page: usize) -> Option<&str> {
        match self {
            Self::Images(images) => images.get(page).map(String::as_str),
            Self::Text(_) => None,
        }
    }
}

/// A document open in the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier used by the document service.
    pub id: String,
    /// Display name.
    pub filename: String,
    /// Page content.
    pub content: PageContent,
    /// Annotations of every page.
    pub annotations: AnnotationSet,
}

impl Document {
    /// Create a document with no annotations.
    #[must_use]
    pub fn new(id: impl Into<String>, filename: impl Into<String>, content: PageContent) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            content,
            annotations: AnnotationSet::new(),
        }
    }

    /// Page count.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.content.page_count()
    }

    /// Build a document from gateway data.
    ///
    /// Records that fail validation, cannot be drawn, or point at a page the
    /// document does not have are dropped with a warning.
    #[must_use]
    pub fn from_loaded(loaded: LoadedDocument) -> Self {
        let LoadedDocument {
            id,
            filename,
            page_content,
            annotations: records,
        } = loaded;
        let page_count = page_content.page_count();
        let total = records.len();

        let annotations: AnnotationSet = records
            .into_iter()
            .filter_map(|record| match Annotation::try_from(record) {
                Ok(a) if !a.is_renderable() => {
                    tracing::warn!(document = %id, page = a.page, "Dropping empty annotation");
                    None
                }
                Ok(a) if a.page >= page_count => {
                    tracing::warn!(
                        document = %id,
                        page = a.page,
                        page_count,
                        "Dropping annotation on missing page"
                    );
                    None
                }
                Ok(a) => Some(a),
                Err(e) => {
                    tracing::warn!(document = %id, "Dropping invalid annotation: {}", e);
                    None
                }
            })
            .collect();

        if annotations.len() < total {
            tracing::warn!(
                document = %id,
                kept = annotations.len(),
                total,
                "Some stored annotations were not loaded"
            );
        }

        Self {
            id,
            filename,
            content: page_content,
            annotations,
        }
    }
}
