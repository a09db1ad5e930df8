//! Page-scoped annotation storage.
//!
//! [`AnnotationSet`] keeps annotations in insertion order, which is also
//! their z-order. Every page-scoped view and removal preserves the relative
//! order of what remains.

use serde::{Deserialize, Serialize};

use crate::{Annotation, NormalizedPoint, OverlayResult};

/// Ordered annotations of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
}

impl AnnotationSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an annotation on top of everything else.
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Number of annotations across all pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// All annotations in z-order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Annotations of one page in z-order.
    pub fn on_page(&self, page: usize) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.page == page)
    }

    /// Count of annotations on one page.
    #[must_use]
    pub fn count_on_page(&self, page: usize) -> usize {
        self.on_page(page).count()
    }

    /// Remove every annotation on `page`. Returns how many were removed.
    pub fn clear_page(&mut self, page: usize) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.page != page);
        before - self.annotations.len()
    }

    /// Remove annotations on `page` lying within `threshold` of `point`.
    ///
    /// Strokes are removed whole. Returns how many were removed.
    pub fn remove_near(&mut self, page: usize, point: &NormalizedPoint, threshold: f64) -> usize {
        let before = self.annotations.len();
        self.annotations
            .retain(|a| a.page != page || !a.is_near(point, threshold));
        before - self.annotations.len()
    }

    /// Owned copy for a save in flight.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    /// Serialize to the wire JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OverlayError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> OverlayResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a wire JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OverlayError::Serialization`] for malformed input.
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Vec<Annotation>> for AnnotationSet {
    fn from(annotations: Vec<Annotation>) -> Self {
        Self { annotations }
    }
}

impl FromIterator<Annotation> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self {
            annotations: iter.into_iter().collect(),
        }
    }
}
