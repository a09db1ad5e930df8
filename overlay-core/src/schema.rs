//! Wire representation of annotations and documents exchanged with the
//! document service.
//!
//! Annotations travel as flat records tagged by `type`:
//!
//! ```json
//! {"type": "highlighter", "color": "#FFEB3B", "size": 3, "page": 0,
//!  "points": [{"x": 0.1, "y": 0.1}, {"x": 0.5, "y": 0.1}]}
//! {"type": "text", "color": "#000000", "size": 3, "page": 1,
//!  "x": 0.2, "y": 0.4, "text": "see note"}
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::annotation::{validate_stroke_width, DEFAULT_COLOR};
use crate::document::PageContent;
use crate::{Annotation, Color, NormalizedPoint, OverlayError, Shape, StrokeKind};

/// Brush size assumed when a record omits `size`.
pub const DEFAULT_SIZE: f64 = 3.0;

/// A single annotation as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationRecord {
    /// Pen stroke. Older clients wrote these as `"pen"`.
    #[serde(alias = "pen")]
    Stroke(StrokeRecord),
    /// Highlighter stroke.
    Highlighter(StrokeRecord),
    /// Text label.
    Text(TextRecord),
}

/// Fields of a stroke record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    /// Hex color.
    #[serde(default = "default_color")]
    pub color: String,
    /// Brush size.
    #[serde(default = "default_size")]
    pub size: f64,
    /// Zero-based page index.
    #[serde(default)]
    pub page: usize,
    /// Normalized points.
    #[serde(default)]
    pub points: Vec<NormalizedPoint>,
}

/// Fields of a text record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Hex color.
    #[serde(default = "default_color")]
    pub color: String,
    /// Brush size; font size is ten times this.
    #[serde(default = "default_size")]
    pub size: f64,
    /// Zero-based page index.
    #[serde(default)]
    pub page: usize,
    /// Normalized anchor x.
    pub x: f64,
    /// Normalized anchor y.
    pub y: f64,
    /// Label content.
    pub text: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

const fn default_size() -> f64 {
    DEFAULT_SIZE
}

impl AnnotationRecord {
    /// Page the record belongs to.
    #[must_use]
    pub fn page(&self) -> usize {
        match self {
            Self::Stroke(s) | Self::Highlighter(s) => s.page,
            Self::Text(t) => t.page,
        }
    }
}

impl TryFrom<AnnotationRecord> for Annotation {
    type Error = OverlayError;

    fn try_from(record: AnnotationRecord) -> Result<Self, Self::Error> {
        match record {
            AnnotationRecord::Stroke(s) => stroke_from(StrokeKind::Pen, s),
            AnnotationRecord::Highlighter(s) => stroke_from(StrokeKind::Highlighter, s),
            AnnotationRecord::Text(t) => Ok(Annotation::text(
                Color::parse(&t.color)?,
                validate_stroke_width(t.size)?,
                t.page,
                NormalizedPoint::new(t.x, t.y),
                t.text,
            )),
        }
    }
}

fn stroke_from(kind: StrokeKind, record: StrokeRecord) -> Result<Annotation, OverlayError> {
    Ok(Annotation::stroke(
        kind,
        Color::parse(&record.color)?,
        validate_stroke_width(record.size)?,
        record.page,
        record.points,
    ))
}

impl From<Annotation> for AnnotationRecord {
    fn from(annotation: Annotation) -> Self {
        let Annotation {
            color,
            stroke_width,
            page,
            shape,
        } = annotation;
        match shape {
            Shape::Stroke { points, kind } => {
                let record = StrokeRecord {
                    color: color.into(),
                    size: stroke_width,
                    page,
                    points,
                };
                match kind {
                    StrokeKind::Pen => Self::Stroke(record),
                    StrokeKind::Highlighter => Self::Highlighter(record),
                }
            }
            Shape::Text { anchor, text } => Self::Text(TextRecord {
                color: color.into(),
                size: stroke_width,
                page,
                x: anchor.x,
                y: anchor.y,
                text,
            }),
        }
    }
}

/// A document as returned by a persistence gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedDocument {
    /// Document identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub filename: String,
    /// Page images or plain text.
    pub page_content: PageContent,
    /// Stored annotations, not yet validated against the page count.
    #[serde(default, deserialize_with = "lenient_records")]
    pub annotations: Vec<AnnotationRecord>,
}

/// Deserialize annotation records, skipping entries that are not records at all.
///
/// Unknown `type` tags and malformed fields drop the single entry with a
/// warning instead of failing the whole document.
///
/// # Errors
///
/// Fails only when the value is not an array.
pub fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<AnnotationRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let total = raw.len();
    let records: Vec<AnnotationRecord> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping unreadable annotation record: {}", e);
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::warn!("Kept {} of {} annotation records", records.len(), total);
    }
    Ok(records)
}

/// Replace-all save payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Target document.
    pub document_id: String,
    /// Complete annotation set, in z-order.
    pub annotations: Vec<Annotation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pen_alias_loads_as_stroke_and_saves_as_stroke() {
        let value = json!({
            "type": "pen", "color": "#000000", "size": 2, "page": 1,
            "points": [{"x": 0.1, "y": 0.2}, {"x": 0.3, "y": 0.4}]
        });
        let annotation: Annotation = serde_json::from_value(value).expect("pen record");
        assert_eq!(annotation.stroke_kind(), Some(StrokeKind::Pen));
        assert_eq!(annotation.page, 1);

        let back = serde_json::to_value(&annotation).expect("serialize");
        assert_eq!(back["type"], "stroke");
        assert_eq!(back["size"], 2.0);
    }

    #[test]
    fn text_record_uses_flat_anchor() {
        let value = json!({
            "type": "text", "color": "#FF0000", "size": 3, "page": 0,
            "x": 0.25, "y": 0.75, "text": "hello"
        });
        let annotation: Annotation = serde_json::from_value(value).expect("text record");
        match &annotation.shape {
            Shape::Text { anchor, text } => {
                assert!((anchor.x - 0.25).abs() < f64::EPSILON);
                assert!((anchor.y - 0.75).abs() < f64::EPSILON);
                assert_eq!(text, "hello");
            }
            Shape::Stroke { .. } => panic!("expected text"),
        }
        let back = serde_json::to_value(&annotation).expect("serialize");
        assert_eq!(back["x"], 0.25);
        assert!(back.get("points").is_none());
    }

    #[test]
    fn missing_size_and_page_take_defaults() {
        let value = json!({"type": "highlighter", "color": "#FFEB3B",
            "points": [{"x": 0.0, "y": 0.0}, {"x": 1.0, "y": 1.0}]});
        let annotation: Annotation = serde_json::from_value(value).expect("defaults");
        assert!((annotation.stroke_width - DEFAULT_SIZE).abs() < f64::EPSILON);
        assert_eq!(annotation.page, 0);
    }

    #[test]
    fn invalid_color_is_rejected() {
        let value = json!({"type": "stroke", "color": "blue", "points": []});
        assert!(serde_json::from_value::<Annotation>(value).is_err());
    }

    #[test]
    fn loaded_document_skips_unknown_records() {
        let value = json!({
            "id": "doc-1",
            "filename": "notes.pdf",
            "pageContent": "plain text body",
            "annotations": [
                {"type": "laser", "points": []},
                {"type": "text", "x": 0.1, "y": 0.1, "text": "ok"},
                {"type": "stroke", "page": -1, "points": []}
            ]
        });
        let doc: LoadedDocument = serde_json::from_value(value).expect("document");
        assert_eq!(doc.annotations.len(), 1);
        assert!(matches!(doc.annotations[0], AnnotationRecord::Text(_)));
    }

    #[test]
    fn save_request_uses_document_id_key() {
        let request = SaveRequest {
            document_id: "doc-9".into(),
            annotations: Vec::new(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value, json!({"documentId": "doc-9", "annotations": []}));
    }
}
