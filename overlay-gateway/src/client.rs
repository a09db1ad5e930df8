//! HTTP client for the document service.
//!
//! Routes:
//!
//! | Method | Path                    | Success body                          |
//! |--------|-------------------------|---------------------------------------|
//! | GET    | `/get_document/{id}`    | document record                       |
//! | POST   | `/save_annotations`     | `{"success": true}`                   |
//! | GET    | `/list_documents`       | `{"success": true, "documents": [..]}` |
//! | DELETE | `/delete_document/{id}` | `{"success": true}`                   |
//!
//! Failures answer `{"error": "..."}`, with 404 for unknown documents.

use async_trait::async_trait;
use overlay_core::schema::lenient_records;
use overlay_core::{
    AnnotationRecord, GatewayError, LoadedDocument, PageContent, PersistenceGateway, SaveRequest,
};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::{ConfigError, GatewayConfig};

/// Entry of the document listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document identifier.
    pub id: String,
    /// Original file name.
    pub filename: String,
    /// Upload time as reported by the service.
    #[serde(default)]
    pub date: String,
    /// Source file type, e.g. `pdf` or `image`.
    #[serde(default)]
    pub file_type: String,
}

/// Document record as stored by the service.
#[derive(Debug, Deserialize)]
struct ServiceDocument {
    id: String,
    #[serde(default)]
    original_name: Option<String>,
    #[serde(default)]
    text_content: Option<String>,
    #[serde(default)]
    image_data: Vec<String>,
    #[serde(default, deserialize_with = "lenient_records")]
    annotations: Vec<AnnotationRecord>,
}

impl From<ServiceDocument> for LoadedDocument {
    fn from(doc: ServiceDocument) -> Self {
        let page_content = if doc.image_data.is_empty() {
            PageContent::Text(doc.text_content.unwrap_or_default())
        } else {
            PageContent::Images(doc.image_data)
        };
        Self {
            filename: doc.original_name.unwrap_or_else(|| doc.id.clone()),
            id: doc.id,
            page_content,
            annotations: doc.annotations,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<DocumentSummary>,
}

/// [`PersistenceGateway`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Create a gateway for the configured service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Client`] if the HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(config.timeout)
            .user_agent(concat!("saorsa-overlay/", env!("CARGO_PKG_VERSION")));
        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    /// Service base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List documents known to the service, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure or an error payload.
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>, GatewayError> {
        let url = self.endpoint(&["list_documents"])?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        let body = read_json(response, "document list").await?;
        let list: DocumentList =
            serde_json::from_value(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;
        tracing::debug!("Listed {} documents", list.documents.len());
        Ok(list.documents)
    }

    /// Delete a document and its annotations.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for unknown ids and other
    /// [`GatewayError`]s on failure.
    pub async fn delete_document(&self, document_id: &str) -> Result<(), GatewayError> {
        let url = self.endpoint(&["delete_document", document_id])?;
        let response = self.http.delete(url).send().await.map_err(transport)?;
        read_json(response, document_id).await?;
        tracing::info!(document = %document_id, "Document deleted");
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::Malformed(format!("{} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait(?Send)]
impl PersistenceGateway for HttpGateway {
    async fn load_document(&self, document_id: &str) -> Result<LoadedDocument, GatewayError> {
        let url = self.endpoint(&["get_document", document_id])?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        let body = read_json(response, document_id).await?;
        let document: ServiceDocument =
            serde_json::from_value(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Ok(document.into())
    }

    async fn save_annotations(&self, request: &SaveRequest) -> Result<(), GatewayError> {
        let url = self.endpoint(&["save_annotations"])?;
        let payload = json!({
            "doc_id": request.document_id,
            "annotations": request.annotations,
        });
        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(transport)?;
        read_json(response, &request.document_id).await?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    tracing::warn!("Document service request failed: {}", err);
    GatewayError::Transport(err.to_string())
}

/// Read a JSON body and turn service-level failures into errors.
///
/// `resource` names what was asked for and ends up in `NotFound`.
async fn read_json(response: Response, resource: &str) -> Result<Value, GatewayError> {
    let status = response.status();
    let body = match response.json::<Value>().await {
        Ok(body) => body,
        Err(e) if status.is_success() => return Err(GatewayError::Malformed(e.to_string())),
        Err(_) => Value::Null,
    };

    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(resource.to_string()));
    }
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(GatewayError::Service(message.to_string()));
    }
    if !status.is_success() {
        return Err(GatewayError::Transport(format!("HTTP {status}")));
    }
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(GatewayError::Service("request rejected".to_string()));
    }
    Ok(body)
}
