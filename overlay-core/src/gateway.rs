//! Persistence gateway seam.
//!
//! The engine never performs I/O itself. Hosts await a [`PersistenceGateway`]
//! and feed the result back into the engine, so the same engine runs against
//! the HTTP document service, the browser, or the in-memory gateway below.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::schema::{AnnotationRecord, LoadedDocument, SaveRequest};
use crate::GatewayError;

/// Load and save documents against an external service.
#[async_trait(?Send)]
pub trait PersistenceGateway {
    /// Fetch a document's page content and stored annotations.
    async fn load_document(&self, document_id: &str) -> Result<LoadedDocument, GatewayError>;

    /// Replace the stored annotation set of a document.
    async fn save_annotations(&self, request: &SaveRequest) -> Result<(), GatewayError>;
}

/// In-memory document service.
///
/// Clones share the same storage. Saves replace the stored annotations of a
/// known document, last write wins.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    documents: Arc<RwLock<HashMap<String, LoadedDocument>>>,
    offline: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document, replacing any with the same id.
    pub fn insert(&self, document: LoadedDocument) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        documents.insert(document.id.clone(), document);
    }

    /// Stored annotations of a document.
    #[must_use]
    pub fn stored_annotations(&self, document_id: &str) -> Option<Vec<AnnotationRecord>> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        documents.get(document_id).map(|d| d.annotations.clone())
    }

    /// Simulate the service being unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(GatewayError::Transport("service offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait(?Send)]
impl PersistenceGateway for MemoryGateway {
    async fn load_document(&self, document_id: &str) -> Result<LoadedDocument, GatewayError> {
        self.check_online()?;
        let documents = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(document_id.to_string()))
    }

    async fn save_annotations(&self, request: &SaveRequest) -> Result<(), GatewayError> {
        self.check_online()?;
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let document = documents
            .get_mut(&request.document_id)
            .ok_or_else(|| GatewayError::NotFound(request.document_id.clone()))?;
        document.annotations = request
            .annotations
            .iter()
            .cloned()
            .map(AnnotationRecord::from)
            .collect();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
