//! In-memory `RecordStore` adapter.
//!
//! Collections keep insertion order and ids are random UUIDs. The store can be
//! switched offline to exercise failure paths: while unavailable every call
//! fails with [`RecordStoreError::Unavailable`] and nothing is changed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::RecordId;
use crate::domain::ports::{Document, RecordStore, RecordStoreError, StoredDocument};

/// Field name the store reserves for identifiers.
const RESERVED_ID_FIELD: &str = "id";

/// Process-local record store.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    collections: Mutex<HashMap<String, Vec<StoredDocument>>>,
    available: AtomicBool,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Create an empty, available store.
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage (`false`) or recovery (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Insert a document directly, ignoring availability.
    ///
    /// # Errors
    ///
    /// Same validation as [`RecordStore::create`].
    pub fn seed(&self, collection: &str, data: Document) -> Result<RecordId, RecordStoreError> {
        self.insert(collection, data)
    }

    /// Copy of the durable contents of `collection`, ignoring availability.
    ///
    /// # Errors
    ///
    /// Fails only if the internal lock is poisoned.
    pub fn documents(&self, collection: &str) -> Result<Vec<StoredDocument>, RecordStoreError> {
        Ok(self
            .lock()?
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<StoredDocument>>>, RecordStoreError> {
        self.collections
            .lock()
            .map_err(|_| RecordStoreError::unavailable("in-memory store lock poisoned"))
    }

    fn ensure_available(&self) -> Result<(), RecordStoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RecordStoreError::unavailable("in-memory store is offline"))
        }
    }

    fn insert(&self, collection: &str, data: Document) -> Result<RecordId, RecordStoreError> {
        if data.contains_key(RESERVED_ID_FIELD) {
            return Err(RecordStoreError::rejected(
                "documents must not carry the reserved `id` field",
            ));
        }
        let id = RecordId::new(Uuid::new_v4().to_string())
            .map_err(|err| RecordStoreError::unavailable(format!("id generation failed: {err}")))?;
        self.lock()?
            .entry(collection.to_owned())
            .or_default()
            .push(StoredDocument::new(id.clone(), data));
        debug!(collection, %id, "document created");
        Ok(id)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, RecordStoreError> {
        self.ensure_available()?;
        self.documents(collection)
    }

    async fn create(
        &self,
        collection: &str,
        data: Document,
    ) -> Result<RecordId, RecordStoreError> {
        self.ensure_available()?;
        self.insert(collection, data)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &RecordId,
        partial: Document,
    ) -> Result<(), RecordStoreError> {
        self.ensure_available()?;
        if partial.contains_key(RESERVED_ID_FIELD) {
            return Err(RecordStoreError::rejected(
                "updates must not touch the reserved `id` field",
            ));
        }
        let mut collections = self.lock()?;
        let document = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|doc| &doc.id == id))
            .ok_or_else(|| RecordStoreError::not_found(collection, id.as_str()))?;
        document.fields.extend(partial);
        Ok(())
    }

    async fn delete_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<(), RecordStoreError> {
        self.ensure_available()?;
        let mut collections = self.lock()?;
        let documents = collections
            .get_mut(collection)
            .ok_or_else(|| RecordStoreError::not_found(collection, id.as_str()))?;
        let before = documents.len();
        documents.retain(|doc| &doc.id != id);
        if documents.len() == before {
            return Err(RecordStoreError::not_found(collection, id.as_str()));
        }
        Ok(())
    }
}
