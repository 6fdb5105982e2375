//! Typed access to one named collection of a [`RecordStore`].
//!
//! The port itself speaks raw JSON documents. This wrapper binds a collection
//! name to a document shape `T` and handles (de)serialisation so managers can
//! work with typed bodies.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::domain::RecordId;
use crate::domain::ports::{Document, RecordStore, RecordStoreError, StoredDocument};

/// Decoded documents of one listing, in store order.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub records: Vec<(RecordId, T)>,
    /// Ids of documents that did not decode as `T`.
    pub rejected: Vec<RecordId>,
}

/// A named collection whose documents decode as `T`.
pub struct TypedCollection<S, T> {
    store: Arc<S>,
    name: String,
    _document: PhantomData<fn() -> T>,
}

impl<S, T> Clone for TypedCollection<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name.clone(),
            _document: PhantomData,
        }
    }
}

impl<S, T> TypedCollection<S, T> {
    /// Bind `name` on `store` to the document type `T`.
    pub fn new(store: Arc<S>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            _document: PhantomData,
        }
    }

    /// Collection name as known to the store.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl<S, T> TypedCollection<S, T>
where
    S: RecordStore,
    T: Serialize + DeserializeOwned,
{
    /// Fetch every document, decoding those that match `T`.
    ///
    /// Documents that do not decode are logged and returned by id in
    /// [`Listing::rejected`] so they stay visible to the operator.
    ///
    /// # Errors
    ///
    /// Fails only with the adapter's error.
    pub async fn list_all(&self) -> Result<Listing<T>, RecordStoreError> {
        let documents = self.store.list_all(&self.name).await?;
        let mut listing = Listing {
            records: Vec::with_capacity(documents.len()),
            rejected: Vec::new(),
        };
        for StoredDocument { id, fields } in documents {
            match serde_json::from_value(Value::Object(fields)) {
                Ok(body) => listing.records.push((id, body)),
                Err(err) => {
                    warn!(collection = %self.name, %id, error = %err, "skipping undecodable document");
                    listing.rejected.push(id);
                }
            }
        }
        Ok(listing)
    }

    /// Encode and persist a new document, returning its assigned id.
    ///
    /// # Errors
    ///
    /// Fails with the adapter's error, or [`RecordStoreError::Rejected`] when
    /// `data` does not encode as a JSON object.
    pub async fn create(&self, data: &T) -> Result<RecordId, RecordStoreError> {
        let document = encode_object(data)?;
        self.store.create(&self.name, document).await
    }

    /// Merge an already-encoded partial document into `id`.
    pub async fn update_fields(
        &self,
        id: &RecordId,
        partial: Document,
    ) -> Result<(), RecordStoreError> {
        self.store.update_fields(&self.name, id, partial).await
    }

    /// Remove `id` from the collection.
    pub async fn delete_by_id(&self, id: &RecordId) -> Result<(), RecordStoreError> {
        self.store.delete_by_id(&self.name, id).await
    }
}

fn encode_object<T: Serialize>(data: &T) -> Result<Document, RecordStoreError> {
    match serde_json::to_value(data) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(RecordStoreError::rejected(format!(
            "document must be a JSON object, got {other}"
        ))),
        Err(err) => Err(RecordStoreError::rejected(format!(
            "document could not be encoded: {err}"
        ))),
    }
}
