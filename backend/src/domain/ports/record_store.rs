//! Driven port for keyed document collections.
//!
//! The [`RecordStore`] trait is the only seam between the entity managers and
//! durable storage. It deals in raw JSON documents addressed by collection name
//! and store-assigned [`RecordId`]; it knows nothing about users or loans.
//! Typed access sits one layer up in [`crate::domain::TypedCollection`].
//!
//! Adapters must honour these semantics:
//!
//! - `list_all` returns every document with its id alongside, never inside,
//!   the document body. Order is adapter-defined.
//! - `create` assigns the id. The body it receives never carries one.
//! - `update_fields` merges top-level fields; fields absent from `partial`
//!   are left untouched.
//! - `update_fields` and `delete_by_id` report a missing id as
//!   [`RecordStoreError::NotFound`].

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::RecordId;

use super::define_port_error;

/// JSON object body of a stored document, without its id.
pub type Document = Map<String, Value>;

/// Document returned from a collection listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Field values exactly as the store holds them.
    pub fields: Document,
}

impl StoredDocument {
    /// Pair an identifier with its document body.
    pub fn new(id: RecordId, fields: Document) -> Self {
        Self { id, fields }
    }
}

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// Transport, authentication, timeout or backend failure.
        Unavailable { message: String } => "record store unavailable: {message}",
        /// The targeted id does not exist in the collection.
        NotFound { collection: String, id: String } =>
            "record {id} not found in {collection}",
        /// The store refused the submitted document.
        Rejected { message: String } => "record store rejected document: {message}",
        /// A stored document could not be decoded into the expected shape.
        Malformed { message: String } => "malformed record: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return every document in `collection`.
    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, RecordStoreError>;

    /// Persist a new document and return its store-assigned id.
    async fn create(&self, collection: &str, data: Document)
    -> Result<RecordId, RecordStoreError>;

    /// Merge `partial` into the document identified by `id`.
    async fn update_fields(
        &self,
        collection: &str,
        id: &RecordId,
        partial: Document,
    ) -> Result<(), RecordStoreError>;

    /// Remove the document identified by `id`.
    async fn delete_by_id(&self, collection: &str, id: &RecordId)
    -> Result<(), RecordStoreError>;
}
