//! Deadline wrapper for any `RecordStore`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::RecordId;
use crate::domain::ports::{Document, RecordStore, RecordStoreError, StoredDocument};

/// Bounds every call on the wrapped store with a fixed timeout.
///
/// An expired call reports [`RecordStoreError::Unavailable`]. The inner future
/// is dropped, so whether the store applied the write is unknown to the caller.
#[derive(Debug)]
pub struct TimeoutRecordStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S> TimeoutRecordStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        collection: &str,
        call: impl Future<Output = Result<T, RecordStoreError>>,
    ) -> Result<T, RecordStoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                warn!(collection, operation, timeout = ?self.timeout, "record store call timed out");
                Err(RecordStoreError::unavailable(format!(
                    "{operation} on {collection} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            })
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for TimeoutRecordStore<S> {
    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, RecordStoreError> {
        self.bounded("list", collection, self.inner.list_all(collection))
            .await
    }

    async fn create(
        &self,
        collection: &str,
        data: Document,
    ) -> Result<RecordId, RecordStoreError> {
        self.bounded("create", collection, self.inner.create(collection, data))
            .await
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &RecordId,
        partial: Document,
    ) -> Result<(), RecordStoreError> {
        self.bounded(
            "update",
            collection,
            self.inner.update_fields(collection, id, partial),
        )
        .await
    }

    async fn delete_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<(), RecordStoreError> {
        self.bounded("delete", collection, self.inner.delete_by_id(collection, id))
            .await
    }
}
