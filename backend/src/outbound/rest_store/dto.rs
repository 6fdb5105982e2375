//! DTOs for the document API payloads.
//!
//! Listings carry the id inside each element; the adapter splits it out before
//! handing documents to the domain.

use serde::Deserialize;

use crate::domain::RecordId;
use crate::domain::ports::{Document, StoredDocument};

#[derive(Debug, Deserialize)]
pub(super) struct ListedDocumentDto {
    pub(super) id: RecordId,
    #[serde(flatten)]
    pub(super) fields: Document,
}

impl From<ListedDocumentDto> for StoredDocument {
    fn from(value: ListedDocumentDto) -> Self {
        StoredDocument::new(value.id, value.fields)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedDocumentDto {
    pub(super) id: RecordId,
}
