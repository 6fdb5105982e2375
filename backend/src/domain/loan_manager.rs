//! Read-only manager for loan requests.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::RecordStore;
use crate::domain::{
    Error, LOAN_REQUESTS_COLLECTION, LoanRequest, LoanRequestDocument, RecordId, TypedCollection,
};

/// Lists loan requests and keeps the last successful listing.
pub struct LoanManager<S> {
    loans: TypedCollection<S, LoanRequestDocument>,
    snapshot: Vec<LoanRequest>,
    rejected: Vec<RecordId>,
}

impl<S> LoanManager<S> {
    /// Manage the default `loan_requests` collection.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_collection(store, LOAN_REQUESTS_COLLECTION)
    }

    pub fn with_collection(store: Arc<S>, collection: impl Into<String>) -> Self {
        Self {
            loans: TypedCollection::new(store, collection),
            snapshot: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> &[LoanRequest] {
        &self.snapshot
    }

    /// Ids from the last successful listing whose documents did not decode.
    pub fn rejected(&self) -> &[RecordId] {
        &self.rejected
    }

    pub fn find(&self, id: &RecordId) -> Option<&LoanRequest> {
        self.snapshot.iter().find(|loan| loan.id() == id)
    }

    /// Cached loans whose advisory borrower reference matches `borrower`.
    pub fn for_borrower<'a>(
        &'a self,
        borrower: &'a RecordId,
    ) -> impl Iterator<Item = &'a LoanRequest> + 'a {
        self.snapshot
            .iter()
            .filter(move |loan| loan.borrower_ref() == Some(borrower))
    }
}

impl<S: RecordStore> LoanManager<S> {
    /// Reload every loan request and replace the snapshot.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the store cannot be read. The previous snapshot
    /// is kept. Undecodable documents are skipped and listed in
    /// [`Self::rejected`].
    pub async fn list_loans(&mut self) -> Result<&[LoanRequest], Error> {
        let listing = self.loans.list_all().await.map_err(|err| {
            warn!(collection = self.loans.name(), error = %err, "load loans failed");
            Error::from_store("failed to load loans", err)
        })?;
        self.snapshot = listing
            .records
            .into_iter()
            .map(|(id, document)| LoanRequest::from_document(id, document))
            .collect();
        self.rejected = listing.rejected;
        debug!(
            collection = self.loans.name(),
            count = self.snapshot.len(),
            rejected = self.rejected.len(),
            "loans loaded"
        );
        Ok(&self.snapshot)
    }
}
