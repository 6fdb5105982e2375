//! User entity manager: CRUD and the verification state machine.
//!
//! The manager keeps a snapshot of the last successful listing. Mutations are
//! written through to the record store first and reflected in the snapshot
//! only once the store has confirmed them, so a failed write never leaves the
//! snapshot ahead of durable state.

use std::sync::Arc;

use mockable::Clock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::ports::{Document, RecordStore, RecordStoreError};
use crate::domain::{
    Error, RecordId, TypedCollection, USERS_COLLECTION, User, UserDocument, UserDraft, UserPatch,
    UserStatus,
};

/// Owns user CRUD against one collection plus the local snapshot.
pub struct UserManager<S> {
    users: TypedCollection<S, UserDocument>,
    clock: Arc<dyn Clock>,
    snapshot: Vec<User>,
    rejected: Vec<RecordId>,
}

impl<S> UserManager<S> {
    /// Manage the default `users` collection.
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use admin_core::domain::UserManager;
    /// # use admin_core::outbound::memory::InMemoryRecordStore;
    /// # use mockable::DefaultClock;
    /// # async fn example() -> Result<(), admin_core::domain::Error> {
    /// let mut users = UserManager::new(Arc::new(InMemoryRecordStore::new()), Arc::new(DefaultClock));
    /// let listed = users.list_users().await?;
    /// assert!(listed.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self::with_collection(store, USERS_COLLECTION, clock)
    }

    /// Manage a custom collection name.
    pub fn with_collection(
        store: Arc<S>,
        collection: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users: TypedCollection::new(store, collection),
            clock,
            snapshot: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Users from the last successful listing, plus confirmed local changes.
    pub fn snapshot(&self) -> &[User] {
        &self.snapshot
    }

    /// Ids from the last successful listing whose documents did not decode.
    pub fn rejected(&self) -> &[RecordId] {
        &self.rejected
    }

    /// Find a cached user without touching the store.
    pub fn find(&self, id: &RecordId) -> Option<&User> {
        self.snapshot.iter().find(|user| user.id() == id)
    }

    fn find_mut(&mut self, id: &RecordId) -> Option<&mut User> {
        self.snapshot.iter_mut().find(|user| user.id() == id)
    }

    fn failure(&self, action: &str, id: Option<&RecordId>, error: RecordStoreError) -> Error {
        let id = id.map(RecordId::as_str);
        warn!(collection = self.users.name(), ?id, error = %error, "{action} failed");
        Error::from_store(&format!("failed to {action}"), error)
    }
}

impl<S: RecordStore> UserManager<S> {
    /// Reload every user from the store and replace the snapshot.
    ///
    /// # Errors
    ///
    /// Any store failure is returned and the previous snapshot is kept, so the
    /// caller can keep showing stale data alongside a notice. Documents that do
    /// not decode are left out of the snapshot and listed in [`Self::rejected`].
    pub async fn list_users(&mut self) -> Result<&[User], Error> {
        let listing = self
            .users
            .list_all()
            .await
            .map_err(|err| self.failure("load users", None, err))?;
        self.snapshot = listing
            .records
            .into_iter()
            .map(|(id, document)| User::from_document(id, document))
            .collect();
        self.rejected = listing.rejected;
        debug!(
            collection = self.users.name(),
            count = self.snapshot.len(),
            rejected = self.rejected.len(),
            "users loaded"
        );
        Ok(&self.snapshot)
    }

    /// Persist a new user built from `draft` and return it with its id.
    ///
    /// Status defaults to `Pending`. `createdAt` is taken from the clock.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` or `ValidationRejected` from the store. The snapshot
    /// is not touched on failure.
    pub async fn add_user(&mut self, draft: UserDraft) -> Result<User, Error> {
        let document = draft.into_document(self.clock.utc());
        let id = self
            .users
            .create(&document)
            .await
            .map_err(|err| self.failure("add user", None, err))?;
        let user = User::from_document(id, document);
        debug!(collection = self.users.name(), id = %user.id(), "user added");
        self.snapshot.push(user.clone());
        Ok(user)
    }

    /// Record an operator's verification decision.
    ///
    /// Verifying an already verified user is accepted and leaves it verified.
    /// The write always reaches the store, so a user deleted elsewhere is
    /// reported even when the snapshot still shows it.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is stale, `StoreUnavailable` otherwise.
    pub async fn verify_user(&mut self, id: &RecordId) -> Result<(), Error> {
        let mut partial = Document::new();
        partial.insert(
            "status".to_owned(),
            Value::from(UserStatus::Verified.as_str()),
        );
        self.users
            .update_fields(id, partial)
            .await
            .map_err(|err| self.failure("verify user", Some(id), err))?;
        if let Some(user) = self.find_mut(id) {
            user.mark_verified();
        }
        debug!(collection = self.users.name(), %id, "user verified");
        Ok(())
    }

    /// Merge editable fields from `patch` into the user.
    ///
    /// Verification only moves forward. A `Pending` status on the patch is
    /// refused for a cached verified user and dropped otherwise. A patch that
    /// changes nothing is not sent.
    ///
    /// # Errors
    ///
    /// `ValidationRejected` when the patch would return a verified user to
    /// pending. `NotFound`, `ValidationRejected` or `StoreUnavailable` from the
    /// store. The snapshot is not touched on failure.
    pub async fn update_user(&mut self, id: &RecordId, mut patch: UserPatch) -> Result<(), Error> {
        if patch.status == Some(UserStatus::Pending) {
            if self.find(id).is_some_and(User::is_verified) {
                warn!(collection = self.users.name(), %id, "refusing to unverify user");
                return Err(Error::validation_rejected(
                    "verified users cannot return to pending",
                ));
            }
            debug!(%id, "dropping pending status from user patch");
            patch.status = None;
        }
        if patch.is_empty() {
            debug!(collection = self.users.name(), %id, "empty user patch skipped");
            return Ok(());
        }
        let partial = patch.to_document()?;
        self.users
            .update_fields(id, partial)
            .await
            .map_err(|err| self.failure("update user", Some(id), err))?;
        if let Some(user) = self.find_mut(id) {
            user.apply_patch(&patch);
        }
        debug!(collection = self.users.name(), %id, "user updated");
        Ok(())
    }

    /// Delete the user permanently.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is already gone, `StoreUnavailable` otherwise. On
    /// failure the snapshot still lists the user.
    pub async fn delete_user(&mut self, id: &RecordId) -> Result<(), Error> {
        self.users
            .delete_by_id(id)
            .await
            .map_err(|err| self.failure("delete user", Some(id), err))?;
        self.snapshot.retain(|user| user.id() != id);
        debug!(collection = self.users.name(), %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_manager_tests.rs"]
mod tests;
