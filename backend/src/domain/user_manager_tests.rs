//! Tests for the user entity manager.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockRecordStore, StoredDocument};
use crate::domain::{DocumentUrls, ErrorCode};
use crate::outbound::memory::InMemoryRecordStore;
use crate::test_support::{document, fixture_clock, fixture_timestamp};
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn store() -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::new())
}

fn manager(store: &Arc<InMemoryRecordStore>) -> UserManager<InMemoryRecordStore> {
    UserManager::new(Arc::clone(store), fixture_clock())
}

fn mock_manager(store: MockRecordStore) -> UserManager<MockRecordStore> {
    UserManager::new(Arc::new(store), fixture_clock())
}

fn alice() -> UserDraft {
    UserDraft::new("Alice Johnson", "alice@example.com")
        .with_document_urls(DocumentUrls {
            aadhar: "https://files/aadhar.png".to_owned(),
            ..DocumentUrls::default()
        })
        .with_attribute("city", "Pune")
}

fn id(raw: &str) -> RecordId {
    RecordId::new(raw).expect("valid id")
}

#[rstest]
#[tokio::test]
async fn added_user_appears_exactly_once_in_fresh_listing(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);

    let added = users.add_user(alice()).await.expect("add succeeds");
    let listed = users.list_users().await.expect("list succeeds");

    let matching: Vec<&User> = listed.iter().filter(|user| user.id() == added.id()).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0], &added);
    assert_eq!(listed.len(), 1);
}

#[rstest]
#[tokio::test]
async fn added_user_gets_defaults_and_creation_time(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);

    let added = users.add_user(alice()).await.expect("add succeeds");

    assert_eq!(added.first_name(), "Alice Johnson");
    assert_eq!(added.email(), "alice@example.com");
    assert_eq!(added.status(), UserStatus::Pending);
    assert_eq!(added.document_urls().aadhar, "https://files/aadhar.png");
    assert_eq!(added.document_urls().pan, "");
    assert_eq!(added.document_urls().student_id, "");
    assert_eq!(added.created_at(), Some(fixture_timestamp()));
    assert_eq!(users.snapshot(), std::slice::from_ref(&added));

    let stored = store.documents(USERS_COLLECTION).expect("readable");
    assert_eq!(stored[0].fields.get("status"), Some(&json!("Pending")));
    assert_eq!(stored[0].fields.get("city"), Some(&json!("Pune")));
}

#[rstest]
#[tokio::test]
async fn add_while_store_unavailable_reports_and_persists_nothing(
    store: Arc<InMemoryRecordStore>,
) {
    let mut users = manager(&store);
    store.set_available(false);

    let error = users.add_user(alice()).await.expect_err("store is offline");

    assert_eq!(error.code(), ErrorCode::StoreUnavailable);
    assert!(users.snapshot().is_empty());
    store.set_available(true);
    let listed = users.list_users().await.expect("list succeeds");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn rejected_draft_surfaces_validation_error() {
    let mut store = MockRecordStore::new();
    store
        .expect_create()
        .times(1)
        .return_once(|_, _| Err(RecordStoreError::rejected("email must be unique")));
    let mut users = mock_manager(store);

    let error = users.add_user(alice()).await.expect_err("store rejects");

    assert_eq!(error.code(), ErrorCode::ValidationRejected);
    assert!(users.snapshot().is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_listing_keeps_previous_snapshot(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    users.add_user(alice()).await.expect("add succeeds");
    users.list_users().await.expect("list succeeds");
    store.set_available(false);

    let error = users.list_users().await.expect_err("store is offline");

    assert_eq!(error.code(), ErrorCode::StoreUnavailable);
    assert_eq!(users.snapshot().len(), 1);
}

#[rstest]
#[tokio::test]
async fn undecodable_user_is_set_aside_while_others_list(store: Arc<InMemoryRecordStore>) {
    let good = store
        .seed(
            USERS_COLLECTION,
            document(json!({ "firstName": "Ann", "email": "a@x.com", "status": "Pending" })),
        )
        .expect("seed succeeds");
    let bad = store
        .seed(
            USERS_COLLECTION,
            document(json!({ "firstName": "Ben", "email": "b@x.com", "status": "Active" })),
        )
        .expect("seed succeeds");
    let mut users = manager(&store);

    let listed = users.list_users().await.expect("list succeeds");

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), &good);
    assert_eq!(users.rejected(), [bad]);
}

#[rstest]
#[tokio::test]
async fn rejected_ids_are_replaced_on_each_listing(store: Arc<InMemoryRecordStore>) {
    let bad = store
        .seed(USERS_COLLECTION, document(json!({ "status": "Active" })))
        .expect("seed succeeds");
    let mut users = manager(&store);
    users.list_users().await.expect("list succeeds");
    assert_eq!(users.rejected().len(), 1);

    store
        .delete_by_id(USERS_COLLECTION, &bad)
        .await
        .expect("operator removes the record");
    users.list_users().await.expect("list succeeds");

    assert!(users.rejected().is_empty());
}

#[rstest]
#[tokio::test]
async fn verify_is_idempotent(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    let added = users.add_user(alice()).await.expect("add succeeds");

    users.verify_user(added.id()).await.expect("first verify succeeds");
    assert!(users.find(added.id()).is_some_and(User::is_verified));
    users.verify_user(added.id()).await.expect("second verify succeeds");
    assert!(users.find(added.id()).is_some_and(User::is_verified));

    let listed = users.list_users().await.expect("list succeeds");
    assert_eq!(listed[0].status(), UserStatus::Verified);
}

#[rstest]
#[tokio::test]
async fn verify_writes_through_even_when_snapshot_shows_verified() {
    let mut store = MockRecordStore::new();
    store
        .expect_update_fields()
        .withf(|collection, target, partial| {
            collection == USERS_COLLECTION
                && target.as_str() == "u-1"
                && partial.get("status") == Some(&json!("Verified"))
                && partial.len() == 1
        })
        .times(2)
        .returning(|_, _, _| Ok(()));
    let mut users = mock_manager(store);
    let target = id("u-1");

    users.verify_user(&target).await.expect("first verify succeeds");
    users.verify_user(&target).await.expect("second verify succeeds");
}

#[rstest]
#[tokio::test]
async fn verifying_a_deleted_user_reports_not_found(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    let added = users.add_user(alice()).await.expect("add succeeds");
    store
        .delete_by_id(USERS_COLLECTION, added.id())
        .await
        .expect("deleted by another operator");

    let error = users.verify_user(added.id()).await.expect_err("id is stale");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(
        users.find(added.id()).map(User::status),
        Some(UserStatus::Pending)
    );
}

#[rstest]
#[tokio::test]
async fn email_update_changes_only_email(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    let added = users.add_user(alice()).await.expect("add succeeds");

    users
        .update_user(added.id(), UserPatch::email_only("new@x.com"))
        .await
        .expect("update succeeds");

    let listed = users.list_users().await.expect("list succeeds");
    let updated = &listed[0];
    assert_eq!(updated.email(), "new@x.com");
    assert_eq!(updated.first_name(), added.first_name());
    assert_eq!(updated.status(), added.status());
    assert_eq!(updated.document_urls(), added.document_urls());
    assert_eq!(updated.created_at(), added.created_at());
    assert_eq!(updated.attributes(), added.attributes());
}

#[rstest]
#[tokio::test]
async fn update_reflects_patch_in_snapshot_without_reload(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    let added = users.add_user(alice()).await.expect("add succeeds");
    let patch = UserPatch {
        first_name: Some("Alicia".to_owned()),
        status: Some(UserStatus::Verified),
        ..UserPatch::default()
    };

    users.update_user(added.id(), patch).await.expect("update succeeds");

    let cached = users.find(added.id()).expect("still cached");
    assert_eq!(cached.first_name(), "Alicia");
    assert!(cached.is_verified());
    assert_eq!(cached.email(), "alice@example.com");
}

#[rstest]
#[tokio::test]
async fn raw_patch_cannot_change_identity_or_creation_time(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    let added = users.add_user(alice()).await.expect("add succeeds");
    let patch = UserPatch::from_fields(document(json!({
        "id": "forged",
        "createdAt": "1999-01-01T00:00:00Z",
        "occupation": "Engineer",
    })))
    .expect("patch builds");

    users.update_user(added.id(), patch).await.expect("update succeeds");

    let listed = users.list_users().await.expect("list succeeds");
    assert_eq!(listed[0].id(), added.id());
    assert_eq!(listed[0].created_at(), Some(fixture_timestamp()));
    assert_eq!(
        listed[0].attribute("occupation"),
        Some(&crate::domain::AttributeValue::from("Engineer"))
    );
}

#[rstest]
#[tokio::test]
async fn failed_update_leaves_snapshot_unchanged(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    let added = users.add_user(alice()).await.expect("add succeeds");
    store.set_available(false);

    let error = users
        .update_user(added.id(), UserPatch::email_only("new@x.com"))
        .await
        .expect_err("store is offline");

    assert_eq!(error.code(), ErrorCode::StoreUnavailable);
    assert_eq!(
        users.find(added.id()).map(User::email),
        Some("alice@example.com")
    );
}

#[rstest]
#[tokio::test]
async fn verified_user_cannot_be_patched_back_to_pending(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    let added = users.add_user(alice()).await.expect("add succeeds");
    users.verify_user(added.id()).await.expect("verify succeeds");
    let patch = UserPatch {
        first_name: Some("Alicia".to_owned()),
        status: Some(UserStatus::Pending),
        ..UserPatch::default()
    };

    let error = users
        .update_user(added.id(), patch)
        .await
        .expect_err("downgrade is refused");

    assert_eq!(error.code(), ErrorCode::ValidationRejected);
    let listed = users.list_users().await.expect("list succeeds");
    assert_eq!(listed[0].status(), UserStatus::Verified);
    assert_eq!(listed[0].first_name(), "Alice Johnson");
}

#[rstest]
#[tokio::test]
async fn pending_status_is_dropped_for_uncached_users() {
    let mut store = MockRecordStore::new();
    store
        .expect_update_fields()
        .withf(|_, target, partial| {
            target.as_str() == "u-1"
                && !partial.contains_key("status")
                && partial.get("email") == Some(&json!("new@x.com"))
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    let mut users = mock_manager(store);
    let patch = UserPatch {
        status: Some(UserStatus::Pending),
        ..UserPatch::email_only("new@x.com")
    };

    users
        .update_user(&id("u-1"), patch)
        .await
        .expect("update succeeds");
}

#[rstest]
#[case::default(UserPatch::default())]
#[case::pending_only(UserPatch { status: Some(UserStatus::Pending), ..UserPatch::default() })]
#[tokio::test]
async fn empty_patch_is_not_sent(#[case] patch: UserPatch) {
    let mut users = mock_manager(MockRecordStore::new());

    users
        .update_user(&id("u-1"), patch)
        .await
        .expect("nothing to write");
}

#[rstest]
#[tokio::test]
async fn deleted_user_is_gone_and_second_delete_is_not_found(store: Arc<InMemoryRecordStore>) {
    let mut users = manager(&store);
    let added = users.add_user(alice()).await.expect("add succeeds");
    let kept = users
        .add_user(UserDraft::new("Bob", "bob@example.com"))
        .await
        .expect("add succeeds");

    users.delete_user(added.id()).await.expect("delete succeeds");
    assert!(users.find(added.id()).is_none());

    let listed = users.list_users().await.expect("list succeeds");
    assert!(listed.iter().all(|user| user.id() != added.id()));
    assert!(listed.iter().any(|user| user.id() == kept.id()));

    let error = users.delete_user(added.id()).await.expect_err("already gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn failed_delete_keeps_user_in_snapshot() {
    let mut store = MockRecordStore::new();
    store
        .expect_delete_by_id()
        .with(eq(USERS_COLLECTION), eq(id("u-1")))
        .times(1)
        .return_once(|_, _| Err(RecordStoreError::unavailable("connection reset")));
    store.expect_list_all().times(1).return_once(|_| {
        Ok(vec![StoredDocument::new(
            id("u-1"),
            document(json!({ "firstName": "Ann", "email": "a@x.com" })),
        )])
    });
    let mut users = mock_manager(store);
    users.list_users().await.expect("list succeeds");

    let error = users.delete_user(&id("u-1")).await.expect_err("delete fails");

    assert_eq!(error.code(), ErrorCode::StoreUnavailable);
    assert!(users.find(&id("u-1")).is_some());
}

#[rstest]
#[tokio::test]
async fn custom_collection_name_is_used() {
    let mut store = MockRecordStore::new();
    store
        .expect_list_all()
        .with(eq("operators_users"))
        .times(1)
        .return_once(|_| Ok(Vec::new()));
    let mut users = UserManager::with_collection(Arc::new(store), "operators_users", fixture_clock());

    assert!(users.list_users().await.expect("list succeeds").is_empty());
}
