//! Reqwest-backed record store adapter.
//!
//! This adapter owns transport details only: URL construction, bearer
//! authentication, timeout and HTTP error mapping, and JSON decoding into
//! stored documents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{CreatedDocumentDto, ListedDocumentDto};
use crate::domain::RecordId;
use crate::domain::ports::{Document, RecordStore, RecordStoreError, StoredDocument};

const RESERVED_ID_FIELD: &str = "id";

/// Errors raised while constructing a [`RestRecordStore`].
#[derive(Debug, thiserror::Error)]
pub enum RestRecordStoreBuildError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("record store URL `{0}` cannot carry collection paths")]
    InvalidBaseUrl(String),
}

/// Record store reached over a JSON document API.
///
/// `GET {base}/{collection}` lists, `POST {base}/{collection}` creates,
/// `PATCH {base}/{collection}/{id}` merges fields and
/// `DELETE {base}/{collection}/{id}` removes.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl RestRecordStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` cannot hold path segments or when the
    /// reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, RestRecordStoreBuildError> {
        if base_url.cannot_be_a_base() {
            return Err(RestRecordStoreBuildError::InvalidBaseUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_token: None,
        })
    }

    /// Send `token` as a bearer credential on every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn endpoint(&self, collection: &str, id: Option<&RecordId>) -> Result<Url, RecordStoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                RecordStoreError::unavailable(format!(
                    "record store URL `{}` cannot carry collection paths",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().push(collection);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        collection: &str,
        id: Option<&RecordId>,
    ) -> Result<Vec<u8>, RecordStoreError> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref(), collection, id));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, RecordStoreError> {
        let url = self.endpoint(collection, None)?;
        let body = self.execute(self.client.get(url), collection, None).await?;
        let listed: Vec<ListedDocumentDto> = decode(&body, collection)?;
        debug!(collection, count = listed.len(), "documents listed");
        Ok(listed.into_iter().map(StoredDocument::from).collect())
    }

    async fn create(
        &self,
        collection: &str,
        data: Document,
    ) -> Result<RecordId, RecordStoreError> {
        reject_reserved_id(&data)?;
        let url = self.endpoint(collection, None)?;
        let body = self
            .execute(self.client.post(url).json(&data), collection, None)
            .await?;
        let created: CreatedDocumentDto = decode(&body, collection)?;
        debug!(collection, id = %created.id, "document created");
        Ok(created.id)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &RecordId,
        partial: Document,
    ) -> Result<(), RecordStoreError> {
        reject_reserved_id(&partial)?;
        let url = self.endpoint(collection, Some(id))?;
        self.execute(self.client.patch(url).json(&partial), collection, Some(id))
            .await?;
        Ok(())
    }

    async fn delete_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<(), RecordStoreError> {
        let url = self.endpoint(collection, Some(id))?;
        self.execute(self.client.delete(url), collection, Some(id))
            .await?;
        Ok(())
    }
}

fn reject_reserved_id(fields: &Document) -> Result<(), RecordStoreError> {
    if fields.contains_key(RESERVED_ID_FIELD) {
        return Err(RecordStoreError::rejected(
            "documents must not carry the reserved `id` field",
        ));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(body: &[u8], collection: &str) -> Result<T, RecordStoreError> {
    serde_json::from_slice(body).map_err(|error| {
        RecordStoreError::malformed(format!("invalid {collection} payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> RecordStoreError {
    if error.is_timeout() {
        RecordStoreError::unavailable(format!("request timed out: {error}"))
    } else {
        RecordStoreError::unavailable(error.to_string())
    }
}

fn map_status_error(
    status: StatusCode,
    body: &[u8],
    collection: &str,
    id: Option<&RecordId>,
) -> RecordStoreError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => RecordStoreError::not_found(collection, id.as_str()),
        (
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY,
            _,
        ) => RecordStoreError::rejected(message),
        _ => RecordStoreError::unavailable(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network helpers.

    use super::*;
    use rstest::rstest;

    fn store(base: &str) -> RestRecordStore {
        RestRecordStore::new(Url::parse(base).expect("valid URL"), Duration::from_secs(1))
            .expect("client builds")
    }

    fn id(raw: &str) -> RecordId {
        RecordId::new(raw).expect("valid id")
    }

    #[rstest]
    #[case::bare_host("https://store.example", None, "https://store.example/users")]
    #[case::trailing_slash("https://store.example/v1/", None, "https://store.example/v1/users")]
    #[case::with_id("https://store.example/v1", Some("u-1"), "https://store.example/v1/users/u-1")]
    #[case::escaped_id(
        "https://store.example/v1",
        Some("a/b c"),
        "https://store.example/v1/users/a%2Fb%20c"
    )]
    fn builds_collection_and_record_urls(
        #[case] base: &str,
        #[case] record: Option<&str>,
        #[case] expected: &str,
    ) {
        let record = record.map(id);
        let url = store(base)
            .endpoint("users", record.as_ref())
            .expect("URL builds");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn rejects_base_urls_without_paths() {
        let result = RestRecordStore::new(
            Url::parse("mailto:ops@example.com").expect("valid URL"),
            Duration::from_secs(1),
        );
        assert!(matches!(
            result,
            Err(RestRecordStoreBuildError::InvalidBaseUrl(_))
        ));
    }

    #[rstest]
    #[case::missing_record(StatusCode::NOT_FOUND, true, "NotFound")]
    #[case::missing_collection(StatusCode::NOT_FOUND, false, "Unavailable")]
    #[case::bad_request(StatusCode::BAD_REQUEST, true, "Rejected")]
    #[case::conflict(StatusCode::CONFLICT, false, "Rejected")]
    #[case::unprocessable(StatusCode::UNPROCESSABLE_ENTITY, true, "Rejected")]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, true, "Unavailable")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false, "Unavailable")]
    fn maps_http_statuses_to_port_errors(
        #[case] status: StatusCode,
        #[case] targets_record: bool,
        #[case] expected: &str,
    ) {
        let record = id("u-1");
        let target = targets_record.then_some(&record);

        let error = map_status_error(status, b"{\"error\":\"nope\"}", "users", target);

        let actual = match error {
            RecordStoreError::NotFound { .. } => "NotFound",
            RecordStoreError::Rejected { .. } => "Rejected",
            RecordStoreError::Unavailable { .. } => "Unavailable",
            RecordStoreError::Malformed { .. } => "Malformed",
        };
        assert_eq!(actual, expected, "status {status} mapped unexpectedly");
    }

    #[rstest]
    fn not_found_names_the_record() {
        let record = id("u-7");
        let error = map_status_error(StatusCode::NOT_FOUND, b"", "users", Some(&record));
        assert_eq!(error, RecordStoreError::not_found("users", "u-7"));
    }

    #[rstest]
    fn rejection_message_carries_compact_body_preview() {
        let error = map_status_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            b"{\n  \"error\": \"email required\"\n}",
            "users",
            None,
        );
        assert_eq!(
            error,
            RecordStoreError::rejected("status 422: { \"error\": \"email required\" }")
        );
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    fn listing_splits_ids_from_document_bodies() {
        let body = br#"[
            { "id": "u-1", "firstName": "Ann", "status": "Pending" },
            { "id": "u-2", "firstName": "Ben" }
        ]"#;

        let listed: Vec<ListedDocumentDto> = decode(body, "users").expect("listing decodes");
        let documents: Vec<StoredDocument> = listed.into_iter().map(StoredDocument::from).collect();

        assert_eq!(documents[0].id.as_str(), "u-1");
        assert!(!documents[0].fields.contains_key("id"));
        assert_eq!(documents[1].fields.len(), 1);
    }

    #[rstest]
    #[case::not_an_array(br#"{ "id": "u-1" }"#.as_slice())]
    #[case::missing_id(br#"[{ "firstName": "Ann" }]"#.as_slice())]
    #[case::blank_id(br#"[{ "id": "" }]"#.as_slice())]
    fn malformed_listings_are_reported(#[case] body: &[u8]) {
        let result: Result<Vec<ListedDocumentDto>, _> = decode(body, "users");
        assert!(matches!(result, Err(RecordStoreError::Malformed { .. })));
    }

    #[rstest]
    fn documents_carrying_an_id_are_rejected_before_sending() {
        let mut fields = Document::new();
        fields.insert("id".to_owned(), serde_json::Value::from("forged"));
        assert!(matches!(
            reject_reserved_id(&fields),
            Err(RecordStoreError::Rejected { .. })
        ));
    }
}
