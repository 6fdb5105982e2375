//! User entity, drafts and patches.
//!
//! Field names on the wire match the document schema shared with external
//! tooling: `firstName`, `email`, `status`, `documentURLs` (keys `aadhar`,
//! `pan`, `studentID`) and `createdAt`. Any other top-level field lands in the
//! open attribute map and is written back unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::Document;
use crate::domain::{AttributeValue, Error, ExtraAttributes, RecordId, timestamp};

/// Document fields owned by the fixed schema; never stored as extra attributes.
pub const RESERVED_USER_FIELDS: [&str; 6] = [
    "id",
    "firstName",
    "email",
    "status",
    "documentURLs",
    "createdAt",
];

/// Patch keys that are dropped to protect entity identity and creation time.
const IMMUTABLE_USER_FIELDS: [&str; 2] = ["id", "createdAt"];

const DOCUMENT_URLS_FIELD: &str = "documentURLs";
const DOCUMENT_URL_KEYS: [&str; 3] = ["aadhar", "pan", "studentID"];

/// Identity verification status.
///
/// `Pending` is the initial state; `Verified` is stable and no operation in
/// this core moves a user out of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserStatus {
    #[default]
    Pending,
    Verified,
}

impl UserStatus {
    /// Document label for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Verified => "Verified",
        }
    }
}

/// Links to uploaded identity documents. Empty string means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUrls {
    #[serde(default, deserialize_with = "null_as_default")]
    pub aadhar: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pan: String,
    #[serde(rename = "studentID", default, deserialize_with = "null_as_default")]
    pub student_id: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stored shape of a user document (everything except the id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    status: UserStatus,
    #[serde(rename = "documentURLs", default, deserialize_with = "null_as_default")]
    document_urls: DocumentUrls,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    attributes: ExtraAttributes,
}

/// Platform user as returned from the record store.
///
/// ## Invariants
/// - `id` is always present; it was assigned by the store.
/// - `created_at` is never changed by any operation in this core. Documents
///   written by older tooling may lack it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: RecordId,
    first_name: String,
    email: String,
    status: UserStatus,
    #[serde(rename = "documentURLs")]
    document_urls: DocumentUrls,
    created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    attributes: ExtraAttributes,
}

impl User {
    /// Combine a store-assigned id with its document body.
    pub fn from_document(id: RecordId, document: UserDocument) -> Self {
        let UserDocument {
            first_name,
            email,
            status,
            document_urls,
            created_at,
            attributes,
        } = document;
        Self {
            id,
            first_name,
            email,
            status,
            document_urls,
            created_at,
            attributes,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Display name; may be empty pending profile completion.
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn is_verified(&self) -> bool {
        self.status == UserStatus::Verified
    }

    pub fn document_urls(&self) -> &DocumentUrls {
        &self.document_urls
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Extra attributes carried opaquely.
    pub fn attributes(&self) -> &ExtraAttributes {
        &self.attributes
    }

    /// Look up a single extra attribute.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub(crate) fn mark_verified(&mut self) {
        self.status = UserStatus::Verified;
    }

    /// Reflect a patch that the store has already accepted.
    pub(crate) fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(document_urls) = &patch.document_urls {
            self.document_urls.clone_from(document_urls);
        }
        for (key, value) in patch.editable_attributes() {
            self.attributes.insert(key.clone(), value.clone());
        }
    }
}

/// Payload for creating a user. Has no id; the store assigns one.
///
/// # Examples
/// ```
/// use admin_core::domain::{UserDraft, UserStatus};
///
/// let draft = UserDraft::new("Alice Johnson", "alice@example.com")
///     .with_attribute("city", "Pune");
/// assert_eq!(draft.status, None);
/// assert_eq!(draft.document_urls.pan, "");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    pub first_name: String,
    pub email: String,
    /// Defaults to [`UserStatus::Pending`] when omitted.
    pub status: Option<UserStatus>,
    pub document_urls: DocumentUrls,
    pub attributes: ExtraAttributes,
}

impl UserDraft {
    /// Start a draft with the two required profile fields.
    pub fn new(first_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_document_urls(mut self, document_urls: DocumentUrls) -> Self {
        self.document_urls = document_urls;
        self
    }

    /// Add an extra attribute. Keys owned by the fixed schema are ignored.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        let key = key.into();
        if RESERVED_USER_FIELDS.contains(&key.as_str()) {
            debug!(key = %key, "ignoring reserved field supplied as user attribute");
        } else {
            self.attributes.insert(key, value.into());
        }
        self
    }

    /// Apply defaults and stamp the creation time.
    pub(crate) fn into_document(self, created_at: DateTime<Utc>) -> UserDocument {
        let Self {
            first_name,
            email,
            status,
            document_urls,
            mut attributes,
        } = self;
        attributes.retain(|key, _| !RESERVED_USER_FIELDS.contains(&key.as_str()));
        UserDocument {
            first_name,
            email,
            status: status.unwrap_or_default(),
            document_urls,
            created_at: Some(created_at),
            attributes,
        }
    }
}

/// Partial update over the editable user fields.
///
/// `id` and `createdAt` are not representable here; [`UserPatch::from_fields`]
/// drops them from raw input.
///
/// `documentURLs` is replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(rename = "documentURLs", default, skip_serializing_if = "Option::is_none")]
    pub document_urls: Option<DocumentUrls>,
    #[serde(flatten)]
    pub attributes: ExtraAttributes,
}

impl UserPatch {
    /// Build a patch from raw UI-supplied fields.
    ///
    /// `id` and `createdAt` are ignored. Keys outside the fixed schema become
    /// extra attributes. A `documentURLs` object must name all three links.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::ValidationRejected`] when a field
    /// holds a value of the wrong type (for example a status outside
    /// `Pending | Verified`, or a structured extra attribute).
    pub fn from_fields(mut fields: Document) -> Result<Self, Error> {
        for key in IMMUTABLE_USER_FIELDS {
            if fields.remove(key).is_some() {
                debug!(field = key, "ignoring immutable field in user patch");
            }
        }
        if let Some(Value::Object(urls)) = fields.get(DOCUMENT_URLS_FIELD) {
            let missing: Vec<&str> = DOCUMENT_URL_KEYS
                .into_iter()
                .filter(|key| !urls.contains_key(*key))
                .collect();
            if !missing.is_empty() {
                return Err(Error::validation_rejected(format!(
                    "documentURLs replaces all links; missing {}",
                    missing.join(", ")
                )));
            }
        }
        serde_json::from_value(Value::Object(fields))
            .map_err(|err| Error::validation_rejected(format!("invalid user patch: {err}")))
    }

    /// Patch that changes only the email address.
    pub fn email_only(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Encode the patch as the partial document sent to the store.
    pub(crate) fn to_document(&self) -> Result<Document, Error> {
        let mut sanitized = self.clone();
        sanitized
            .attributes
            .retain(|key, _| !RESERVED_USER_FIELDS.contains(&key.as_str()));
        match serde_json::to_value(&sanitized) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(other) => Err(Error::validation_rejected(format!(
                "user patch encoded as non-object: {other}"
            ))),
            Err(err) => Err(Error::validation_rejected(format!(
                "failed to encode user patch: {err}"
            ))),
        }
    }

    fn editable_attributes(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.attributes
            .iter()
            .filter(|(key, _)| !RESERVED_USER_FIELDS.contains(&key.as_str()))
    }

    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.email.is_none()
            && self.status.is_none()
            && self.document_urls.is_none()
            && self.editable_attributes().next().is_none()
    }
}
