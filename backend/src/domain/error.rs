//! Domain-level error type surfaced to UI collaborators.
//!
//! Every error is recoverable: a failed operation leaves both the local
//! snapshot and the durable store as they were, so the caller can show a notice
//! and let the operator retry or refresh.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::ports::RecordStoreError;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Transport, authentication, timeout or backend failure.
    StoreUnavailable,
    /// The operation targeted an id that no longer exists.
    NotFound,
    /// Submitted data was refused as malformed.
    ValidationRejected,
}

/// Domain error payload.
///
/// `message` is diagnostic text for logs; [`Error::user_message`] is what an
/// operator should see.
///
/// # Examples
/// ```
/// use admin_core::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("user u-1 no longer exists");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(err.is_recoverable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create an error with the given code and diagnostic message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Convenience constructor for [`ErrorCode::StoreUnavailable`].
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ValidationRejected`].
    pub fn validation_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationRejected, message)
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Diagnostic message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary details, when the failing layer provided any.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Operator-facing notice for this failure category.
    pub fn user_message(&self) -> &'static str {
        match self.code {
            ErrorCode::StoreUnavailable => "Failed to reach the record store. Please try again.",
            ErrorCode::NotFound => "This record no longer exists. Refresh the list and try again.",
            ErrorCode::ValidationRejected => {
                "The submitted details were rejected. Check the form and try again."
            }
        }
    }

    /// Whether the caller may retry or refresh. Always true in this core.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Map a record store failure, prefixing the message with `context`.
    pub(crate) fn from_store(context: &str, error: RecordStoreError) -> Self {
        match error {
            RecordStoreError::Unavailable { message } => {
                Self::store_unavailable(format!("{context}: {message}"))
            }
            RecordStoreError::Malformed { message } => {
                Self::store_unavailable(format!("{context}: malformed record: {message}"))
            }
            RecordStoreError::NotFound { collection, id } => {
                Self::not_found(format!("{context}: record {id} not found"))
                    .with_details(json!({ "collection": collection, "id": id }))
            }
            RecordStoreError::Rejected { message } => {
                Self::validation_rejected(format!("{context}: {message}"))
                    .with_details(json!({ "reason": message }))
            }
        }
    }
}
