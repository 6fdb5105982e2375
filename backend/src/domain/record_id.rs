//! Store-assigned record identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`RecordId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordIdValidationError {
    #[error("record id must not be empty")]
    Empty,
    #[error("record id must not have surrounding whitespace")]
    Padded,
}

/// Opaque identifier assigned by the record store when a document is created.
///
/// The core never interprets the value; it only checks that it is usable as a
/// key (non-empty and free of surrounding whitespace).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Validate and construct a [`RecordId`].
    pub fn new(id: impl Into<String>) -> Result<Self, RecordIdValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RecordIdValidationError::Empty);
        }
        if id.trim() != id {
            return Err(RecordIdValidationError::Padded);
        }
        Ok(Self(id))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = RecordIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
