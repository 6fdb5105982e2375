//! Loan request entity.
//!
//! Loan requests are display data in this core: they are listed and summarised
//! but never mutated. Their approval and funding lifecycle is driven by an
//! external application flow.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::domain::{ExtraAttributes, RecordId, timestamp};

/// Status label of a loan request.
///
/// The four values are opaque to this core. No transition rules are enforced
/// and no ordering between them is implied, so the type is deliberately not
/// `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
    Funded,
}

impl LoanStatus {
    /// Document label for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Funded => "Funded",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors returned by [`LoanAmount::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoanAmountValidationError {
    #[error("loan amount must be a finite number")]
    NotFinite,
    #[error("loan amount must not be negative")]
    Negative,
}

/// Non-negative, currency-agnostic requested amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct LoanAmount(f64);

impl LoanAmount {
    /// Validate and construct an amount.
    pub fn new(value: f64) -> Result<Self, LoanAmountValidationError> {
        if !value.is_finite() {
            return Err(LoanAmountValidationError::NotFinite);
        }
        if value < 0.0 {
            return Err(LoanAmountValidationError::Negative);
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<LoanAmount> for f64 {
    fn from(value: LoanAmount) -> Self {
        value.0
    }
}

impl TryFrom<f64> for LoanAmount {
    type Error = LoanAmountValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stored shape of a loan request document (everything except the id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequestDocument {
    amount: LoanAmount,
    status: LoanStatus,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "advisory_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    borrower_ref: Option<RecordId>,
    #[serde(flatten)]
    attributes: ExtraAttributes,
}

/// Decode an advisory reference; empty or otherwise invalid ids become `None`.
fn advisory_record_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match RecordId::new(raw) {
        Ok(id) => Some(id),
        Err(err) => {
            debug!(error = %err, "ignoring unusable borrower reference");
            None
        }
    }))
}

impl LoanRequestDocument {
    /// Build a document body, mainly for seeding stores.
    pub fn new(amount: LoanAmount, status: LoanStatus) -> Self {
        Self {
            amount,
            status,
            created_at: None,
            borrower_ref: None,
            attributes: ExtraAttributes::new(),
        }
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn with_borrower(mut self, borrower_ref: RecordId) -> Self {
        self.borrower_ref = Some(borrower_ref);
        self
    }
}

/// Loan request as returned from the record store.
///
/// `borrower_ref` is advisory: it is not checked against the user collection
/// and may dangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    id: RecordId,
    amount: LoanAmount,
    status: LoanStatus,
    created_at: Option<DateTime<Utc>>,
    borrower_ref: Option<RecordId>,
    #[serde(flatten)]
    attributes: ExtraAttributes,
}

impl LoanRequest {
    /// Combine a store-assigned id with its document body.
    pub fn from_document(id: RecordId, document: LoanRequestDocument) -> Self {
        let LoanRequestDocument {
            amount,
            status,
            created_at,
            borrower_ref,
            attributes,
        } = document;
        Self {
            id,
            amount,
            status,
            created_at,
            borrower_ref,
            attributes,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn amount(&self) -> LoanAmount {
        self.amount
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    /// Creation time; `None` for documents written without one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn borrower_ref(&self) -> Option<&RecordId> {
        self.borrower_ref.as_ref()
    }

    pub fn attributes(&self) -> &ExtraAttributes {
        &self.attributes
    }
}
