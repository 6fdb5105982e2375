//! Domain entities, services and ports for the admin console core.
//!
//! Purpose: model the records an operator manages and the operations allowed
//! on them, independent of how the record store is reached.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: recoverable failure reported to UI collaborators.
//! - `User`, `UserDraft`, `UserPatch`: user entity and its mutation payloads.
//! - `LoanRequest`: read-only loan request display data.
//! - `UserManager`, `LoanManager`: snapshot-holding entity managers.
//! - `filter_by_name`: pure search over loaded records.
//! - `DashboardAggregator`: summary metrics over the current snapshots.

pub mod attributes;
pub mod dashboard;
pub mod error;
pub mod loan;
pub mod loan_manager;
pub mod ports;
pub mod record_id;
pub mod search;
pub mod timestamp;
pub mod typed_collection;
pub mod user;
pub mod user_manager;

pub use self::attributes::{AttributeValue, ExtraAttributes};
pub use self::dashboard::{
    DEFAULT_RECENT_LOANS, DashboardAggregator, DashboardSummary, LoanStatusCounts, RecentLoan,
    UNKNOWN_BORROWER, UserStatusCounts, is_active_loan,
};
pub use self::error::{Error, ErrorCode};
pub use self::loan::{
    LoanAmount, LoanAmountValidationError, LoanRequest, LoanRequestDocument, LoanStatus,
};
pub use self::loan_manager::LoanManager;
pub use self::record_id::{RecordId, RecordIdValidationError};
pub use self::search::{Named, filter_by_name};
pub use self::typed_collection::{Listing, TypedCollection};
pub use self::user::{DocumentUrls, User, UserDocument, UserDraft, UserPatch, UserStatus};
pub use self::user_manager::UserManager;

/// Default collection holding user documents.
pub const USERS_COLLECTION: &str = "users";
/// Default collection holding loan request documents.
pub const LOAN_REQUESTS_COLLECTION: &str = "loan_requests";
