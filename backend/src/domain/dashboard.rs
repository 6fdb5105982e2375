//! Dashboard summary metrics.
//!
//! Metrics are recomputed from the snapshots handed in on every call; nothing
//! is cached between calls.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{LoanAmount, LoanRequest, LoanStatus, Named, RecordId, User, UserStatus};

/// Number of recent loans shown when no window is configured.
pub const DEFAULT_RECENT_LOANS: usize = 5;

/// Borrower label for loans whose reference cannot be resolved to a name.
pub const UNKNOWN_BORROWER: &str = "unknown";

/// Whether a loan counts towards the active total.
///
/// Every status except `Rejected` is active.
pub fn is_active_loan(status: LoanStatus) -> bool {
    status != LoanStatus::Rejected
}

/// Loan counts per status label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanStatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub funded: usize,
}

impl LoanStatusCounts {
    fn record(&mut self, status: LoanStatus) {
        let slot = match status {
            LoanStatus::Pending => &mut self.pending,
            LoanStatus::Approved => &mut self.approved,
            LoanStatus::Rejected => &mut self.rejected,
            LoanStatus::Funded => &mut self.funded,
        };
        *slot += 1;
    }
}

/// User counts per verification status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusCounts {
    pub pending: usize,
    pub verified: usize,
}

/// One row of the recent activity list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentLoan {
    pub id: RecordId,
    pub amount: LoanAmount,
    pub status: LoanStatus,
    pub created_at: Option<DateTime<Utc>>,
    /// Borrower display name, or [`UNKNOWN_BORROWER`].
    pub borrower: String,
}

/// Aggregate view rendered by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_users: usize,
    pub active_loans: usize,
    pub total_volume: f64,
    pub recent_loans: Vec<RecentLoan>,
    pub loan_status_counts: LoanStatusCounts,
    pub user_status_counts: UserStatusCounts,
}

/// Computes [`DashboardSummary`] values for a fixed recent-loan window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardAggregator {
    recent_window: usize,
}

impl Default for DashboardAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LOANS)
    }
}

impl DashboardAggregator {
    pub fn new(recent_window: usize) -> Self {
        Self { recent_window }
    }

    pub fn recent_window(&self) -> usize {
        self.recent_window
    }

    /// Summarise the given snapshots.
    ///
    /// Recent loans are ordered by `createdAt` descending. Loans without a
    /// creation time sort after every dated loan, and ties keep snapshot
    /// order.
    ///
    /// # Examples
    /// ```
    /// use admin_core::domain::DashboardAggregator;
    ///
    /// let summary = DashboardAggregator::default().summarize(&[], &[]);
    /// assert_eq!(summary.total_users, 0);
    /// assert_eq!(summary.total_volume, 0.0);
    /// assert!(summary.recent_loans.is_empty());
    /// ```
    pub fn summarize(&self, users: &[User], loans: &[LoanRequest]) -> DashboardSummary {
        let mut user_status_counts = UserStatusCounts::default();
        for user in users {
            match user.status() {
                UserStatus::Pending => user_status_counts.pending += 1,
                UserStatus::Verified => user_status_counts.verified += 1,
            }
        }

        let mut loan_status_counts = LoanStatusCounts::default();
        for loan in loans {
            loan_status_counts.record(loan.status());
        }

        DashboardSummary {
            total_users: users.len(),
            active_loans: loans
                .iter()
                .filter(|loan| is_active_loan(loan.status()))
                .count(),
            total_volume: loans.iter().map(|loan| loan.amount().value()).sum(),
            recent_loans: self.recent_loans(users, loans),
            loan_status_counts,
            user_status_counts,
        }
    }

    fn recent_loans(&self, users: &[User], loans: &[LoanRequest]) -> Vec<RecentLoan> {
        if self.recent_window == 0 {
            return Vec::new();
        }
        let names: HashMap<&RecordId, &str> = users
            .iter()
            .filter_map(|user| user.display_name().map(|name| (user.id(), name)))
            .collect();

        let mut ordered: Vec<&LoanRequest> = loans.iter().collect();
        // `None` < `Some`, so reversing puts undated loans last.
        ordered.sort_by_key(|loan| Reverse(loan.created_at()));

        ordered
            .into_iter()
            .take(self.recent_window)
            .map(|loan| RecentLoan {
                id: loan.id().clone(),
                amount: loan.amount(),
                status: loan.status(),
                created_at: loan.created_at(),
                borrower: loan
                    .borrower_ref()
                    .and_then(|borrower| names.get(borrower).copied())
                    .unwrap_or(UNKNOWN_BORROWER)
                    .to_owned(),
            })
            .collect()
    }
}
