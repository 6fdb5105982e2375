//! Case-insensitive name search over loaded records.
//!
//! Search is a pure function over whatever the caller already holds; it never
//! reaches the record store.

use crate::domain::User;

/// Records that carry an optional display name.
pub trait Named {
    /// `None` when the record has no usable name.
    fn display_name(&self) -> Option<&str>;
}

impl Named for User {
    fn display_name(&self) -> Option<&str> {
        Some(self.first_name()).filter(|name| !name.is_empty())
    }
}

/// Return the records whose name contains `query`, ignoring case.
///
/// An empty query matches everything. Records without a name are always kept
/// so that incomplete profiles stay visible to operators. The query is used
/// as typed, surrounding whitespace included. Input order is preserved.
///
/// # Examples
/// ```
/// use admin_core::domain::{Named, filter_by_name};
///
/// struct Row(Option<&'static str>);
///
/// impl Named for Row {
///     fn display_name(&self) -> Option<&str> {
///         self.0
///     }
/// }
///
/// let rows = [Row(Some("Alice")), Row(Some("Bob")), Row(None)];
/// let hits = filter_by_name(&rows, "ALI");
/// assert_eq!(hits.len(), 2);
/// ```
pub fn filter_by_name<'a, T: Named>(records: &'a [T], query: &str) -> Vec<&'a T> {
    if query.is_empty() {
        return records.iter().collect();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record
                .display_name()
                .is_none_or(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}
