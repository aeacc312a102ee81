//! Core domain types shared by every store.
//!
//! - Newtype ids (`UserId`, `ItemId`) so a user can never be passed where an
//!   item is expected
//! - `AddingReturn`, the outcome of every mutation on a store
//! - The entry types handed to rating / impression / time point filters

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Entity identifiers
// =============================================================================

/// Identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Identifier of an item (an item, a series, an article...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId(id)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id)
    }
}

// =============================================================================
// Mutation outcome
// =============================================================================

/// Outcome of adding a rating or an impression.
///
/// Loaders probe tentative additions and branch on this value, so it is a
/// plain enum rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddingReturn {
    /// The operation was invalid (unknown user or item, NaN value).
    Error,
    /// Nothing changed.
    Unchanged,
    /// A new entry was created.
    Added,
    /// An existing entry changed under the merge policy.
    Updated,
}

impl AddingReturn {
    /// True when the store was modified.
    pub fn is_change(self) -> bool {
        matches!(self, AddingReturn::Added | AddingReturn::Updated)
    }
}

// =============================================================================
// Filterable entries
// =============================================================================

/// A stored (user, item, value) triple, as seen by rating filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub user: UserId,
    pub item: ItemId,
    pub value: f64,
}

/// A (user, item) impression, as seen by impression filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImpressionEntry {
    pub user: UserId,
    pub item: ItemId,
}

/// A single event of a temporal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimePoint {
    pub user: UserId,
    pub item: ItemId,
    /// Unix timestamp, in whatever unit the dataset uses (seconds, millis).
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_raw_value() {
        assert_eq!(UserId(42).to_string(), "42");
        assert_eq!(ItemId::from(7).to_string(), "7");
    }

    #[test]
    fn test_adding_return_is_change() {
        assert!(AddingReturn::Added.is_change());
        assert!(AddingReturn::Updated.is_change());
        assert!(!AddingReturn::Unchanged.is_change());
        assert!(!AddingReturn::Error.is_change());
    }
}
