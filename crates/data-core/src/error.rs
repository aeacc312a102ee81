//! Error types for the data-core crate.
//!
//! Stores never fail loudly: `rate` and `add_impression` fold these into
//! `AddingReturn::Error`. The `try_*` variants surface them so callers can
//! tell *why* an addition was rejected.

use crate::types::{ItemId, UserId};
use thiserror::Error;

/// Reasons a store rejects a mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// The rating value is not a number.
    #[error("Invalid rating value: {0}")]
    InvalidRating(f64),

    /// The user was never registered with `add_user`.
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// The item was never registered with `add_item`.
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataError>;
