//! # Data Core Crate
//!
//! In-memory stores backing every dataset statistic.
//!
//! ## Main Components
//!
//! - **rating_matrix**: dual-indexed sparse user-item rating matrix with
//!   relevance threshold, binarization and merge policy
//! - **impressions**: dual-indexed user-item "shown" index
//! - **temporal**: timestamped event log with lazily sorted projections
//! - **filters**: named user / item / entry predicates shared by all stores
//! - **types**: id newtypes and `AddingReturn`
//!
//! ## Example Usage
//!
//! ```
//! use data_core::{AddingReturn, ItemId, RatingMatrix, UserId};
//!
//! let mut matrix = RatingMatrix::new(0.0, true, true);
//! matrix.add_user(UserId(1));
//! matrix.add_item(ItemId(10));
//!
//! assert_eq!(matrix.rate(UserId(1), ItemId(10), 1.0), AddingReturn::Added);
//! assert_eq!(matrix.rate(UserId(1), ItemId(10), 1.0), AddingReturn::Updated);
//! assert_eq!(matrix.get_rating(UserId(1), ItemId(10)), Some(2.0));
//! ```
//!
//! Stores are built during a single load phase and only read afterwards, so
//! shared references can be handed to worker threads freely.

pub mod error;
pub mod filters;
pub mod impressions;
pub mod rating_matrix;
pub mod temporal;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataError, Result};
pub use filters::{
    Filter, ImpressionFilter, ImpressionSelection, ItemFilter, RatingFilter, RatingSelection,
    Selection, TemporalSelection, TimePointFilter, UserFilter,
};
pub use impressions::Impressions;
pub use rating_matrix::{MatrixConfig, RatingMatrix};
pub use temporal::TemporalDistribution;
pub use types::{AddingReturn, ImpressionEntry, ItemId, RatingEntry, TimePoint, UserId};
