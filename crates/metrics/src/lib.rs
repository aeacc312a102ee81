//! Statistics computed over the data-core stores.
//!
//! This crate provides:
//! - `GlobalProperty`: one number per dataset (`Density`, `GiniIndex`)
//! - `IndividualProperty`: per-rating / per-impression observations reduced
//!   globally, per user or per item (`InteractionCount`, `RatingValues`,
//!   `ImpressionCount`)
//! - Popularity, impression and rating-value distributions
//!
//! Every computation only borrows the stores it reads.
//!
//! ## Example Usage
//! ```
//! use data_core::{ItemId, RatingMatrix, RatingSelection, UserId};
//! use metrics::{Density, GlobalProperty, IndividualProperty, InteractionCount};
//!
//! let mut matrix = RatingMatrix::new(0.0, true, true);
//! matrix.add_user(UserId(1));
//! matrix.add_item(ItemId(10));
//! matrix.add_item(ItemId(20));
//! matrix.rate(UserId(1), ItemId(10), 1.0);
//!
//! let all = RatingSelection::all();
//! assert_eq!(Density::new(&matrix).compute(false, &all), 0.5);
//! assert_eq!(InteractionCount::new(&matrix).average_over_items(false, &all), 0.5);
//! ```

pub mod density;
pub mod distributions;
pub mod gini;
pub mod impression;
pub mod interaction;
pub mod rating;
pub mod reduction;
pub mod traits;

// Re-export main types
pub use density::Density;
pub use distributions::{CountDistribution, ImpressionDistribution, PopularityDistribution, RatingDistribution};
pub use gini::{gini_index, GiniIndex, SortOrder};
pub use impression::ImpressionCount;
pub use interaction::InteractionCount;
pub use rating::RatingValues;
pub use reduction::{Accumulator, Reduction};
pub use traits::{GlobalProperty, IndividualProperty};
