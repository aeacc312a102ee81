//! # Data Loader Crate
//!
//! Reads recommendation datasets from disk into the data-core stores.
//!
//! ## Main Components
//!
//! - **contentwise**: ContentWise Impressions (interactions plus two
//!   impression CSV files)
//! - **replayer**: Yahoo! R6B, a directory of space-separated event logs
//! - **parser**: CSV and list parsing helpers
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{ReplayerDataset, ReplayerOptions};
//! use std::path::Path;
//!
//! let options = ReplayerOptions { min_interactions_per_user: 5, ..Default::default() };
//! let dataset = ReplayerDataset::load(Path::new("data/R6B"), options)?;
//!
//! println!("{} users, {} articles", dataset.get_num_users(), dataset.get_num_items());
//! ```

// Public modules
pub mod contentwise;
pub mod error;
pub mod parser;
pub mod replayer;

// Re-export commonly used types for convenience
pub use contentwise::{ContentWiseDataset, ContentWiseItem, ContentWiseItemType, ContentWiseSeries};
pub use error::{LoadError, Result};
pub use replayer::{ReplayerDataset, ReplayerOptions, NUM_USER_FEATURES};
