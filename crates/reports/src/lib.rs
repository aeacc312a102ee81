//! # Reports Crate
//!
//! Turns a loaded dataset into the text reports of an analysis run.
//!
//! ## Main Components
//!
//! - **statistics**: ordered table of named dataset statistics
//! - **writers**: tab-separated writers for statistics and distributions
//! - **analyzer**: computes everything for one dataset and writes it to an
//!   output directory

pub mod analyzer;
pub mod error;
pub mod statistics;
pub mod writers;

// Re-export commonly used types for convenience
pub use analyzer::{analyze_contentwise, analyze_replayer, AnalysisOptions};
pub use error::{ReportError, Result};
pub use statistics::{contentwise_statistics, replayer_statistics, StatValue, Statistics};
pub use writers::{
    ImpressionDistributionWriter, PopularityDistributionWriter, StatisticsWriter, TemporalDistributionWriter,
};
