//! Named statistics of a loaded dataset.
//!
//! A [`Statistics`] table keeps its rows in insertion order, so the text
//! and JSON reports list them the way they were computed.

use data_core::{ImpressionSelection, Impressions, RatingMatrix, RatingSelection, TemporalDistribution};
use data_loader::{ContentWiseDataset, ReplayerDataset};
use metrics::{Density, GiniIndex, GlobalProperty, ImpressionCount, IndividualProperty, InteractionCount};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Value of one statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(usize),
    Real(f64),
    /// `None` when the dataset holds no timestamped event.
    Timestamp(Option<i64>),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(value) => write!(f, "{}", value),
            StatValue::Real(value) if value.is_nan() => write!(f, "NaN"),
            StatValue::Real(value) => write!(f, "{}", value),
            StatValue::Timestamp(Some(value)) => write!(f, "{}", value),
            StatValue::Timestamp(None) => write!(f, "NaN"),
        }
    }
}

/// Ordered table of named statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    entries: Vec<(String, StatValue)>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statistic. A name added twice keeps its first position and
    /// takes the new value.
    pub fn add(&mut self, name: impl Into<String>, value: StatValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn add_count(&mut self, name: impl Into<String>, value: usize) {
        self.add(name, StatValue::Count(value));
    }

    pub fn add_real(&mut self, name: impl Into<String>, value: f64) {
        self.add(name, StatValue::Real(value));
    }

    pub fn get(&self, name: &str) -> Option<StatValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|&(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StatValue)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Serialized as a JSON object whose keys keep insertion order
impl Serialize for Statistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Shared blocks
// =============================================================================

/// Average / max / min ratings per user and per item of one matrix.
///
/// `kind` names what the matrix columns are ("item", "series").
fn add_interaction_stats(stats: &mut Statistics, matrix: &RatingMatrix, kind: &str, from_impressions: bool) {
    let count = InteractionCount::new(matrix);
    let all = RatingSelection::all();

    let (user_suffix, item_suffix) = if from_impressions {
        (format!("({}, from impressions)", kind), " (from impressions)".to_string())
    } else {
        (format!("({})", kind), String::new())
    };

    stats.add_real(
        format!("Average ratings per user {}", user_suffix),
        count.average_over_users(false, &all),
    );
    stats.add_real(
        format!("Max ratings per user {}", user_suffix),
        count.max_over_users(false, &all),
    );
    stats.add_real(
        format!("Min ratings per user {}", user_suffix),
        count.min_over_users(false, &all),
    );
    stats.add_real(
        format!("Average ratings per {}{}", kind, item_suffix),
        count.average_over_items(false, &all),
    );
    stats.add_real(
        format!("Max ratings per {}{}", kind, item_suffix),
        count.max_over_items(false, &all),
    );
    stats.add_real(
        format!("Min ratings per {}{}", kind, item_suffix),
        count.min_over_items(false, &all),
    );
}

/// Average / max / min impressions per user and per shown entity.
fn add_impression_stats(stats: &mut Statistics, matrix: &RatingMatrix, impressions: &Impressions, kind: &str) {
    let count = ImpressionCount::new(matrix, impressions);
    let all = ImpressionSelection::all();

    stats.add_real("Average impressions per user", count.average_over_users(false, &all));
    stats.add_real("Max impressions per user", count.max_over_users(false, &all));
    stats.add_real("Min impressions per user", count.min_over_users(false, &all));
    stats.add_real(
        format!("Average impressions per {}", kind),
        count.average_over_items(false, &all),
    );
    stats.add_real(format!("Max impressions per {}", kind), count.max_over_items(false, &all));
    stats.add_real(format!("Min impressions per {}", kind), count.min_over_items(false, &all));
}

fn add_time_range(stats: &mut Statistics, timeline: &TemporalDistribution) {
    stats.add("Min. timestamp", StatValue::Timestamp(timeline.min_timestamp()));
    stats.add("Max. timestamp", StatValue::Timestamp(timeline.max_timestamp()));
}

// =============================================================================
// Per dataset
// =============================================================================

/// Statistics of a ContentWise dataset.
///
/// Timelines are only read; the mutable borrow comes from their accessors.
pub fn contentwise_statistics(dataset: &mut ContentWiseDataset) -> Statistics {
    let mut stats = Statistics::new();
    let all = RatingSelection::all();

    let user_item = dataset.get_user_item_matrix();
    let user_series = dataset.get_user_series_matrix();
    let user_item_impr = dataset.get_user_item_impr_matrix();
    let user_series_impr = dataset.get_user_series_impr_matrix();
    let impressions = dataset.get_impressions();

    stats.add_count("# users", dataset.get_num_users());
    stats.add_count("# items", dataset.get_num_items());
    stats.add_count("# series", dataset.get_num_series());
    stats.add_count("# total interactions (with reps)", user_item.get_num_total_ratings(false));
    stats.add_count("# impressions", impressions.get_num_impressions());
    stats.add_count(
        "# total interactions from impressions (with reps)",
        user_item_impr.get_num_total_ratings(false),
    );

    stats.add_count("# user-item interactions (no reps)", user_item.get_num_ratings(false));
    stats.add_count("# user-series interactions (no reps)", user_series.get_num_ratings(false));
    stats.add_count(
        "# user-item interactions from impressions (no reps)",
        user_item_impr.get_num_ratings(false),
    );
    stats.add_count(
        "# user-series interactions from impressions (no reps)",
        user_series_impr.get_num_ratings(false),
    );

    stats.add_real("Density (items)", Density::new(user_item).compute(false, &all));
    stats.add_real("Density (series)", Density::new(user_series).compute(false, &all));
    stats.add_real(
        "Density (items, from impressions)",
        Density::new(user_item_impr).compute(false, &all),
    );
    stats.add_real(
        "Density (series, from impressions)",
        Density::new(user_series_impr).compute(false, &all),
    );

    add_interaction_stats(&mut stats, user_item, "item", false);
    add_interaction_stats(&mut stats, user_series, "series", false);
    add_interaction_stats(&mut stats, user_item_impr, "item", true);
    add_interaction_stats(&mut stats, user_series_impr, "series", true);

    stats.add_real("Item Gini", GiniIndex::items(user_item).compute(false, &all));
    stats.add_real("Series Gini", GiniIndex::items(user_series).compute(false, &all));
    stats.add_real(
        "Item Gini (from impressions)",
        GiniIndex::items(user_item_impr).compute(false, &all),
    );
    stats.add_real(
        "Series Gini (from impressions)",
        GiniIndex::items(user_series_impr).compute(false, &all),
    );
    stats.add_real("User Gini (item)", GiniIndex::users(user_item).compute(false, &all));
    stats.add_real("User Gini (series)", GiniIndex::users(user_series).compute(false, &all));
    stats.add_real(
        "User Gini (item, from impressions)",
        GiniIndex::users(user_item_impr).compute(false, &all),
    );
    stats.add_real(
        "User Gini (series, from impressions)",
        GiniIndex::users(user_series_impr).compute(false, &all),
    );

    // Impressions show series, so they pair with the user-series matrix
    add_impression_stats(&mut stats, user_series, impressions, "series");

    add_time_range(&mut stats, dataset.get_user_item_timeline());

    debug!("Computed {} ContentWise statistics", stats.len());
    stats
}

/// Statistics of a Yahoo R6B (Replayer) dataset.
pub fn replayer_statistics(dataset: &mut ReplayerDataset) -> Statistics {
    let mut stats = Statistics::new();
    let all = RatingSelection::all();

    let user_item = dataset.get_user_item_matrix();
    let impressions = dataset.get_impressions();

    stats.add_count("# users", dataset.get_num_users());
    stats.add_count("# items", dataset.get_num_items());
    stats.add_count("# total interactions (with reps)", user_item.get_num_total_ratings(false));
    stats.add_count("# impressions", impressions.get_num_impressions());
    stats.add_count("# user-item interactions (no reps)", user_item.get_num_ratings(false));

    stats.add_real("Density (items)", Density::new(user_item).compute(false, &all));

    add_interaction_stats(&mut stats, user_item, "item", false);

    stats.add_real("Item Gini", GiniIndex::items(user_item).compute(false, &all));
    stats.add_real("User Gini (item)", GiniIndex::users(user_item).compute(false, &all));

    add_impression_stats(&mut stats, user_item, impressions, "item");

    add_time_range(&mut stats, dataset.get_user_item_timeline());

    debug!("Computed {} Replayer statistics", stats.len());
    stats
}
