//! Popularity, impression and rating-value distributions.

use crate::gini::{gini_index, SortOrder};
use crate::impression::ImpressionCount;
use crate::interaction::InteractionCount;
use crate::reduction::Reduction;
use crate::traits::IndividualProperty;
use data_core::{Impressions, ImpressionSelection, ItemId, RatingMatrix, RatingSelection, UserId};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// A per-entity count distribution sorted by descending count.
///
/// Ties keep ascending id order.
pub trait CountDistribution {
    type Key: Copy;

    fn entries(&self) -> &[(Self::Key, usize)];

    /// The counts alone, largest first.
    fn counts(&self) -> Vec<usize> {
        self.entries().iter().map(|&(_, count)| count).collect()
    }

    /// The counts as reals, largest first.
    fn values(&self) -> Vec<f64> {
        self.entries().iter().map(|&(_, count)| count as f64).collect()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Sum of every count.
    fn total(&self) -> usize {
        self.entries().iter().map(|&(_, count)| count).sum()
    }

    fn gini(&self) -> f64 {
        gini_index(&self.values(), SortOrder::Descending)
    }
}

fn sorted_counts<K: Ord + Copy>(values: BTreeMap<K, f64>) -> Vec<(K, usize)> {
    let mut entries: Vec<(K, usize)> = values
        .into_iter()
        .map(|(key, value)| (key, value as usize))
        .collect();
    // Stable: ids stay ascending among equal counts
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

// =============================================================================
// Ratings per entity
// =============================================================================

/// Number of (relevant) ratings of every user or item of a matrix, zero
/// counts included.
#[derive(Debug, Clone, PartialEq)]
pub struct PopularityDistribution<K> {
    entries: Vec<(K, usize)>,
}

impl PopularityDistribution<UserId> {
    /// Ratings given by each selected user.
    pub fn users(matrix: &RatingMatrix, relevant: bool, selection: &RatingSelection) -> Self {
        let values = InteractionCount::new(matrix).user_values(Reduction::Total, relevant, selection);
        Self {
            entries: sorted_counts(values),
        }
    }
}

impl PopularityDistribution<ItemId> {
    /// Ratings received by each selected item.
    pub fn items(matrix: &RatingMatrix, relevant: bool, selection: &RatingSelection) -> Self {
        let values = InteractionCount::new(matrix).item_values(Reduction::Total, relevant, selection);
        Self {
            entries: sorted_counts(values),
        }
    }
}

impl<K: Copy> CountDistribution for PopularityDistribution<K> {
    type Key = K;

    fn entries(&self) -> &[(K, usize)] {
        &self.entries
    }
}

// =============================================================================
// Impressions per entity
// =============================================================================

/// Number of impressions of every user or item, zero counts included.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpressionDistribution<K> {
    entries: Vec<(K, usize)>,
}

impl ImpressionDistribution<UserId> {
    /// Distinct items shown to each user.
    pub fn users(impressions: &Impressions) -> Self {
        Self {
            entries: sorted_by_count(
                impressions
                    .get_users()
                    .map(|user| (user, impressions.get_num_user_impressions(user))),
            ),
        }
    }

    /// Impressions per selected user, optionally restricted to impressions
    /// the user rated as relevant in `matrix`.
    pub fn users_selected(
        matrix: &RatingMatrix,
        impressions: &Impressions,
        relevant: bool,
        selection: &ImpressionSelection,
    ) -> Self {
        let values = ImpressionCount::new(matrix, impressions).user_values(Reduction::Total, relevant, selection);
        Self {
            entries: sorted_counts(values),
        }
    }
}

impl ImpressionDistribution<ItemId> {
    /// Distinct users each item was shown to.
    pub fn items(impressions: &Impressions) -> Self {
        Self {
            entries: sorted_by_count(
                impressions
                    .get_items()
                    .map(|item| (item, impressions.get_num_item_impressions(item))),
            ),
        }
    }

    pub fn items_selected(
        matrix: &RatingMatrix,
        impressions: &Impressions,
        relevant: bool,
        selection: &ImpressionSelection,
    ) -> Self {
        let values = ImpressionCount::new(matrix, impressions).item_values(Reduction::Total, relevant, selection);
        Self {
            entries: sorted_counts(values),
        }
    }
}

impl<K: Copy> CountDistribution for ImpressionDistribution<K> {
    type Key = K;

    fn entries(&self) -> &[(K, usize)] {
        &self.entries
    }
}

fn sorted_by_count<K>(counts: impl Iterator<Item = (K, usize)>) -> Vec<(K, usize)> {
    let mut entries: Vec<_> = counts.collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

// =============================================================================
// Rating values
// =============================================================================

/// How many stored ratings hold each distinct value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingDistribution {
    counts: BTreeMap<OrderedFloat<f64>, usize>,
}

impl RatingDistribution {
    pub fn new(matrix: &RatingMatrix) -> Self {
        let mut counts = BTreeMap::new();
        for user in matrix.get_users() {
            for (_, value) in matrix.get_user_ratings(user, false) {
                *counts.entry(OrderedFloat(value)).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// Number of ratings storing exactly `value`.
    pub fn get(&self, value: f64) -> usize {
        self.counts.get(&OrderedFloat(value)).copied().unwrap_or(0)
    }

    /// (value, count) pairs in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.counts.iter().map(|(value, &count)| (value.into_inner(), count))
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
