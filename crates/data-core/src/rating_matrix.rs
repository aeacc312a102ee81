//! Dual-indexed sparse user-item rating matrix.
//!
//! Every rating is stored twice, once under the user and once under the
//! item, so both "what did this user rate" and "who rated this item" are a
//! single map lookup. The two indices are only ever written together.

use crate::error::{DataError, Result};
use crate::filters::RatingSelection;
use crate::types::{AddingReturn, ItemId, RatingEntry, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relevance and merge configuration of a [`RatingMatrix`].
///
/// Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Minimum value for a rating to count as relevant.
    pub threshold: f64,
    /// Store `1.0` / `0.0` (relevant or not) instead of the raw value.
    pub binarize: bool,
    /// Merge repeated ratings of the same pair instead of ignoring them.
    ///
    /// With `binarize`, repeated relevant observations are accumulated.
    /// Without it, the maximum observed value is kept.
    pub update: bool,
}

impl MatrixConfig {
    fn is_relevant(&self, value: f64) -> bool {
        if self.binarize {
            value > 0.0
        } else {
            value >= self.threshold
        }
    }
}

/// Sparse rating matrix with a forward (user -> item) and a reverse
/// (item -> user) index.
///
/// Users and items must be registered before any rating involving them is
/// accepted. A registered user or item with no ratings is still part of the
/// matrix (it counts for density and popularity distributions).
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    config: MatrixConfig,

    /// Ratings of each registered user
    user_to_items: BTreeMap<UserId, BTreeMap<ItemId, f64>>,
    /// Ratings received by each registered item
    item_to_users: BTreeMap<ItemId, BTreeMap<UserId, f64>>,

    // Distinct (user, item) pairs
    num_ratings: usize,
    num_rel_ratings: usize,
    // Every accepted call to `rate`, repetitions included
    num_total_ratings: usize,
    num_total_rel_ratings: usize,
}

impl RatingMatrix {
    /// Creates an empty matrix.
    pub fn new(threshold: f64, binarize: bool, update: bool) -> Self {
        Self::with_config(MatrixConfig {
            threshold,
            binarize,
            update,
        })
    }

    pub fn with_config(config: MatrixConfig) -> Self {
        Self {
            config,
            user_to_items: BTreeMap::new(),
            item_to_users: BTreeMap::new(),
            num_ratings: 0,
            num_rel_ratings: 0,
            num_total_ratings: 0,
            num_total_rel_ratings: 0,
        }
    }

    pub fn config(&self) -> MatrixConfig {
        self.config
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    pub fn is_binarized(&self) -> bool {
        self.config.binarize
    }

    // Mutators - used while loading a dataset

    /// Registers a user. Returns false if it was already present.
    pub fn add_user(&mut self, user: UserId) -> bool {
        if self.user_to_items.contains_key(&user) {
            return false;
        }
        self.user_to_items.insert(user, BTreeMap::new());
        true
    }

    /// Registers an item. Returns false if it was already present.
    pub fn add_item(&mut self, item: ItemId) -> bool {
        if self.item_to_users.contains_key(&item) {
            return false;
        }
        self.item_to_users.insert(item, BTreeMap::new());
        true
    }

    /// Adds or merges a rating, folding any rejection into
    /// [`AddingReturn::Error`].
    pub fn rate(&mut self, user: UserId, item: ItemId, value: f64) -> AddingReturn {
        self.try_rate(user, item, value).unwrap_or(AddingReturn::Error)
    }

    /// Adds or merges a rating.
    ///
    /// A new pair stores the (possibly binarized) value and returns `Added`.
    /// An existing pair is merged according to the matrix configuration:
    /// - `binarize && update`: the binarized value is added to the stored one
    /// - `update`: the stored value is raised to the new one if it is larger
    /// - otherwise the stored value is kept and `Unchanged` is returned
    ///
    /// Counters with repetitions are incremented on every accepted call. The
    /// distinct relevant counter moves only when a pair becomes relevant.
    pub fn try_rate(&mut self, user: UserId, item: ItemId, value: f64) -> Result<AddingReturn> {
        if value.is_nan() {
            return Err(DataError::InvalidRating(value));
        }
        if !self.item_to_users.contains_key(&item) {
            return Err(DataError::UnknownItem(item));
        }
        let Some(user_ratings) = self.user_to_items.get_mut(&user) else {
            return Err(DataError::UnknownUser(user));
        };

        let MatrixConfig {
            threshold,
            binarize,
            update,
        } = self.config;
        let rel = value >= threshold;
        let stored = if binarize {
            if rel { 1.0 } else { 0.0 }
        } else {
            value
        };

        self.num_total_ratings += 1;
        if rel {
            self.num_total_rel_ratings += 1;
        }

        let old = match user_ratings.get(&item).copied() {
            Some(old) => old,
            None => {
                user_ratings.insert(item, stored);
                self.mirror(user, item, stored);
                self.num_ratings += 1;
                if rel {
                    self.num_rel_ratings += 1;
                }
                return Ok(AddingReturn::Added);
            }
        };

        let merged = if binarize && update {
            old + stored
        } else if update && stored > old {
            stored
        } else {
            return Ok(AddingReturn::Unchanged);
        };

        let old_rel = self.config.is_relevant(old);
        user_ratings.insert(item, merged);
        self.mirror(user, item, merged);
        if !old_rel && rel {
            self.num_rel_ratings += 1;
        }
        Ok(AddingReturn::Updated)
    }

    /// Writes a value into the reverse index.
    fn mirror(&mut self, user: UserId, item: ItemId, value: f64) {
        if let Some(raters) = self.item_to_users.get_mut(&item) {
            raters.insert(user, value);
        }
    }

    // Getters

    /// Whether a stored value counts as relevant.
    ///
    /// Binarized matrices store counts of relevant observations, so any
    /// positive value is relevant.
    pub fn is_relevant(&self, value: f64) -> bool {
        self.config.is_relevant(value)
    }

    /// The stored value for a pair, if any.
    pub fn get_rating(&self, user: UserId, item: ItemId) -> Option<f64> {
        self.user_to_items.get(&user)?.get(&item).copied()
    }

    /// Number of distinct rated pairs.
    pub fn get_num_ratings(&self, relevant: bool) -> usize {
        if relevant {
            self.num_rel_ratings
        } else {
            self.num_ratings
        }
    }

    /// Number of accepted `rate` calls, repetitions included.
    pub fn get_num_total_ratings(&self, relevant: bool) -> usize {
        if relevant {
            self.num_total_rel_ratings
        } else {
            self.num_total_ratings
        }
    }

    /// Number of distinct items rated by a user (0 for unknown users).
    pub fn get_num_user_ratings(&self, user: UserId, relevant: bool) -> usize {
        self.get_user_ratings(user, relevant).count()
    }

    /// Number of distinct users who rated an item (0 for unknown items).
    pub fn get_num_item_ratings(&self, item: ItemId, relevant: bool) -> usize {
        self.get_item_ratings(item, relevant).count()
    }

    pub fn get_num_users(&self) -> usize {
        self.user_to_items.len()
    }

    pub fn get_num_items(&self) -> usize {
        self.item_to_users.len()
    }

    pub fn contains_user(&self, user: UserId) -> bool {
        self.user_to_items.contains_key(&user)
    }

    pub fn contains_item(&self, item: ItemId) -> bool {
        self.item_to_users.contains_key(&item)
    }

    /// Registered users, in ascending id order.
    pub fn get_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.user_to_items.keys().copied()
    }

    /// Registered items, in ascending id order.
    pub fn get_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.item_to_users.keys().copied()
    }

    /// The (item, value) ratings of a user.
    ///
    /// Empty for unknown users. With `relevant`, only relevant values.
    pub fn get_user_ratings(
        &self,
        user: UserId,
        relevant: bool,
    ) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.user_to_items
            .get(&user)
            .into_iter()
            .flat_map(|ratings| ratings.iter().map(|(&item, &value)| (item, value)))
            .filter(move |&(_, value)| !relevant || self.is_relevant(value))
    }

    /// The (user, value) ratings received by an item.
    ///
    /// Empty for unknown items. With `relevant`, only relevant values.
    pub fn get_item_ratings(
        &self,
        item: ItemId,
        relevant: bool,
    ) -> impl Iterator<Item = (UserId, f64)> + '_ {
        self.item_to_users
            .get(&item)
            .into_iter()
            .flat_map(|ratings| ratings.iter().map(|(&user, &value)| (user, value)))
            .filter(move |&(_, value)| !relevant || self.is_relevant(value))
    }

    /// Builds an independent matrix holding only the selected users, items
    /// and ratings.
    ///
    /// The copy is neither binarized nor updating. A binarized source keeps
    /// its accumulated counts as raw values with threshold `0.5`, so any
    /// pair observed as relevant at least once stays relevant.
    pub fn filter(&self, selection: &RatingSelection) -> RatingMatrix {
        let threshold = if self.config.binarize {
            0.5
        } else {
            self.config.threshold
        };
        let mut filtered = RatingMatrix::new(threshold, false, false);

        for item in self.get_items().filter(|&item| selection.accepts_item(item)) {
            filtered.add_item(item);
        }
        for user in self.get_users().filter(|&user| selection.accepts_user(user)) {
            filtered.add_user(user);
            for (item, value) in self.get_user_ratings(user, false) {
                let entry = RatingEntry { user, item, value };
                if selection.accepts_item(item) && selection.accepts_entry(&entry) {
                    filtered.rate(user, item, value);
                }
            }
        }
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ItemFilter, RatingFilter, UserFilter};

    fn matrix_with(users: &[u64], items: &[u64], threshold: f64, binarize: bool, update: bool) -> RatingMatrix {
        let mut matrix = RatingMatrix::new(threshold, binarize, update);
        for &u in users {
            matrix.add_user(UserId(u));
        }
        for &i in items {
            matrix.add_item(ItemId(i));
        }
        matrix
    }

    #[test]
    fn test_add_user_and_item_are_idempotent() {
        let mut matrix = RatingMatrix::new(0.0, false, false);
        assert!(matrix.add_user(UserId(1)));
        assert!(!matrix.add_user(UserId(1)));
        assert!(matrix.add_item(ItemId(1)));
        assert!(!matrix.add_item(ItemId(1)));
        assert_eq!(matrix.get_num_users(), 1);
        assert_eq!(matrix.get_num_items(), 1);
    }

    #[test]
    fn test_rate_rejects_nan_and_unknown_entities() {
        let mut matrix = matrix_with(&[1], &[10], 0.0, false, false);

        assert_eq!(matrix.rate(UserId(1), ItemId(10), f64::NAN), AddingReturn::Error);
        assert_eq!(matrix.rate(UserId(2), ItemId(10), 1.0), AddingReturn::Error);
        assert_eq!(matrix.rate(UserId(1), ItemId(20), 1.0), AddingReturn::Error);
        assert_eq!(
            matrix.try_rate(UserId(2), ItemId(10), 1.0),
            Err(DataError::UnknownUser(UserId(2)))
        );
        assert_eq!(
            matrix.try_rate(UserId(1), ItemId(20), 1.0),
            Err(DataError::UnknownItem(ItemId(20)))
        );

        // Nothing was counted
        assert_eq!(matrix.get_num_ratings(false), 0);
        assert_eq!(matrix.get_num_total_ratings(false), 0);
    }

    #[test]
    fn test_binarize_update_accumulates() {
        let mut matrix = matrix_with(&[1], &[10], 0.0, true, true);

        assert_eq!(matrix.rate(UserId(1), ItemId(10), 1.0), AddingReturn::Added);
        assert_eq!(matrix.rate(UserId(1), ItemId(10), 1.0), AddingReturn::Updated);

        assert_eq!(matrix.get_rating(UserId(1), ItemId(10)), Some(2.0));
        assert_eq!(matrix.get_num_ratings(false), 1);
        assert_eq!(matrix.get_num_ratings(true), 1);
        assert_eq!(matrix.get_num_total_ratings(false), 2);
        assert_eq!(matrix.get_num_total_ratings(true), 2);
    }

    #[test]
    fn test_binarize_update_relevance_transition() {
        let mut matrix = matrix_with(&[1], &[10], 3.0, true, true);

        // Below threshold: stored as 0.0, not relevant
        assert_eq!(matrix.rate(UserId(1), ItemId(10), 1.0), AddingReturn::Added);
        assert_eq!(matrix.get_rating(UserId(1), ItemId(10)), Some(0.0));
        assert_eq!(matrix.get_num_ratings(true), 0);

        // Becomes relevant on the first positive observation
        assert_eq!(matrix.rate(UserId(1), ItemId(10), 4.0), AddingReturn::Updated);
        assert_eq!(matrix.get_rating(UserId(1), ItemId(10)), Some(1.0));
        assert_eq!(matrix.get_num_ratings(true), 1);

        // Stays relevant, counter unchanged
        matrix.rate(UserId(1), ItemId(10), 5.0);
        assert_eq!(matrix.get_rating(UserId(1), ItemId(10)), Some(2.0));
        assert_eq!(matrix.get_num_ratings(true), 1);
        assert_eq!(matrix.get_num_total_ratings(true), 2);
        assert_eq!(matrix.get_num_total_ratings(false), 3);
    }

    #[test]
    fn test_update_keeps_maximum() {
        let mut matrix = matrix_with(&[1], &[10], 4.0, false, true);

        assert_eq!(matrix.rate(UserId(1), ItemId(10), 3.0), AddingReturn::Added);
        assert_eq!(matrix.get_num_ratings(true), 0);

        assert_eq!(matrix.rate(UserId(1), ItemId(10), 5.0), AddingReturn::Updated);
        assert_eq!(matrix.get_rating(UserId(1), ItemId(10)), Some(5.0));
        assert_eq!(matrix.get_num_ratings(true), 1);

        assert_eq!(matrix.rate(UserId(1), ItemId(10), 2.0), AddingReturn::Unchanged);
        assert_eq!(matrix.get_rating(UserId(1), ItemId(10)), Some(5.0));
        assert_eq!(matrix.get_num_ratings(false), 1);
        assert_eq!(matrix.get_num_total_ratings(false), 3);
    }

    #[test]
    fn test_no_update_ignores_repeats() {
        let mut matrix = matrix_with(&[1], &[10], 0.0, false, false);
        matrix.rate(UserId(1), ItemId(10), 1.0);
        assert_eq!(matrix.rate(UserId(1), ItemId(10), 5.0), AddingReturn::Unchanged);
        assert_eq!(matrix.get_rating(UserId(1), ItemId(10)), Some(1.0));
    }

    #[test]
    fn test_forward_and_reverse_indices_agree() {
        let mut matrix = matrix_with(&[1, 2, 3], &[10, 20], 2.5, false, true);
        matrix.rate(UserId(1), ItemId(10), 4.0);
        matrix.rate(UserId(2), ItemId(10), 1.0);
        matrix.rate(UserId(3), ItemId(20), 3.0);
        matrix.rate(UserId(3), ItemId(20), 5.0);

        for user in matrix.get_users().collect::<Vec<_>>() {
            for (item, value) in matrix.get_user_ratings(user, false) {
                let mirrored: Vec<_> = matrix
                    .get_item_ratings(item, false)
                    .filter(|&(u, _)| u == user)
                    .collect();
                assert_eq!(mirrored, vec![(user, value)]);
            }
        }
        assert_eq!(matrix.get_item_ratings(ItemId(20), false).collect::<Vec<_>>(), vec![(UserId(3), 5.0)]);
    }

    #[test]
    fn test_relevant_views() {
        let mut matrix = matrix_with(&[1, 2], &[10, 20], 3.0, false, false);
        matrix.rate(UserId(1), ItemId(10), 4.0);
        matrix.rate(UserId(1), ItemId(20), 2.0);
        matrix.rate(UserId(2), ItemId(10), 3.0);

        assert_eq!(matrix.get_num_user_ratings(UserId(1), false), 2);
        assert_eq!(matrix.get_num_user_ratings(UserId(1), true), 1);
        assert_eq!(matrix.get_num_item_ratings(ItemId(10), true), 2);
        assert_eq!(matrix.get_num_item_ratings(ItemId(20), true), 0);
        assert_eq!(matrix.get_num_ratings(true), 2);

        let relevant: Vec<_> = matrix.get_user_ratings(UserId(1), true).collect();
        assert_eq!(relevant, vec![(ItemId(10), 4.0)]);
    }

    #[test]
    fn test_unknown_queries_are_empty() {
        let matrix = RatingMatrix::new(0.0, false, false);
        assert_eq!(matrix.get_rating(UserId(1), ItemId(1)), None);
        assert_eq!(matrix.get_user_ratings(UserId(1), false).count(), 0);
        assert_eq!(matrix.get_item_ratings(ItemId(1), true).count(), 0);
        assert_eq!(matrix.get_num_user_ratings(UserId(1), false), 0);
        assert_eq!(matrix.get_num_item_ratings(ItemId(1), false), 0);
    }

    #[test]
    fn test_user_ratings_are_restartable() {
        let mut matrix = matrix_with(&[1], &[10, 20], 0.0, false, false);
        matrix.rate(UserId(1), ItemId(10), 1.0);
        matrix.rate(UserId(1), ItemId(20), 2.0);

        let first: Vec<_> = matrix.get_user_ratings(UserId(1), false).collect();
        let second: Vec<_> = matrix.get_user_ratings(UserId(1), false).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_filter_builds_independent_copy() {
        let mut matrix = matrix_with(&[1, 2, 3], &[10, 20, 30], 0.0, true, true);
        matrix.rate(UserId(1), ItemId(10), 1.0);
        matrix.rate(UserId(1), ItemId(10), 1.0);
        matrix.rate(UserId(1), ItemId(20), 1.0);
        matrix.rate(UserId(2), ItemId(30), 1.0);
        matrix.rate(UserId(3), ItemId(10), 1.0);

        let selection = RatingSelection::all()
            .with_users(UserFilter::any_of([UserId(1), UserId(2)]))
            .with_items(ItemFilter::any_of([ItemId(10), ItemId(30)]));
        let mut filtered = matrix.filter(&selection);

        assert_eq!(filtered.get_num_users(), 2);
        assert_eq!(filtered.get_num_items(), 2);
        assert_eq!(filtered.get_num_ratings(false), 2);
        assert_eq!(filtered.get_rating(UserId(1), ItemId(10)), Some(2.0));
        assert_eq!(filtered.get_rating(UserId(1), ItemId(20)), None);
        assert!(!filtered.is_binarized());
        assert_eq!(filtered.threshold(), 0.5);
        assert!(filtered.is_relevant(2.0));

        // Writing to the copy leaves the source untouched
        filtered.rate(UserId(2), ItemId(10), 1.0);
        assert_eq!(matrix.get_rating(UserId(2), ItemId(10)), None);
    }

    #[test]
    fn test_filter_by_rating_value() {
        let mut matrix = matrix_with(&[1, 2], &[10], 3.0, false, false);
        matrix.rate(UserId(1), ItemId(10), 4.0);
        matrix.rate(UserId(2), ItemId(10), 2.0);

        let filtered = matrix.filter(&RatingSelection::all().with_entries(RatingFilter::min_value(3.0)));
        assert_eq!(filtered.get_num_users(), 2);
        assert_eq!(filtered.get_num_ratings(false), 1);
        assert_eq!(filtered.threshold(), 3.0);
        assert_eq!(filtered.get_rating(UserId(2), ItemId(10)), None);
    }
}
