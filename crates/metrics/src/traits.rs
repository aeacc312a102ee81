//! Core traits of the metrics layer.
//!
//! Two shapes of statistic exist:
//! - [`GlobalProperty`]: one number for a whole (filtered) rating matrix,
//!   such as density or a Gini index
//! - [`IndividualProperty`]: values observed on each rating (or impression),
//!   aggregated globally, per user or per item with a [`Reduction`]
//!
//! An `IndividualProperty` only has to say which entities exist and which
//! values each entity produces; every aggregation is a provided method.

use crate::reduction::{Accumulator, Reduction};
use data_core::{ItemId, RatingSelection, Selection, UserId};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// A statistic of the whole dataset.
pub trait GlobalProperty: Send + Sync {
    /// Returns the name of this property (for logging/debugging)
    fn name(&self) -> &str;

    /// Computes the property over the selected users, items and ratings.
    ///
    /// With `relevant`, only relevant ratings are taken into account.
    fn compute(&self, relevant: bool, selection: &RatingSelection) -> f64;
}

/// A value observed on every stored rating or impression.
///
/// ## Design Note
/// - `Entry` is the type the selection's entry filter sees
///   (`RatingEntry` or `ImpressionEntry`)
/// - observations of a user honour the selection's item and entry filters,
///   observations of an item honour the user and entry filters
/// - provided aggregations fan entities out over the rayon pool; the
///   underlying stores are only read
pub trait IndividualProperty: Sync {
    type Entry: Send + Sync + 'static;

    /// Returns the name of this property (for logging/debugging)
    fn name(&self) -> &str;

    /// Every user known to the underlying store.
    fn users(&self) -> Vec<UserId>;

    /// Every item known to the underlying store.
    fn items(&self) -> Vec<ItemId>;

    fn contains_user(&self, user: UserId) -> bool;

    fn contains_item(&self, item: ItemId) -> bool;

    /// Values observed on the user's selected ratings / impressions.
    fn user_observations<'a>(
        &'a self,
        user: UserId,
        relevant: bool,
        selection: &'a Selection<Self::Entry>,
    ) -> Box<dyn Iterator<Item = f64> + 'a>;

    /// Values observed on the item's selected ratings / impressions.
    fn item_observations<'a>(
        &'a self,
        item: ItemId,
        relevant: bool,
        selection: &'a Selection<Self::Entry>,
    ) -> Box<dyn Iterator<Item = f64> + 'a>;

    // =========================================================================
    // Whole dataset
    // =========================================================================

    /// Reduces every selected observation of the dataset.
    fn reduce(&self, reduction: Reduction, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        selected_users(self, selection)
            .par_iter()
            .map(|&user| {
                self.user_observations(user, relevant, selection)
                    .collect::<Accumulator>()
            })
            .reduce(Accumulator::default, Accumulator::merge)
            .finish(reduction)
    }

    fn total(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.reduce(Reduction::Total, relevant, selection)
    }

    fn average(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.reduce(Reduction::Average, relevant, selection)
    }

    fn max(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.reduce(Reduction::Max, relevant, selection)
    }

    fn min(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.reduce(Reduction::Min, relevant, selection)
    }

    // =========================================================================
    // Single entity
    // =========================================================================

    /// Reduces one user's observations. `NaN` for unknown users.
    fn user_value(
        &self,
        user: UserId,
        reduction: Reduction,
        relevant: bool,
        selection: &Selection<Self::Entry>,
    ) -> f64 {
        if !self.contains_user(user) {
            return f64::NAN;
        }
        self.user_observations(user, relevant, selection)
            .collect::<Accumulator>()
            .finish(reduction)
    }

    /// Reduces one item's observations. `NaN` for unknown items.
    fn item_value(
        &self,
        item: ItemId,
        reduction: Reduction,
        relevant: bool,
        selection: &Selection<Self::Entry>,
    ) -> f64 {
        if !self.contains_item(item) {
            return f64::NAN;
        }
        self.item_observations(item, relevant, selection)
            .collect::<Accumulator>()
            .finish(reduction)
    }

    // =========================================================================
    // Every entity
    // =========================================================================

    /// The reduced value of every selected user.
    fn user_values(
        &self,
        reduction: Reduction,
        relevant: bool,
        selection: &Selection<Self::Entry>,
    ) -> BTreeMap<UserId, f64> {
        selected_users(self, selection)
            .par_iter()
            .map(|&user| {
                let acc: Accumulator = self.user_observations(user, relevant, selection).collect();
                (user, acc.finish(reduction))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    /// The reduced value of every selected item.
    fn item_values(
        &self,
        reduction: Reduction,
        relevant: bool,
        selection: &Selection<Self::Entry>,
    ) -> BTreeMap<ItemId, f64> {
        selected_items(self, selection)
            .par_iter()
            .map(|&item| {
                let acc: Accumulator = self.item_observations(item, relevant, selection).collect();
                (item, acc.finish(reduction))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    /// Reduces the per-user totals (e.g. the average number of ratings per
    /// user).
    fn over_users(&self, reduction: Reduction, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.user_values(Reduction::Total, relevant, selection)
            .into_values()
            .collect::<Accumulator>()
            .finish(reduction)
    }

    /// Reduces the per-item totals.
    fn over_items(&self, reduction: Reduction, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.item_values(Reduction::Total, relevant, selection)
            .into_values()
            .collect::<Accumulator>()
            .finish(reduction)
    }

    fn average_over_users(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.over_users(Reduction::Average, relevant, selection)
    }

    fn max_over_users(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.over_users(Reduction::Max, relevant, selection)
    }

    fn min_over_users(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.over_users(Reduction::Min, relevant, selection)
    }

    fn average_over_items(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.over_items(Reduction::Average, relevant, selection)
    }

    fn max_over_items(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.over_items(Reduction::Max, relevant, selection)
    }

    fn min_over_items(&self, relevant: bool, selection: &Selection<Self::Entry>) -> f64 {
        self.over_items(Reduction::Min, relevant, selection)
    }
}

fn selected_users<P: IndividualProperty + ?Sized>(property: &P, selection: &Selection<P::Entry>) -> Vec<UserId> {
    property
        .users()
        .into_iter()
        .filter(|&user| selection.accepts_user(user))
        .collect()
}

fn selected_items<P: IndividualProperty + ?Sized>(property: &P, selection: &Selection<P::Entry>) -> Vec<ItemId> {
    property
        .items()
        .into_iter()
        .filter(|&item| selection.accepts_item(item))
        .collect()
}
