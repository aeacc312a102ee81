//! Counting interactions (ratings) of users and items.

use crate::traits::IndividualProperty;
use data_core::{ItemId, RatingEntry, RatingMatrix, RatingSelection, UserId};

/// Every selected rating observes `1.0`.
///
/// Totals are therefore rating counts, and the average / max / min of a
/// non-empty selection are all `1.0`.
#[derive(Debug, Clone, Copy)]
pub struct InteractionCount<'a> {
    matrix: &'a RatingMatrix,
}

impl<'a> InteractionCount<'a> {
    pub fn new(matrix: &'a RatingMatrix) -> Self {
        Self { matrix }
    }
}

impl IndividualProperty for InteractionCount<'_> {
    type Entry = RatingEntry;

    fn name(&self) -> &str {
        "interactions"
    }

    fn users(&self) -> Vec<UserId> {
        self.matrix.get_users().collect()
    }

    fn items(&self) -> Vec<ItemId> {
        self.matrix.get_items().collect()
    }

    fn contains_user(&self, user: UserId) -> bool {
        self.matrix.contains_user(user)
    }

    fn contains_item(&self, item: ItemId) -> bool {
        self.matrix.contains_item(item)
    }

    fn user_observations<'a>(
        &'a self,
        user: UserId,
        relevant: bool,
        selection: &'a RatingSelection,
    ) -> Box<dyn Iterator<Item = f64> + 'a> {
        Box::new(selected_user_ratings(self.matrix, user, relevant, selection).map(|_| 1.0))
    }

    fn item_observations<'a>(
        &'a self,
        item: ItemId,
        relevant: bool,
        selection: &'a RatingSelection,
    ) -> Box<dyn Iterator<Item = f64> + 'a> {
        Box::new(selected_item_ratings(self.matrix, item, relevant, selection).map(|_| 1.0))
    }

    /// Without filters the matrix counters already hold the answer.
    fn total(&self, relevant: bool, selection: &RatingSelection) -> f64 {
        if selection.is_unfiltered() {
            return self.matrix.get_num_ratings(relevant) as f64;
        }
        self.reduce(crate::Reduction::Total, relevant, selection)
    }
}

/// The ratings of a user that pass the item and rating filters.
pub(crate) fn selected_user_ratings<'a>(
    matrix: &'a RatingMatrix,
    user: UserId,
    relevant: bool,
    selection: &'a RatingSelection,
) -> impl Iterator<Item = RatingEntry> + 'a {
    matrix
        .get_user_ratings(user, relevant)
        .map(move |(item, value)| RatingEntry { user, item, value })
        .filter(move |entry| selection.accepts_item(entry.item) && selection.accepts_entry(entry))
}

/// The ratings of an item that pass the user and rating filters.
pub(crate) fn selected_item_ratings<'a>(
    matrix: &'a RatingMatrix,
    item: ItemId,
    relevant: bool,
    selection: &'a RatingSelection,
) -> impl Iterator<Item = RatingEntry> + 'a {
    matrix
        .get_item_ratings(item, relevant)
        .map(move |(user, value)| RatingEntry { user, item, value })
        .filter(move |entry| selection.accepts_user(entry.user) && selection.accepts_entry(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_core::{ItemFilter, UserFilter};

    fn sample() -> RatingMatrix {
        let mut matrix = RatingMatrix::new(3.0, false, false);
        for u in 1..=3 {
            matrix.add_user(UserId(u));
        }
        for i in [10, 20, 30] {
            matrix.add_item(ItemId(i));
        }
        matrix.rate(UserId(1), ItemId(10), 5.0);
        matrix.rate(UserId(1), ItemId(20), 1.0);
        matrix.rate(UserId(2), ItemId(10), 4.0);
        matrix.rate(UserId(2), ItemId(20), 3.0);
        matrix.rate(UserId(2), ItemId(30), 2.0);
        // user 3 has no ratings
        matrix
    }

    #[test]
    fn test_total_with_and_without_filters() {
        let matrix = sample();
        let count = InteractionCount::new(&matrix);
        let all = RatingSelection::all();

        assert_eq!(count.total(false, &all), 5.0);
        assert_eq!(count.total(true, &all), 3.0);

        let only_item_10 = RatingSelection::all().with_items(ItemFilter::any_of([ItemId(10)]));
        assert_eq!(count.total(false, &only_item_10), 2.0);

        // Slow path agrees with the counters
        let accept_all = RatingSelection::all().with_users(UserFilter::accept_all());
        assert_eq!(count.total(true, &accept_all), 3.0);
    }

    #[test]
    fn test_individual_observations_are_one() {
        let matrix = sample();
        let count = InteractionCount::new(&matrix);
        let all = RatingSelection::all();

        assert_eq!(count.average(false, &all), 1.0);
        assert_eq!(count.max(false, &all), 1.0);
        assert_eq!(count.min(false, &all), 1.0);

        let nobody = RatingSelection::all().with_users(UserFilter::any_of([]));
        assert_eq!(count.total(false, &nobody), 0.0);
        assert!(count.average(false, &nobody).is_nan());
    }

    #[test]
    fn test_per_entity_counts() {
        let matrix = sample();
        let count = InteractionCount::new(&matrix);
        let all = RatingSelection::all();

        let per_user = count.user_values(crate::Reduction::Total, false, &all);
        assert_eq!(per_user[&UserId(1)], 2.0);
        assert_eq!(per_user[&UserId(2)], 3.0);
        assert_eq!(per_user[&UserId(3)], 0.0);

        assert!((count.average_over_users(false, &all) - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(count.max_over_users(false, &all), 3.0);
        assert_eq!(count.min_over_users(false, &all), 0.0);
        assert_eq!(count.max_over_items(true, &all), 2.0);
        assert_eq!(count.min_over_items(true, &all), 0.0);
    }

    #[test]
    fn test_single_entity_values() {
        let matrix = sample();
        let count = InteractionCount::new(&matrix);
        let all = RatingSelection::all();

        assert_eq!(count.user_value(UserId(2), crate::Reduction::Total, true, &all), 2.0);
        assert_eq!(count.item_value(ItemId(20), crate::Reduction::Total, false, &all), 2.0);
        assert!(count.user_value(UserId(99), crate::Reduction::Total, false, &all).is_nan());
        // Known but without ratings
        assert_eq!(count.user_value(UserId(3), crate::Reduction::Total, false, &all), 0.0);
        assert!(count.user_value(UserId(3), crate::Reduction::Average, false, &all).is_nan());
    }
}
