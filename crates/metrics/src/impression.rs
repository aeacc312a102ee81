//! Counting impressions of users and items.

use crate::reduction::Reduction;
use crate::traits::IndividualProperty;
use data_core::{ImpressionEntry, ImpressionSelection, Impressions, ItemId, RatingMatrix, UserId};

/// Every selected impression observes `1.0`.
///
/// The rating matrix of the same dataset gives meaning to `relevant`: an
/// impression is relevant when its (user, item) pair holds a relevant rating.
#[derive(Debug, Clone, Copy)]
pub struct ImpressionCount<'a> {
    matrix: &'a RatingMatrix,
    impressions: &'a Impressions,
}

impl<'a> ImpressionCount<'a> {
    pub fn new(matrix: &'a RatingMatrix, impressions: &'a Impressions) -> Self {
        Self { matrix, impressions }
    }

    fn is_relevant(&self, user: UserId, item: ItemId) -> bool {
        self.matrix
            .get_rating(user, item)
            .is_some_and(|value| self.matrix.is_relevant(value))
    }
}

impl IndividualProperty for ImpressionCount<'_> {
    type Entry = ImpressionEntry;

    fn name(&self) -> &str {
        "impressions"
    }

    fn users(&self) -> Vec<UserId> {
        self.impressions.get_users().collect()
    }

    fn items(&self) -> Vec<ItemId> {
        self.impressions.get_items().collect()
    }

    fn contains_user(&self, user: UserId) -> bool {
        self.impressions.contains_user(user)
    }

    fn contains_item(&self, item: ItemId) -> bool {
        self.impressions.contains_item(item)
    }

    fn user_observations<'a>(
        &'a self,
        user: UserId,
        relevant: bool,
        selection: &'a ImpressionSelection,
    ) -> Box<dyn Iterator<Item = f64> + 'a> {
        Box::new(
            self.impressions
                .get_user_impressions(user)
                .filter(move |&item| {
                    selection.accepts_item(item)
                        && selection.accepts_entry(&ImpressionEntry { user, item })
                        && (!relevant || self.is_relevant(user, item))
                })
                .map(|_| 1.0),
        )
    }

    fn item_observations<'a>(
        &'a self,
        item: ItemId,
        relevant: bool,
        selection: &'a ImpressionSelection,
    ) -> Box<dyn Iterator<Item = f64> + 'a> {
        Box::new(
            self.impressions
                .get_item_impressions(item)
                .filter(move |&user| {
                    selection.accepts_user(user)
                        && selection.accepts_entry(&ImpressionEntry { user, item })
                        && (!relevant || self.is_relevant(user, item))
                })
                .map(|_| 1.0),
        )
    }

    fn total(&self, relevant: bool, selection: &ImpressionSelection) -> f64 {
        if !relevant && selection.is_unfiltered() {
            return self.impressions.get_num_impressions() as f64;
        }
        self.reduce(Reduction::Total, relevant, selection)
    }
}
