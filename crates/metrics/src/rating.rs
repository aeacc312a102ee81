//! Statistics of the stored rating values.

use crate::interaction::{selected_item_ratings, selected_user_ratings};
use crate::traits::IndividualProperty;
use data_core::{ItemId, RatingEntry, RatingMatrix, RatingSelection, UserId};

/// Every selected rating observes its stored value.
///
/// On a binarized matrix the stored value is the number of relevant
/// observations of the pair, so totals count repeated relevant interactions.
#[derive(Debug, Clone, Copy)]
pub struct RatingValues<'a> {
    matrix: &'a RatingMatrix,
}

impl<'a> RatingValues<'a> {
    pub fn new(matrix: &'a RatingMatrix) -> Self {
        Self { matrix }
    }
}

impl IndividualProperty for RatingValues<'_> {
    type Entry = RatingEntry;

    fn name(&self) -> &str {
        "ratings"
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
        Box::new(selected_user_ratings(self.matrix, user, relevant, selection).map(|entry| entry.value))
    }

    fn item_observations<'a>(
        &'a self,
        item: ItemId,
        relevant: bool,
        selection: &'a RatingSelection,
    ) -> Box<dyn Iterator<Item = f64> + 'a> {
        Box::new(selected_item_ratings(self.matrix, item, relevant, selection).map(|entry| entry.value))
    }
}
