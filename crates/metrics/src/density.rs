//! Fraction of the user-item matrix holding a rating.

use crate::interaction::InteractionCount;
use crate::traits::{GlobalProperty, IndividualProperty};
use data_core::{RatingMatrix, RatingSelection};

#[derive(Debug, Clone, Copy)]
pub struct Density<'a> {
    matrix: &'a RatingMatrix,
}

impl<'a> Density<'a> {
    pub fn new(matrix: &'a RatingMatrix) -> Self {
        Self { matrix }
    }
}

impl GlobalProperty for Density<'_> {
    fn name(&self) -> &str {
        "density"
    }

    /// Selected (relevant) ratings over selected users times selected items.
    ///
    /// `NaN` when no user or no item is selected.
    fn compute(&self, relevant: bool, selection: &RatingSelection) -> f64 {
        let (num_users, num_items) = if selection.is_unfiltered() {
            (self.matrix.get_num_users(), self.matrix.get_num_items())
        } else {
            (
                self.matrix.get_users().filter(|&u| selection.accepts_user(u)).count(),
                self.matrix.get_items().filter(|&i| selection.accepts_item(i)).count(),
            )
        };
        if num_users == 0 || num_items == 0 {
            return f64::NAN;
        }

        let ratings = InteractionCount::new(self.matrix).total(relevant, selection);
        ratings / (num_users as f64 * num_items as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_core::{ItemFilter, ItemId, UserFilter, UserId};

    fn sample() -> RatingMatrix {
        let mut matrix = RatingMatrix::new(3.0, false, false);
        for u in 1..=4 {
            matrix.add_user(UserId(u));
        }
        for i in 1..=5 {
            matrix.add_item(ItemId(i));
        }
        matrix.rate(UserId(1), ItemId(1), 5.0);
        matrix.rate(UserId(1), ItemId(2), 1.0);
        matrix.rate(UserId(2), ItemId(1), 4.0);
        matrix.rate(UserId(3), ItemId(5), 2.0);
        matrix
    }

    #[test]
    fn test_unfiltered_density() {
        let matrix = sample();
        let density = Density::new(&matrix);
        let all = RatingSelection::all();

        assert_eq!(density.compute(false, &all), 4.0 / 20.0);
        assert_eq!(density.compute(true, &all), 2.0 / 20.0);
    }

    #[test]
    fn test_filtered_density() {
        let matrix = sample();
        let density = Density::new(&matrix);

        let selection = RatingSelection::all()
            .with_users(UserFilter::any_of([UserId(1), UserId(2)]))
            .with_items(ItemFilter::any_of([ItemId(1)]));
        assert_eq!(density.compute(false, &selection), 1.0);

        let no_ratings = RatingSelection::all().with_users(UserFilter::any_of([UserId(4)]));
        assert_eq!(density.compute(false, &no_ratings), 0.0);

        let no_items = RatingSelection::all().with_items(ItemFilter::any_of([]));
        assert!(density.compute(false, &no_items).is_nan());
    }

    #[test]
    fn test_empty_matrix_is_nan() {
        let matrix = RatingMatrix::new(0.0, false, false);
        assert!(Density::new(&matrix).compute(false, &RatingSelection::all()).is_nan());
    }
}
