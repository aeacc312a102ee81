//! Gini index of per-entity popularity.

use crate::distributions::{CountDistribution, PopularityDistribution};
use crate::traits::GlobalProperty;
use data_core::{RatingMatrix, RatingSelection};
use serde::{Deserialize, Serialize};

/// Order of the values handed to [`gini_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
    /// Sorted internally before computing.
    Unsorted,
}

/// Gini index of a set of non-negative values.
///
/// `G = Σ (2i - n + 1) x_i / ((n - 1) Σ x)` over the ascending sequence, with
/// `i` counted from zero. `0` means every value is equal; one entity holding
/// everything gives exactly `1`.
///
/// Returns `NaN` for fewer than two values or an all-zero distribution.
pub fn gini_index(values: &[f64], order: SortOrder) -> f64 {
    let n = values.len();
    if n <= 1 {
        return f64::NAN;
    }
    let sum: f64 = values.iter().sum();
    if sum == 0.0 {
        return f64::NAN;
    }

    let nf = n as f64;
    let weighted: f64 = match order {
        SortOrder::Ascending => values
            .iter()
            .enumerate()
            .map(|(i, x)| (2.0 * i as f64 - nf + 1.0) * x)
            .sum(),
        SortOrder::Descending => values
            .iter()
            .enumerate()
            .map(|(i, x)| (nf - 1.0 - 2.0 * i as f64) * x)
            .sum(),
        SortOrder::Unsorted => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            return gini_index(&sorted, SortOrder::Ascending);
        }
    };
    weighted / sum / (nf - 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Users,
    Items,
}

/// Concentration of ratings over the users or over the items of a matrix.
///
/// Every registered entity passing the selection takes part, including
/// those without any rating.
#[derive(Debug, Clone, Copy)]
pub struct GiniIndex<'a> {
    matrix: &'a RatingMatrix,
    axis: Axis,
}

impl<'a> GiniIndex<'a> {
    /// How unevenly ratings are spread over items (popularity bias).
    pub fn items(matrix: &'a RatingMatrix) -> Self {
        Self {
            matrix,
            axis: Axis::Items,
        }
    }

    /// How unevenly ratings are spread over users (activity bias).
    pub fn users(matrix: &'a RatingMatrix) -> Self {
        Self {
            matrix,
            axis: Axis::Users,
        }
    }
}

impl GlobalProperty for GiniIndex<'_> {
    fn name(&self) -> &str {
        match self.axis {
            Axis::Users => "user gini",
            Axis::Items => "item gini",
        }
    }

    fn compute(&self, relevant: bool, selection: &RatingSelection) -> f64 {
        let counts: Vec<f64> = match self.axis {
            Axis::Users => PopularityDistribution::users(self.matrix, relevant, selection).values(),
            Axis::Items => PopularityDistribution::items(self.matrix, relevant, selection).values(),
        };
        let gini = gini_index(&counts, SortOrder::Descending);
        tracing::debug!("{}: {} over {} entities", self.name(), gini, counts.len());
        gini
    }
}
