//! Reductions of a stream of observed values.

use serde::{Deserialize, Serialize};

/// How a set of observations is collapsed into a single number.
///
/// Over an empty set, `Total` and `Count` are `0` and the rest are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reduction {
    Total,
    Average,
    Max,
    Min,
    Count,
}

/// Running sum / count / extrema of a set of observations.
///
/// Partial accumulators built on different threads are combined with
/// [`Accumulator::merge`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accumulator {
    sum: f64,
    count: usize,
    max: f64,
    min: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
        }
    }
}

impl Accumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.max = self.max.max(value);
        self.min = self.min.min(value);
    }

    pub fn merge(self, other: Accumulator) -> Accumulator {
        Accumulator {
            sum: self.sum + other.sum,
            count: self.count + other.count,
            max: self.max.max(other.max),
            min: self.min.min(other.min),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(&self, reduction: Reduction) -> f64 {
        match reduction {
            Reduction::Total => self.sum,
            Reduction::Count => self.count as f64,
            _ if self.count == 0 => f64::NAN,
            Reduction::Average => self.sum / self.count as f64,
            Reduction::Max => self.max,
            Reduction::Min => self.min,
        }
    }
}

impl FromIterator<f64> for Accumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Accumulator::default();
        for value in iter {
            acc.push(value);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reductions() {
        let acc: Accumulator = [2.0, 4.0, 9.0].into_iter().collect();
        assert_eq!(acc.finish(Reduction::Total), 15.0);
        assert_eq!(acc.finish(Reduction::Count), 3.0);
        assert_eq!(acc.finish(Reduction::Average), 5.0);
        assert_eq!(acc.finish(Reduction::Max), 9.0);
        assert_eq!(acc.finish(Reduction::Min), 2.0);
    }

    #[test]
    fn test_empty_reductions() {
        let acc = Accumulator::default();
        assert_eq!(acc.finish(Reduction::Total), 0.0);
        assert_eq!(acc.finish(Reduction::Count), 0.0);
        assert!(acc.finish(Reduction::Average).is_nan());
        assert!(acc.finish(Reduction::Max).is_nan());
        assert!(acc.finish(Reduction::Min).is_nan());
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let left: Accumulator = [1.0, 5.0].into_iter().collect();
        let right: Accumulator = [3.0].into_iter().collect();
        let whole: Accumulator = [1.0, 5.0, 3.0].into_iter().collect();
        assert_eq!(left.merge(right), whole);
        assert_eq!(Accumulator::default().merge(whole), whole);
    }
}
