//! Append-only log of timestamped interactions.

use crate::filters::TemporalSelection;
use crate::types::{ItemId, TimePoint, UserId};

/// Timestamped (user, item) events with lazily sorted projections.
///
/// Events are kept in insertion order until a projection is requested; the
/// log is then stable-sorted by timestamp once and stays sorted until the
/// next `add_timepoint`.
#[derive(Debug, Clone)]
pub struct TemporalDistribution {
    timepoints: Vec<TimePoint>,
    sorted: bool,
    min_timestamp: Option<i64>,
    max_timestamp: Option<i64>,
}

impl TemporalDistribution {
    pub fn new() -> Self {
        Self {
            timepoints: Vec::new(),
            // An empty log is trivially sorted
            sorted: true,
            min_timestamp: None,
            max_timestamp: None,
        }
    }

    pub fn add_timepoint(&mut self, user: UserId, item: ItemId, timestamp: i64) {
        if self.timepoints.last().is_some_and(|last| last.timestamp > timestamp) {
            self.sorted = false;
        }
        self.timepoints.push(TimePoint {
            user,
            item,
            timestamp,
        });
        self.min_timestamp = Some(self.min_timestamp.map_or(timestamp, |m| m.min(timestamp)));
        self.max_timestamp = Some(self.max_timestamp.map_or(timestamp, |m| m.max(timestamp)));
    }

    /// The (user, timestamp) column, oldest first.
    pub fn get_user_distribution(&mut self) -> Vec<(UserId, i64)> {
        self.ensure_sorted();
        self.timepoints
            .iter()
            .map(|p| (p.user, p.timestamp))
            .collect()
    }

    /// The (item, timestamp) column, oldest first.
    pub fn get_item_distribution(&mut self) -> Vec<(ItemId, i64)> {
        self.ensure_sorted();
        self.timepoints
            .iter()
            .map(|p| (p.item, p.timestamp))
            .collect()
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            // Stable: equal timestamps keep insertion order
            self.timepoints.sort_by_key(|p| p.timestamp);
            self.sorted = true;
        }
    }

    pub fn min_timestamp(&self) -> Option<i64> {
        self.min_timestamp
    }

    pub fn max_timestamp(&self) -> Option<i64> {
        self.max_timestamp
    }

    pub fn len(&self) -> usize {
        self.timepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timepoints.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Events in their current order (insertion order until a projection
    /// sorted them).
    pub fn timepoints(&self) -> &[TimePoint] {
        &self.timepoints
    }

    /// Independent copy keeping the selected events in their current order.
    pub fn filter(&self, selection: &TemporalSelection) -> TemporalDistribution {
        let mut filtered = TemporalDistribution::new();
        for point in &self.timepoints {
            if selection.accepts_user(point.user)
                && selection.accepts_item(point.item)
                && selection.accepts_entry(point)
            {
                filtered.add_timepoint(point.user, point.item, point.timestamp);
            }
        }
        filtered
    }
}

impl Default for TemporalDistribution {
    fn default() -> Self {
        Self::new()
    }
}
