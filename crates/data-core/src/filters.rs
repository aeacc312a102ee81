//! Composable selectors over users, items and stored entries.
//!
//! A [`Filter`] is a named predicate that can be cloned cheaply and shared
//! across threads. A [`Selection`] bundles the three optional filters every
//! store and metric accepts; an absent filter accepts everything.

use crate::types::{ImpressionEntry, ItemId, RatingEntry, TimePoint, UserId};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A named predicate over `&T`.
///
/// The name only serves logging and debugging.
pub struct Filter<T> {
    name: Cow<'static, str>,
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

/// Selects users.
pub type UserFilter = Filter<UserId>;
/// Selects items.
pub type ItemFilter = Filter<ItemId>;
/// Selects (user, item, value) ratings.
pub type RatingFilter = Filter<RatingEntry>;
/// Selects (user, item) impressions.
pub type ImpressionFilter = Filter<ImpressionEntry>;
/// Selects time points.
pub type TimePointFilter = Filter<TimePoint>;

impl<T: 'static> Filter<T> {
    /// Wrap a closure into a named filter.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// The identity filter.
    pub fn accept_all() -> Self {
        Self::new("all", |_| true)
    }

    /// Keep only values accepted by both filters.
    pub fn and(self, other: Filter<T>) -> Filter<T> {
        let name = format!("({} and {})", self.name, other.name);
        let (left, right) = (self.predicate, other.predicate);
        Filter::new(name, move |value| left(value) && right(value))
    }

    /// Keep exactly the values this filter rejects.
    pub fn negate(self) -> Filter<T> {
        let name = format!("not {}", self.name);
        let inner = self.predicate;
        Filter::new(name, move |value| !inner(value))
    }
}

impl<T> Filter<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self, value: &T) -> bool {
        (self.predicate)(value)
    }
}

impl<T: Eq + Hash + Send + Sync + 'static> Filter<T> {
    /// Accept the values of a fixed set (e.g. a subset of user ids).
    pub fn any_of(values: impl IntoIterator<Item = T>) -> Self {
        let allowed: HashSet<T> = values.into_iter().collect();
        let name = format!("any of {} values", allowed.len());
        Self::new(name, move |value| allowed.contains(value))
    }
}

impl Filter<RatingEntry> {
    /// Keep ratings whose stored value is at least `min`.
    pub fn min_value(min: f64) -> Self {
        Self::new(format!("value >= {}", min), move |entry| entry.value >= min)
    }
}

impl Filter<TimePoint> {
    /// Keep time points inside `[from, to]`.
    pub fn between(from: i64, to: i64) -> Self {
        Self::new(format!("timestamp in [{}, {}]", from, to), move |point| {
            point.timestamp >= from && point.timestamp <= to
        })
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.name).finish()
    }
}

// =============================================================================
// Selection
// =============================================================================

/// The user / item / entry filters applied together.
///
/// `E` is the entry type seen by the third filter: [`RatingEntry`] for rating
/// matrices, [`ImpressionEntry`] for impressions, [`TimePoint`] for temporal
/// distributions.
pub struct Selection<E> {
    users: Option<UserFilter>,
    items: Option<ItemFilter>,
    entries: Option<Filter<E>>,
}

pub type RatingSelection = Selection<RatingEntry>;
pub type ImpressionSelection = Selection<ImpressionEntry>;
pub type TemporalSelection = Selection<TimePoint>;

impl<E> Selection<E> {
    /// Select everything.
    pub fn all() -> Self {
        Self {
            users: None,
            items: None,
            entries: None,
        }
    }

    pub fn with_users(mut self, filter: UserFilter) -> Self {
        self.users = Some(filter);
        self
    }

    pub fn with_items(mut self, filter: ItemFilter) -> Self {
        self.items = Some(filter);
        self
    }

    pub fn with_entries(mut self, filter: Filter<E>) -> Self {
        self.entries = Some(filter);
        self
    }

    pub fn user_filter(&self) -> Option<&UserFilter> {
        self.users.as_ref()
    }

    pub fn item_filter(&self) -> Option<&ItemFilter> {
        self.items.as_ref()
    }

    pub fn entry_filter(&self) -> Option<&Filter<E>> {
        self.entries.as_ref()
    }

    /// True when no filter was supplied at all.
    pub fn is_unfiltered(&self) -> bool {
        self.users.is_none() && self.items.is_none() && self.entries.is_none()
    }

    pub fn accepts_user(&self, user: UserId) -> bool {
        self.users.as_ref().is_none_or(|f| f.accepts(&user))
    }

    pub fn accepts_item(&self, item: ItemId) -> bool {
        self.items.as_ref().is_none_or(|f| f.accepts(&item))
    }

    pub fn accepts_entry(&self, entry: &E) -> bool {
        self.entries.as_ref().is_none_or(|f| f.accepts(entry))
    }
}

impl<E> Default for Selection<E> {
    fn default() -> Self {
        Self::all()
    }
}

impl<E> Clone for Selection<E> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            items: self.items.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<E> fmt::Debug for Selection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("users", &self.users.as_ref().map(|x| x.name()))
            .field("items", &self.items.as_ref().map(|x| x.name()))
            .field("entries", &self.entries.as_ref().map(|x| x.name()))
            .finish()
    }
}
