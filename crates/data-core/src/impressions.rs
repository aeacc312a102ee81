//! Bipartite user-item "shown" index.
//!
//! Presence only: an impression records that an item was shown to a user at
//! least once, nothing more.

use crate::error::{DataError, Result};
use crate::filters::ImpressionSelection;
use crate::types::{AddingReturn, ImpressionEntry, ItemId, UserId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct Impressions {
    /// Items shown to each registered user
    user_to_items: BTreeMap<UserId, BTreeSet<ItemId>>,
    /// Users each registered item was shown to
    item_to_users: BTreeMap<ItemId, BTreeSet<UserId>>,
    num_impressions: usize,
}

impl Impressions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user. Returns false if it was already present.
    pub fn add_user(&mut self, user: UserId) -> bool {
        if self.user_to_items.contains_key(&user) {
            return false;
        }
        self.user_to_items.insert(user, BTreeSet::new());
        true
    }

    /// Registers an item. Returns false if it was already present.
    pub fn add_item(&mut self, item: ItemId) -> bool {
        if self.item_to_users.contains_key(&item) {
            return false;
        }
        self.item_to_users.insert(item, BTreeSet::new());
        true
    }

    /// Records that `item` was shown to `user`.
    ///
    /// Returns `Unchanged` if the pair was already recorded and `Error` if
    /// either side is unregistered.
    pub fn add_impression(&mut self, user: UserId, item: ItemId) -> AddingReturn {
        self.try_add_impression(user, item)
            .unwrap_or(AddingReturn::Error)
    }

    pub fn try_add_impression(&mut self, user: UserId, item: ItemId) -> Result<AddingReturn> {
        let Some(users) = self.item_to_users.get_mut(&item) else {
            return Err(DataError::UnknownItem(item));
        };
        let Some(items) = self.user_to_items.get_mut(&user) else {
            return Err(DataError::UnknownUser(user));
        };

        if !items.insert(item) {
            return Ok(AddingReturn::Unchanged);
        }
        users.insert(user);
        self.num_impressions += 1;
        Ok(AddingReturn::Added)
    }

    pub fn contains_user(&self, user: UserId) -> bool {
        self.user_to_items.contains_key(&user)
    }

    pub fn contains_item(&self, item: ItemId) -> bool {
        self.item_to_users.contains_key(&item)
    }

    pub fn contains_impression(&self, user: UserId, item: ItemId) -> bool {
        self.user_to_items
            .get(&user)
            .is_some_and(|items| items.contains(&item))
    }

    /// Number of distinct (user, item) impressions.
    pub fn get_num_impressions(&self) -> usize {
        self.num_impressions
    }

    pub fn get_num_users(&self) -> usize {
        self.user_to_items.len()
    }

    pub fn get_num_items(&self) -> usize {
        self.item_to_users.len()
    }

    pub fn get_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.user_to_items.keys().copied()
    }

    pub fn get_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.item_to_users.keys().copied()
    }

    /// Items shown to a user. Empty for unknown users.
    pub fn get_user_impressions(&self, user: UserId) -> impl Iterator<Item = ItemId> + '_ {
        self.user_to_items
            .get(&user)
            .into_iter()
            .flat_map(|items| items.iter().copied())
    }

    /// Users an item was shown to. Empty for unknown items.
    pub fn get_item_impressions(&self, item: ItemId) -> impl Iterator<Item = UserId> + '_ {
        self.item_to_users
            .get(&item)
            .into_iter()
            .flat_map(|users| users.iter().copied())
    }

    pub fn get_num_user_impressions(&self, user: UserId) -> usize {
        self.user_to_items.get(&user).map_or(0, BTreeSet::len)
    }

    pub fn get_num_item_impressions(&self, item: ItemId) -> usize {
        self.item_to_users.get(&item).map_or(0, BTreeSet::len)
    }

    /// Builds an independent index holding only the selected users, items
    /// and impressions.
    pub fn filter(&self, selection: &ImpressionSelection) -> Impressions {
        let mut filtered = Impressions::new();

        for item in self.get_items().filter(|&item| selection.accepts_item(item)) {
            filtered.add_item(item);
        }
        for user in self.get_users().filter(|&user| selection.accepts_user(user)) {
            filtered.add_user(user);
            for item in self.get_user_impressions(user) {
                if selection.accepts_item(item)
                    && selection.accepts_entry(&ImpressionEntry { user, item })
                {
                    filtered.add_impression(user, item);
                }
            }
        }
        filtered
    }
}
