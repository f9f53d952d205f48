use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::PropertyStore;
use crate::models::Property;

/// Liked property ids per user email, in like order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FavoritesIndex {
    by_user: BTreeMap<String, Vec<String>>,
}

/// Membership after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub liked: bool,
}

impl FavoritesIndex {
    pub fn toggle(&mut self, user_email: &str, property_id: &str) -> Toggle {
        let liked = self.by_user.entry(user_email.to_string()).or_default();

        if let Some(pos) = liked.iter().position(|id| id == property_id) {
            liked.remove(pos);
            Toggle { liked: false }
        } else {
            liked.push(property_id.to_string());
            Toggle { liked: true }
        }
    }

    pub fn list_for(&self, user_email: &str) -> &[String] {
        self.by_user
            .get(user_email)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_liked(&self, user_email: &str, property_id: &str) -> bool {
        self.list_for(user_email).iter().any(|id| id == property_id)
    }

    /// Resolve a user's likes against the store. Ids of deleted listings are skipped.
    pub fn liked_properties<'a>(
        &self,
        user_email: &str,
        store: &'a PropertyStore,
    ) -> Vec<&'a Property> {
        self.list_for(user_email)
            .iter()
            .filter_map(|id| store.get(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_properties;

    #[test]
    fn toggle_twice_restores_previous_list() {
        let mut favorites = FavoritesIndex::default();
        favorites.toggle("t@x.com", "1");
        let before = favorites.list_for("t@x.com").to_vec();

        assert_eq!(favorites.toggle("t@x.com", "2"), Toggle { liked: true });
        assert_eq!(favorites.toggle("t@x.com", "2"), Toggle { liked: false });
        assert_eq!(favorites.list_for("t@x.com"), before.as_slice());
    }

    #[test]
    fn likes_keep_insertion_order_without_duplicates() {
        let mut favorites = FavoritesIndex::default();
        for id in ["3", "1", "4"] {
            favorites.toggle("t@x.com", id);
        }
        favorites.toggle("t@x.com", "1");
        favorites.toggle("t@x.com", "1");

        assert_eq!(favorites.list_for("t@x.com"), ["3", "4", "1"]);
    }

    #[test]
    fn unknown_user_has_no_likes() {
        let favorites = FavoritesIndex::default();
        assert!(favorites.list_for("new@x.com").is_empty());
        assert!(!favorites.is_liked("new@x.com", "1"));
    }

    #[test]
    fn stale_ids_survive_but_do_not_resolve() {
        let mut store = PropertyStore::from(seed_properties());
        let mut favorites = FavoritesIndex::default();
        favorites.toggle("t@x.com", "2");
        favorites.toggle("t@x.com", "1");

        store.remove("2");

        assert_eq!(favorites.list_for("t@x.com"), ["2", "1"]);
        let resolved: Vec<_> = favorites
            .liked_properties("t@x.com", &store)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(resolved, ["1"]);
    }
}
