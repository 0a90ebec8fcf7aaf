use ahash::AHashMap;
use chrono::{DateTime, Utc};
use hybridrec_core::{ActionKind, Error, Interaction, InteractionStore, ProductId, Result, UserId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionStatistics {
    pub interactions: usize,
    pub users: usize,
    pub items: usize,
    pub avg_interactions_per_user: f64,
}

/// User-item interaction table
///
/// One record per (user, item) pair: inserting an existing pair replaces the
/// previous record in place, keeping its position in the user's row.
#[derive(Debug, Clone, Default)]
pub struct InteractionTable {
    rows: AHashMap<UserId, Vec<Interaction>>,
    user_order: Vec<UserId>,
    // item -> users who interacted with it, first-seen order
    item_index: AHashMap<ProductId, Vec<UserId>>,
    len: usize,
}

impl InteractionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for (user, item). Returns `true` when a
    /// previous record was replaced.
    pub fn insert(
        &mut self,
        user: UserId,
        item: ProductId,
        rating: f32,
        action: ActionKind,
        timestamp: DateTime<Utc>,
    ) -> Result<bool> {
        if !rating.is_finite() {
            return Err(Error::InvalidRating(rating));
        }

        let record = Interaction::new(item.clone(), rating, action, timestamp);
        if !self.rows.contains_key(&user) {
            self.user_order.push(user.clone());
        }
        let row = self.rows.entry(user.clone()).or_default();

        if let Some(existing) = row.iter_mut().find(|i| i.item == item) {
            *existing = record;
            return Ok(true);
        }

        row.push(record);
        self.item_index.entry(item).or_default().push(user);
        self.len += 1;
        Ok(false)
    }

    pub fn get(&self, user: &UserId, item: &ProductId) -> Option<&Interaction> {
        self.rows.get(user)?.iter().find(|i| &i.item == item)
    }

    pub fn interactions_for_user(&self, user: &UserId) -> &[Interaction] {
        self.rows.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every (user, record) pair for an item, in first-seen user order
    pub fn interactions_for_item(&self, item: &ProductId) -> Vec<(UserId, Interaction)> {
        let Some(users) = self.item_index.get(item) else {
            return Vec::new();
        };
        users
            .iter()
            .filter_map(|user| self.get(user, item).map(|i| (user.clone(), i.clone())))
            .collect()
    }

    pub fn remove(&mut self, user: &UserId, item: &ProductId) -> Option<Interaction> {
        let row = self.rows.get_mut(user)?;
        let pos = row.iter().position(|i| &i.item == item)?;
        let removed = row.remove(pos);

        if row.is_empty() {
            self.rows.remove(user);
            self.user_order.retain(|u| u != user);
        }
        if let Some(users) = self.item_index.get_mut(item) {
            users.retain(|u| u != user);
            if users.is_empty() {
                self.item_index.remove(item);
            }
        }
        self.len -= 1;
        Some(removed)
    }

    pub fn users(&self) -> &[UserId] {
        &self.user_order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn statistics(&self) -> InteractionStatistics {
        let users = self.user_order.len();
        InteractionStatistics {
            interactions: self.len,
            users,
            items: self.item_index.len(),
            avg_interactions_per_user: if users > 0 {
                self.len as f64 / users as f64
            } else {
                0.0
            },
        }
    }
}

impl InteractionStore for InteractionTable {
    fn interactions_for_user(&self, user: &UserId) -> Vec<Interaction> {
        InteractionTable::interactions_for_user(self, user).to_vec()
    }

    fn get(&self, user: &UserId, item: &ProductId) -> Option<Interaction> {
        InteractionTable::get(self, user, item).cloned()
    }

    fn users(&self) -> Vec<UserId> {
        self.user_order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(s: &str) -> UserId {
        UserId::from(s)
    }

    fn item(s: &str) -> ProductId {
        ProductId::from(s)
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = InteractionTable::new();
        let replaced = table
            .insert(user("u1"), item("i1"), 4.5, ActionKind::Purchase, Utc::now())
            .unwrap();
        assert!(!replaced);
        assert_eq!(table.len(), 1);

        let record = table.get(&user("u1"), &item("i1")).unwrap();
        assert_eq!(record.rating, 4.5);
        assert_eq!(record.action, ActionKind::Purchase);
        assert!(table.get(&user("u1"), &item("i2")).is_none());
        assert!(table.get(&user("nobody"), &item("i1")).is_none());
    }

    #[test]
    fn test_insert_replaces_existing_pair() {
        let mut table = InteractionTable::new();
        let now = Utc::now();
        table.insert(user("u1"), item("i1"), 2.0, ActionKind::View, now).unwrap();
        table.insert(user("u1"), item("i2"), 3.0, ActionKind::View, now).unwrap();
        let replaced = table.insert(user("u1"), item("i1"), 5.0, ActionKind::Purchase, now).unwrap();

        assert!(replaced);
        assert_eq!(table.len(), 2);
        let row = table.interactions_for_user(&user("u1"));
        assert_eq!(row[0].item, item("i1"));
        assert_eq!(row[0].rating, 5.0);
        assert_eq!(table.interactions_for_item(&item("i1")).len(), 1);
    }

    #[test]
    fn test_users_in_first_seen_order() {
        let mut table = InteractionTable::new();
        let now = Utc::now();
        for (u, i) in [("bob", "a"), ("alice", "b"), ("bob", "c"), ("carol", "a")] {
            table.insert(user(u), item(i), 3.0, ActionKind::View, now).unwrap();
        }
        assert_eq!(table.users(), &[user("bob"), user("alice"), user("carol")]);

        let for_a = table.interactions_for_item(&item("a"));
        assert_eq!(for_a.iter().map(|(u, _)| u.as_str()).collect::<Vec<_>>(), vec!["bob", "carol"]);
    }

    #[test]
    fn test_remove_cleans_indexes() {
        let mut table = InteractionTable::new();
        table.insert(user("u1"), item("i1"), 3.0, ActionKind::View, Utc::now()).unwrap();
        assert!(table.remove(&user("u1"), &item("i1")).is_some());
        assert!(table.is_empty());
        assert!(table.users().is_empty());
        assert!(table.interactions_for_item(&item("i1")).is_empty());
        assert!(table.remove(&user("u1"), &item("i1")).is_none());
    }

    #[test]
    fn test_rejects_non_finite_rating() {
        let mut table = InteractionTable::new();
        let err = table.insert(user("u1"), item("i1"), f32::NAN, ActionKind::Rating, Utc::now());
        assert!(matches!(err, Err(Error::InvalidRating(_))));
        assert!(table.is_empty());
    }

    #[test]
    fn test_statistics() {
        let mut table = InteractionTable::new();
        let now = Utc::now();
        table.insert(user("u1"), item("i1"), 3.0, ActionKind::View, now).unwrap();
        table.insert(user("u1"), item("i2"), 3.0, ActionKind::View, now).unwrap();
        table.insert(user("u2"), item("i1"), 3.0, ActionKind::View, now).unwrap();
        let stats = table.statistics();
        assert_eq!(stats.interactions, 3);
        assert_eq!(stats.users, 2);
        assert_eq!(stats.items, 2);
        assert!((stats.avg_interactions_per_user - 1.5).abs() < 1e-9);

        assert_eq!(InteractionTable::new().statistics().avg_interactions_per_user, 0.0);
    }

    #[test]
    fn test_store_trait_for_unknown_user() {
        let table = InteractionTable::new();
        let store: &dyn InteractionStore = &table;
        assert!(store.interactions_for_user(&user("ghost")).is_empty());
        assert!(store.users().is_empty());
    }
}
