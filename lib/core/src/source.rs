// Read-side interfaces of the external collaborators the strategies consume
use crate::{ActionKind, BehaviorRecord, Interaction, ProductId, UserId};
use chrono::{DateTime, Utc};

/// Key-value interaction store keyed by (user, item)
pub trait InteractionStore {
    /// All interactions of a user, in insertion order. Unknown users yield an empty list.
    fn interactions_for_user(&self, user: &UserId) -> Vec<Interaction>;

    fn get(&self, user: &UserId, item: &ProductId) -> Option<Interaction>;

    /// Every user with at least one interaction, in first-seen order
    fn users(&self) -> Vec<UserId>;
}

/// Time-ordered interaction index
pub trait TemporalIndex {
    /// Records with `start <= timestamp <= end`, oldest first.
    ///
    /// `user` restricts to a single user; `actions` keeps only the listed kinds.
    fn interactions_in_window(
        &self,
        user: Option<&UserId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        actions: Option<&[ActionKind]>,
    ) -> Vec<BehaviorRecord>;
}

/// Hierarchical product categorization
pub trait CategoryIndex {
    /// Products placed in `category`, optionally including every descendant category.
    /// Deduplicated; unknown categories yield an empty list.
    fn products_in_category(&self, category: &str, include_descendants: bool) -> Vec<ProductId>;

    /// Categories that directly contain `item`
    fn categories_of(&self, item: &ProductId) -> Vec<String>;
}
