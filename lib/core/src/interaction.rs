// User-item interaction records shared by the stores and the strategies
use crate::{Error, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of user action behind an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    View,
    CartAdd,
    Purchase,
    Rating,
    WishlistAdd,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::View => "view",
            ActionKind::CartAdd => "cart_add",
            ActionKind::Purchase => "purchase",
            ActionKind::Rating => "rating",
            ActionKind::WishlistAdd => "wishlist_add",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(ActionKind::View),
            "cart_add" => Ok(ActionKind::CartAdd),
            "purchase" => Ok(ActionKind::Purchase),
            "rating" => Ok(ActionKind::Rating),
            "wishlist_add" => Ok(ActionKind::WishlistAdd),
            other => Err(Error::Serialization(format!("unknown action kind: {}", other))),
        }
    }
}

/// A rated interaction as seen from one user's key-value row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub item: ProductId,
    pub rating: f32,
    pub action: ActionKind,
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    #[inline]
    #[must_use]
    pub fn new(item: ProductId, rating: f32, action: ActionKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            item,
            rating,
            action,
            timestamp,
        }
    }
}

/// A time-indexed behavior record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    pub user: UserId,
    pub item: ProductId,
    pub action: ActionKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl BehaviorRecord {
    #[inline]
    #[must_use]
    pub fn new(user: UserId, item: ProductId, action: ActionKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            user,
            item,
            action,
            timestamp,
            rating: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }
}
