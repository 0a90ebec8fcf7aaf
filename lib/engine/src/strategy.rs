//! Independent recommendation strategies
//!
//! Each scorer is a pure function of the user, the similarity graph and the
//! read-only collaborators bundled in a [`StrategyContext`]. Scorers share no
//! state and never fail: unknown users or products simply produce no
//! candidates.

use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use hybridrec_core::{
    ActionKind, BehaviorConfig, CategoryConfig, CategoryIndex, CollaborativeConfig, ContentConfig, Error,
    FusionWeights, InteractionStore, ProductId, SimilarityGraph, TemporalIndex, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One recommendation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Collaborative,
    ContentBased,
    CategoryBased,
    BehaviorBased,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Collaborative,
        Strategy::ContentBased,
        Strategy::CategoryBased,
        Strategy::BehaviorBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Collaborative => "collaborative",
            Strategy::ContentBased => "content_based",
            Strategy::CategoryBased => "category_based",
            Strategy::BehaviorBased => "behavior_based",
        }
    }

    /// Fusion weight of this strategy
    pub fn weight(&self, weights: &FusionWeights) -> f32 {
        match self {
            Strategy::Collaborative => weights.collaborative,
            Strategy::ContentBased => weights.content_based,
            Strategy::CategoryBased => weights.category_based,
            Strategy::BehaviorBased => weights.behavior_based,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown strategy: {}", s)))
    }
}

/// Everything a strategy may read
#[derive(Clone, Copy)]
pub struct StrategyContext<'a> {
    pub graph: &'a SimilarityGraph,
    pub interactions: &'a dyn InteractionStore,
    pub timeline: &'a dyn TemporalIndex,
    pub categories: &'a dyn CategoryIndex,
    /// Reference time for behavior windows and cache expiry
    pub now: DateTime<Utc>,
}

/// Scores accumulated in first-discovery order
#[derive(Default)]
struct ScoreBoard {
    scores: Vec<(ProductId, f32)>,
    slots: AHashMap<ProductId, usize>,
}

impl ScoreBoard {
    fn update(&mut self, item: &ProductId, value: f32, merge: impl Fn(f32, f32) -> f32) {
        match self.slots.get(item) {
            Some(&slot) => {
                let current = &mut self.scores[slot].1;
                *current = merge(*current, value);
            }
            None => {
                self.slots.insert(item.clone(), self.scores.len());
                self.scores.push((item.clone(), value));
            }
        }
    }

    /// Highest first; ties keep discovery order
    fn into_top(mut self, n: usize) -> Vec<(ProductId, f32)> {
        self.scores
            .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        self.scores.truncate(n);
        self.scores
    }
}

/// Cosine similarity of two rating vectors over their commonly rated items.
///
/// Returns 0.0 when nothing is shared or a norm is zero.
pub fn cosine_similarity(a: &AHashMap<ProductId, f32>, b: &AHashMap<ProductId, f32>) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (item, ra) in a {
        if let Some(rb) = b.get(item) {
            dot += ra * rb;
            norm_a += ra * ra;
            norm_b += rb * rb;
        }
    }
    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

fn rating_vector(store: &dyn InteractionStore, user: &UserId) -> AHashMap<ProductId, f32> {
    store
        .interactions_for_user(user)
        .into_iter()
        .map(|i| (i.item, i.rating))
        .collect()
}

/// Peers with similarity above `config.min_peer_similarity`, most similar first
pub fn similar_users(
    store: &dyn InteractionStore,
    user: &UserId,
    config: &CollaborativeConfig,
) -> Vec<(UserId, f32)> {
    let target = rating_vector(store, user);
    if target.is_empty() {
        return Vec::new();
    }

    let mut peers: Vec<(UserId, f32)> = store
        .users()
        .into_iter()
        .filter(|peer| peer != user)
        .filter_map(|peer| {
            let similarity = cosine_similarity(&target, &rating_vector(store, &peer));
            (similarity > config.min_peer_similarity).then_some((peer, similarity))
        })
        .collect();
    peers.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    peers
}

/// Collaborative filtering: items rated by similar users, scored by
/// `sum(peer_rating * peer_similarity)` over the top peers
pub fn collaborative(
    ctx: &StrategyContext<'_>,
    user: &UserId,
    n: usize,
    config: &CollaborativeConfig,
) -> Vec<(ProductId, f32)> {
    let own = ctx.interactions.interactions_for_user(user);
    if own.is_empty() || n == 0 {
        return Vec::new();
    }
    let rated: AHashSet<&ProductId> = own.iter().map(|i| &i.item).collect();

    let mut board = ScoreBoard::default();
    for (peer, similarity) in similar_users(ctx.interactions, user, config)
        .into_iter()
        .take(config.max_peers)
    {
        for interaction in ctx.interactions.interactions_for_user(&peer) {
            if !rated.contains(&interaction.item) {
                board.update(&interaction.item, interaction.rating * similarity, |a, b| a + b);
            }
        }
    }
    board.into_top(n)
}

/// Content-based filtering: graph neighbors of highly rated items, scored by
/// the best similarity to any seed
pub fn content_based(
    ctx: &StrategyContext<'_>,
    user: &UserId,
    n: usize,
    config: &ContentConfig,
) -> Vec<(ProductId, f32)> {
    let own = ctx.interactions.interactions_for_user(user);
    if own.is_empty() || n == 0 {
        return Vec::new();
    }

    let mut board = ScoreBoard::default();
    for seed in own.iter().filter(|i| i.rating >= config.min_seed_rating) {
        for (candidate, similarity) in
            ctx.graph
                .neighbors(&seed.item, config.min_similarity, Some(config.max_neighbors))
        {
            if ctx.interactions.get(user, &candidate).is_none() {
                board.update(&candidate, similarity, f32::max);
            }
        }
    }
    board.into_top(n)
}

/// Category-based recommendations: unseen products from the user's preferred
/// categories, most preferred category first.
///
/// Preference per category is `sum(rating / rating_scale)` over the user's
/// interactions placed in it. Categories are consumed whole until at least `n`
/// products are gathered, then the list is cut to `n`.
pub fn category_based(
    ctx: &StrategyContext<'_>,
    user: &UserId,
    n: usize,
    config: &CategoryConfig,
) -> Vec<ProductId> {
    let own = ctx.interactions.interactions_for_user(user);
    if own.is_empty() || n == 0 {
        return Vec::new();
    }

    let mut preferences: Vec<(String, f32)> = Vec::new();
    let mut slots: AHashMap<String, usize> = AHashMap::new();
    for interaction in &own {
        let weight = interaction.rating / config.rating_scale;
        for category in ctx.categories.categories_of(&interaction.item) {
            match slots.get(&category) {
                Some(&slot) => preferences[slot].1 += weight,
                None => {
                    slots.insert(category.clone(), preferences.len());
                    preferences.push((category, weight));
                }
            }
        }
    }
    preferences.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    if let Some(limit) = config.max_categories {
        preferences.truncate(limit);
    }

    let interacted: AHashSet<&ProductId> = own.iter().map(|i| &i.item).collect();
    let mut emitted: AHashSet<ProductId> = AHashSet::new();
    let mut recommendations = Vec::new();
    for (category, _) in &preferences {
        for product in ctx.categories.products_in_category(category, true) {
            if !interacted.contains(&product) && emitted.insert(product.clone()) {
                recommendations.push(product);
            }
        }
        if recommendations.len() >= n {
            break;
        }
    }

    recommendations.truncate(n);
    recommendations
}

/// Behavior-based recommendations: neighbors of items the user recently
/// viewed or carted but did not buy.
///
/// Items of interest are walked in the order they first appear in the
/// window, oldest first; the scan stops as soon as `n` candidates exist, so
/// that order decides which candidates are returned.
pub fn behavior_based(
    ctx: &StrategyContext<'_>,
    user: &UserId,
    n: usize,
    config: &BehaviorConfig,
) -> Vec<ProductId> {
    if n == 0 {
        return Vec::new();
    }
    let start = config
        .window()
        .and_then(|window| ctx.now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let recent = ctx.timeline.interactions_in_window(Some(user), start, ctx.now, None);
    if recent.is_empty() {
        return Vec::new();
    }

    let mut viewed: AHashSet<&ProductId> = AHashSet::new();
    let mut purchased: AHashSet<&ProductId> = AHashSet::new();
    let mut touched: Vec<&ProductId> = Vec::new();
    for record in &recent {
        match record.action {
            ActionKind::View => {
                viewed.insert(&record.item);
                touched.push(&record.item);
            }
            ActionKind::CartAdd => touched.push(&record.item),
            ActionKind::Purchase => {
                purchased.insert(&record.item);
            }
            ActionKind::Rating | ActionKind::WishlistAdd => {}
        }
    }

    let mut seen_interest: AHashSet<&ProductId> = AHashSet::new();
    let interested = touched
        .into_iter()
        .filter(|item| !purchased.contains(*item) && seen_interest.insert(*item));

    let mut emitted: AHashSet<ProductId> = AHashSet::new();
    let mut recommendations = Vec::new();
    'interest: for item in interested {
        for (candidate, _) in ctx
            .graph
            .neighbors(item, config.min_similarity, Some(config.max_neighbors))
        {
            if viewed.contains(&candidate) || !emitted.insert(candidate.clone()) {
                continue;
            }
            recommendations.push(candidate);
            if recommendations.len() >= n {
                break 'interest;
            }
        }
    }
    recommendations
}

/// Run a single strategy. List-only strategies report a flat 1.0 per item.
pub fn run(
    strategy: Strategy,
    ctx: &StrategyContext<'_>,
    user: &UserId,
    n: usize,
    config: &hybridrec_core::EngineConfig,
) -> Vec<(ProductId, f32)> {
    match strategy {
        Strategy::Collaborative => collaborative(ctx, user, n, &config.collaborative),
        Strategy::ContentBased => content_based(ctx, user, n, &config.content),
        Strategy::CategoryBased => category_based(ctx, user, n, &config.category)
            .into_iter()
            .map(|item| (item, 1.0))
            .collect(),
        Strategy::BehaviorBased => behavior_based(ctx, user, n, &config.behavior)
            .into_iter()
            .map(|item| (item, 1.0))
            .collect(),
    }
}
