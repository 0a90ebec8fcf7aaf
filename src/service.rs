use crate::catalog::Catalog;
use chrono::{DateTime, Duration, Utc};
use hybridrec_core::{
    ActionKind, BehaviorRecord, EngineConfig, Error, GraphStatistics, ProductId, Result, SimilarityGraph, UserId,
};
use hybridrec_engine::{
    CacheStatistics, HybridAggregator, Recommendation, RecommendationResponse, Strategy, StrategyContext,
};
use hybridrec_store::{
    BehaviorLog, BehaviorStatistics, CategoryStatistics, CategoryTree, InteractionStatistics, InteractionTable,
};
use parking_lot::RwLock;
use serde::Serialize;

/// Statistics of every component of a [`RecommendationService`]
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatistics {
    pub graph: GraphStatistics,
    pub interactions: InteractionStatistics,
    pub behavior: BehaviorStatistics,
    pub categories: CategoryStatistics,
    pub cache: CacheStatistics,
}

/// Owns the similarity graph, the three collaborators and the aggregator.
///
/// Each component sits behind its own lock. Locks are always taken in the
/// order graph, interactions, behavior, categories, then the cache.
pub struct RecommendationService {
    graph: RwLock<SimilarityGraph>,
    interactions: RwLock<InteractionTable>,
    behavior: RwLock<BehaviorLog>,
    categories: RwLock<CategoryTree>,
    aggregator: HybridAggregator,
}

impl RecommendationService {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            graph: RwLock::new(SimilarityGraph::new()),
            interactions: RwLock::new(InteractionTable::new()),
            behavior: RwLock::new(BehaviorLog::new()),
            categories: RwLock::new(CategoryTree::default()),
            aggregator: HybridAggregator::new(config)?,
        })
    }

    /// A service populated from `catalog` with the default configuration
    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        let service = Self::new(EngineConfig::default())?;
        service.load_catalog(catalog)?;
        Ok(service)
    }

    pub fn config(&self) -> &EngineConfig {
        self.aggregator.config()
    }

    /// Add a similarity edge between two products, rejecting weights outside [0, 1]
    pub fn add_similarity(&self, a: ProductId, b: ProductId, weight: f32) -> Result<()> {
        self.graph.write().add_edge_checked(a, b, weight)
    }

    pub fn add_category(&self, id: &str, name: &str, parent: Option<&str>) -> Result<()> {
        self.categories.write().add_category(id, name, parent)
    }

    pub fn add_product_to_category(&self, product: ProductId, category: &str) -> Result<bool> {
        self.categories.write().add_product(product, category)
    }

    /// Record an interaction happening now
    pub fn record_interaction(&self, user: UserId, item: ProductId, rating: f32, action: ActionKind) -> Result<()> {
        self.record_interaction_at(user, item, rating, action, Utc::now())
    }

    /// Record an interaction and drop every cached list for the user.
    ///
    /// The invalidation happens before the store locks are released, so no
    /// reader can cache a list computed from the new interaction under the
    /// old entry.
    pub fn record_interaction_at(
        &self,
        user: UserId,
        item: ProductId,
        rating: f32,
        action: ActionKind,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let mut interactions = self.interactions.write();
        let mut behavior = self.behavior.write();

        interactions.insert(user.clone(), item.clone(), rating, action, timestamp)?;
        behavior.insert(BehaviorRecord::new(user.clone(), item, action, timestamp).with_rating(rating));
        self.aggregator.invalidate_user(&user);
        Ok(())
    }

    /// Apply a catalog. Interaction ages are measured from now.
    pub fn load_catalog(&self, catalog: &Catalog) -> Result<()> {
        let now = Utc::now();
        for category in &catalog.categories {
            self.add_category(&category.id, &category.name, category.parent.as_deref())?;
        }
        for placement in &catalog.placements {
            for product in &placement.products {
                self.add_product_to_category(product.clone(), &placement.category)?;
            }
        }
        for edge in &catalog.similarities {
            self.add_similarity(edge.from.clone(), edge.to.clone(), edge.weight)?;
        }
        for interaction in &catalog.interactions {
            let hours_ago = interaction.hours_ago.unwrap_or(0);
            let timestamp = Duration::try_hours(hours_ago)
                .and_then(|age| now.checked_sub_signed(age))
                .ok_or_else(|| {
                    Error::InvalidCatalog(format!(
                        "hours_ago {} for {} on {} is out of range",
                        hours_ago, interaction.user, interaction.item
                    ))
                })?;
            self.record_interaction_at(
                interaction.user.clone(),
                interaction.item.clone(),
                interaction.rating,
                interaction.action,
                timestamp,
            )?;
        }
        tracing::info!(
            categories = catalog.categories.len(),
            products = catalog.product_count(),
            similarities = catalog.similarities.len(),
            interactions = catalog.interactions.len(),
            "catalog loaded"
        );
        Ok(())
    }

    fn with_context<R>(&self, now: DateTime<Utc>, f: impl FnOnce(&StrategyContext<'_>) -> R) -> R {
        let graph = self.graph.read();
        let interactions = self.interactions.read();
        let behavior = self.behavior.read();
        let categories = self.categories.read();
        let ctx = StrategyContext {
            graph: &*graph,
            interactions: &*interactions,
            timeline: &*behavior,
            categories: &*categories,
            now,
        };
        f(&ctx)
    }

    pub fn recommend(&self, user: &UserId, n: usize) -> Vec<Recommendation> {
        self.recommend_at(user, n, Utc::now())
    }

    pub fn recommend_at(&self, user: &UserId, n: usize, now: DateTime<Utc>) -> Vec<Recommendation> {
        self.with_context(now, |ctx| self.aggregator.recommend(ctx, user, n))
    }

    /// Hybrid recommendations with per-strategy explanations
    pub fn explain(&self, user: &UserId, n: usize) -> RecommendationResponse {
        let recommendations = self.recommend(user, n);
        RecommendationResponse::new(user.clone(), &recommendations, &self.config().weights)
    }

    /// Run one strategy on its own. Not cached.
    pub fn run_strategy(&self, strategy: Strategy, user: &UserId, n: usize) -> Vec<(ProductId, f32)> {
        self.run_strategy_at(strategy, user, n, Utc::now())
    }

    pub fn run_strategy_at(
        &self,
        strategy: Strategy,
        user: &UserId,
        n: usize,
        now: DateTime<Utc>,
    ) -> Vec<(ProductId, f32)> {
        self.with_context(now, |ctx| self.aggregator.run_strategy(ctx, strategy, user, n))
    }

    pub fn similar_products(&self, product: &ProductId, min_weight: f32, limit: Option<usize>) -> Vec<(ProductId, f32)> {
        self.graph.read().neighbors(product, min_weight, limit)
    }

    /// Direct and two-hop estimates for `product`, keeping those scoring at least `min_weight`
    pub fn transitive_similar(&self, product: &ProductId, min_weight: f32, k: usize) -> Vec<(ProductId, f32)> {
        let mut similar = self.graph.read().k_hop_similarity(product, usize::MAX, true);
        similar.retain(|(_, score)| *score >= min_weight);
        similar.truncate(k);
        similar
    }

    pub fn shortest_chain(&self, from: &ProductId, to: &ProductId, max_hops: usize) -> Vec<ProductId> {
        self.graph.read().shortest_chain(from, to, max_hops)
    }

    pub fn clusters(&self, min_weight: f32) -> Vec<Vec<ProductId>> {
        self.graph.read().clusters(min_weight)
    }

    pub fn has_product(&self, product: &ProductId) -> bool {
        self.graph.read().contains(product) || !self.categories.read().categories_of(product).is_empty()
    }

    pub fn invalidate_user(&self, user: &UserId) -> usize {
        self.aggregator.invalidate_user(user)
    }

    pub fn purge_expired_cache(&self) -> usize {
        self.aggregator.purge_expired(Utc::now())
    }

    pub fn statistics(&self) -> SystemStatistics {
        SystemStatistics {
            graph: self.graph.read().statistics(),
            interactions: self.interactions.read().statistics(),
            behavior: self.behavior.read().statistics(),
            categories: self.categories.read().statistics(),
            cache: self.aggregator.statistics(),
        }
    }
}
