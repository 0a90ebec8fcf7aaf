//! Hybrid recommendation aggregator
//!
//! Runs every strategy against a [`StrategyContext`], fuses the candidate
//! lists with [`HybridRanker`] and caches the result per (user, count).

use crate::cache::{CacheStatistics, RecommendationCache};
use crate::fusion::{HybridRanker, Recommendation, StrategyOutputs};
use crate::strategy::{self, Strategy, StrategyContext};
use hybridrec_core::{EngineConfig, Error, ProductId, Result, UserId};
use parking_lot::Mutex;

/// Combines the four strategies into one ranked list
pub struct HybridAggregator {
    config: EngineConfig,
    ranker: HybridRanker,
    cache: Mutex<RecommendationCache>,
}

impl HybridAggregator {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let ttl = config
            .cache_ttl()
            .ok_or_else(|| Error::InvalidConfig(format!("cache_ttl_secs {} is out of range", config.cache_ttl_secs)))?;
        Ok(Self {
            ranker: HybridRanker::new(config.weights),
            cache: Mutex::new(RecommendationCache::new(ttl)),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ranker(&self) -> &HybridRanker {
        &self.ranker
    }

    /// Top `n` hybrid recommendations for `user`.
    ///
    /// A non-expired cached list for the same `(user, n)` is returned as is.
    pub fn recommend(&self, ctx: &StrategyContext<'_>, user: &UserId, n: usize) -> Vec<Recommendation> {
        if let Some(cached) = self.cache.lock().get(user, n, ctx.now) {
            tracing::debug!(user = %user, n, "recommendation cache hit");
            return cached;
        }
        tracing::debug!(user = %user, n, "recommendation cache miss");

        let outputs = self.collect(ctx, user);
        let recommendations = self.ranker.fuse(&outputs, n);
        self.cache
            .lock()
            .insert(user.clone(), n, recommendations.clone(), ctx.now);
        recommendations
    }

    /// Run every strategy with the configured candidate pool
    pub fn collect(&self, ctx: &StrategyContext<'_>, user: &UserId) -> StrategyOutputs {
        let pool = self.config.candidate_pool;
        let outputs = StrategyOutputs {
            collaborative: strategy::collaborative(ctx, user, pool, &self.config.collaborative),
            content_based: strategy::content_based(ctx, user, pool, &self.config.content),
            category_based: strategy::category_based(ctx, user, pool, &self.config.category),
            behavior_based: strategy::behavior_based(ctx, user, pool, &self.config.behavior),
        };
        tracing::debug!(
            user = %user,
            collaborative = outputs.collaborative.len(),
            content_based = outputs.content_based.len(),
            category_based = outputs.category_based.len(),
            behavior_based = outputs.behavior_based.len(),
            "strategy candidates collected"
        );
        outputs
    }

    /// Run a single strategy with a caller-chosen count, bypassing fusion and cache
    pub fn run_strategy(
        &self,
        ctx: &StrategyContext<'_>,
        strategy: Strategy,
        user: &UserId,
        n: usize,
    ) -> Vec<(ProductId, f32)> {
        strategy::run(strategy, ctx, user, n, &self.config)
    }

    /// Drop every cached list for `user`
    pub fn invalidate_user(&self, user: &UserId) -> usize {
        let removed = self.cache.lock().invalidate_user(user);
        if removed > 0 {
            tracing::debug!(user = %user, removed, "recommendation cache invalidated");
        }
        removed
    }

    pub fn purge_expired(&self, now: chrono::DateTime<chrono::Utc>) -> usize {
        self.cache.lock().purge_expired(now)
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.cache.lock().statistics()
    }
}
