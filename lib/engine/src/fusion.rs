//! Weighted fusion of strategy outputs
//!
//! Combines the candidate lists of the four strategies into one ranked list
//! with a per-strategy breakdown for each item.

use crate::strategy::Strategy;
use ahash::AHashMap;
use hybridrec_core::{FusionWeights, ProductId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fused recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item: ProductId,
    /// Sum of `weight * contribution` over the strategies that proposed the item
    pub score: f32,
    /// Raw (unweighted) contribution per proposing strategy
    pub breakdown: BTreeMap<Strategy, f32>,
}

/// Candidate lists produced by one run of every strategy
#[derive(Debug, Clone, Default)]
pub struct StrategyOutputs {
    pub collaborative: Vec<(ProductId, f32)>,
    pub content_based: Vec<(ProductId, f32)>,
    /// Category candidates carry a flat contribution of 1.0
    pub category_based: Vec<ProductId>,
    /// Behavior candidates carry a flat contribution of 1.0
    pub behavior_based: Vec<ProductId>,
}

impl StrategyOutputs {
    /// Every (strategy, item, contribution) triple in fusion order
    fn contributions(&self) -> impl Iterator<Item = (Strategy, &ProductId, f32)> {
        scored(Strategy::Collaborative, &self.collaborative)
            .chain(scored(Strategy::ContentBased, &self.content_based))
            .chain(flat(Strategy::CategoryBased, &self.category_based))
            .chain(flat(Strategy::BehaviorBased, &self.behavior_based))
    }

    pub fn candidate_count(&self) -> usize {
        self.collaborative.len() + self.content_based.len() + self.category_based.len() + self.behavior_based.len()
    }
}

fn scored(strategy: Strategy, list: &[(ProductId, f32)]) -> impl Iterator<Item = (Strategy, &ProductId, f32)> {
    list.iter().map(move |(item, value)| (strategy, item, *value))
}

fn flat(strategy: Strategy, list: &[ProductId]) -> impl Iterator<Item = (Strategy, &ProductId, f32)> {
    list.iter().map(move |item| (strategy, item, 1.0))
}

/// Weighted-sum ranker over strategy outputs
#[derive(Debug, Clone, Default)]
pub struct HybridRanker {
    weights: FusionWeights,
}

impl HybridRanker {
    pub fn new(weights: FusionWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FusionWeights {
        &self.weights
    }

    /// Fuse strategy outputs into at most `limit` recommendations.
    ///
    /// Sorted by combined score descending; ties keep the order in which
    /// items were first proposed (collaborative, content, category, behavior).
    /// A strategy proposing the same item twice keeps its first contribution.
    pub fn fuse(&self, outputs: &StrategyOutputs, limit: usize) -> Vec<Recommendation> {
        let mut results: Vec<Recommendation> = Vec::new();
        let mut slots: AHashMap<&ProductId, usize> = AHashMap::new();

        for (strategy, item, contribution) in outputs.contributions() {
            let slot = *slots.entry(item).or_insert_with(|| {
                results.push(Recommendation {
                    item: item.clone(),
                    score: 0.0,
                    breakdown: BTreeMap::new(),
                });
                results.len() - 1
            });
            let entry = &mut results[slot];
            if entry.breakdown.contains_key(&strategy) {
                continue;
            }
            entry.breakdown.insert(strategy, contribution);
            entry.score += strategy.weight(&self.weights) * contribution;
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::from(s)
    }

    #[test]
    fn test_fusion_is_additive() {
        let outputs = StrategyOutputs {
            collaborative: vec![(pid("both"), 4.0), (pid("collab_only"), 2.0)],
            content_based: vec![(pid("both"), 0.8)],
            ..Default::default()
        };
        let fused = HybridRanker::default().fuse(&outputs, 10);

        let both = fused.iter().find(|r| r.item == pid("both")).unwrap();
        assert!((both.score - (0.30 * 4.0 + 0.25 * 0.8)).abs() < 1e-5);
        assert_eq!(both.breakdown.len(), 2);
        assert_eq!(both.breakdown[&Strategy::Collaborative], 4.0);

        let only = fused.iter().find(|r| r.item == pid("collab_only")).unwrap();
        assert!((only.score - 0.6).abs() < 1e-6);
        assert!(!only.breakdown.contains_key(&Strategy::ContentBased));
    }

    #[test]
    fn test_flat_contributions_for_list_strategies() {
        let outputs = StrategyOutputs {
            category_based: vec![pid("a")],
            behavior_based: vec![pid("a"), pid("b")],
            ..Default::default()
        };
        let fused = HybridRanker::default().fuse(&outputs, 10);
        assert_eq!(fused[0].item, pid("a"));
        assert!((fused[0].score - 0.45).abs() < 1e-6);
        assert!((fused[1].score - 0.20).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_first_discovery_order() {
        let outputs = StrategyOutputs {
            category_based: vec![pid("x"), pid("y")],
            content_based: vec![(pid("z"), 1.0)],
            ..Default::default()
        };
        // all three score 0.25; content is fused before category
        let fused = HybridRanker::default().fuse(&outputs, 10);
        let order: Vec<_> = fused.iter().map(|r| r.item.clone()).collect();
        assert_eq!(order, vec![pid("z"), pid("x"), pid("y")]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let outputs = StrategyOutputs {
            behavior_based: (0..20u64).map(ProductId::from).collect(),
            ..Default::default()
        };
        assert_eq!(outputs.candidate_count(), 20);
        assert_eq!(HybridRanker::default().fuse(&outputs, 5).len(), 5);
        assert!(HybridRanker::default().fuse(&outputs, 0).is_empty());
    }

    #[test]
    fn test_duplicate_within_strategy_counts_once() {
        let outputs = StrategyOutputs {
            content_based: vec![(pid("a"), 0.9), (pid("a"), 0.5)],
            ..Default::default()
        };
        let fused = HybridRanker::default().fuse(&outputs, 10);
        assert_eq!(fused.len(), 1);
        assert!((fused[0].score - 0.225).abs() < 1e-6);
    }
}
