//! Explainability for hybrid recommendations
//!
//! Output structures showing how much each strategy contributed to a
//! recommendation's combined score.

use crate::fusion::Recommendation;
use crate::strategy::Strategy;
use hybridrec_core::{FusionWeights, ProductId, UserId};
use serde::Serialize;
use std::collections::BTreeMap;

/// A recommendation with its weighted per-strategy contributions
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedRecommendation {
    pub id: ProductId,
    pub score: f32,
    /// Weighted contribution per proposing strategy; these sum to `score`
    pub explain: BTreeMap<Strategy, f32>,
}

impl ExplainedRecommendation {
    pub fn from_recommendation(recommendation: &Recommendation, weights: &FusionWeights) -> Self {
        Self {
            id: recommendation.item.clone(),
            score: recommendation.score,
            explain: recommendation
                .breakdown
                .iter()
                .map(|(strategy, raw)| (*strategy, strategy.weight(weights) * raw))
                .collect(),
        }
    }

    fn top_strategy(&self) -> Option<Strategy> {
        self.explain
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(strategy, _)| *strategy)
    }
}

/// Summary of one recommendation response
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationStats {
    pub returned: usize,
    pub avg_score: f32,
    pub best_score: f32,
    /// Strategy contributing most to the best recommendation
    pub top_contributing_strategy: Option<Strategy>,
}

impl RecommendationStats {
    /// Results are expected best first
    pub fn compute(results: &[ExplainedRecommendation]) -> Self {
        let Some(best) = results.first() else {
            return Self {
                returned: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_strategy: None,
            };
        };

        let avg_score = results.iter().map(|r| r.score).sum::<f32>() / results.len() as f32;
        Self {
            returned: results.len(),
            avg_score,
            best_score: best.score,
            top_contributing_strategy: best.top_strategy(),
        }
    }
}

/// Response for a hybrid recommendation request
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub user: UserId,
    pub result: Vec<ExplainedRecommendation>,
    pub stats: RecommendationStats,
}

impl RecommendationResponse {
    pub fn new(user: UserId, recommendations: &[Recommendation], weights: &FusionWeights) -> Self {
        let result: Vec<ExplainedRecommendation> = recommendations
            .iter()
            .map(|r| ExplainedRecommendation::from_recommendation(r, weights))
            .collect();
        let stats = RecommendationStats::compute(&result);
        Self { user, result, stats }
    }
}
