//! # hybridrec engine
//!
//! Hybrid product recommendation on top of the hybridrec similarity graph.
//!
//! Four independent strategies propose candidates, a weighted fusion step
//! merges them into one ranked list, and a per-user cache keeps the result
//! until it expires or the user records a new interaction.
//!
//! ## Strategies
//!
//! - **Collaborative**: items rated by users with similar rating vectors
//! - **Content-based**: graph neighbors of the user's highly rated items
//! - **Category-based**: unseen products from the user's preferred categories
//! - **Behavior-based**: alternatives to items recently viewed but not bought
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Strategies  │────>│ HybridRanker │────>│    Cache     │
//! │ (candidates) │     │   (fusion)   │     │ (user, n)    │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │                                         │
//!        │              ┌──────────────┐           │
//!        └─────────────>│  Aggregator  │<──────────┘
//!                       └──────────────┘
//!                              │
//!                       ┌──────────────┐
//!                       │   Explain    │
//!                       └──────────────┘
//! ```

pub mod aggregator;
pub mod cache;
pub mod explain;
pub mod fusion;
pub mod strategy;

pub use aggregator::HybridAggregator;
pub use cache::{CacheStatistics, RecommendationCache};
pub use explain::{ExplainedRecommendation, RecommendationResponse, RecommendationStats};
pub use fusion::{HybridRanker, Recommendation, StrategyOutputs};
pub use strategy::{cosine_similarity, similar_users, Strategy, StrategyContext};
