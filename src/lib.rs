//! # hybridrec
//!
//! An in-memory hybrid product recommender.
//!
//! hybridrec keeps a weighted similarity graph over products and combines four
//! independent strategies (collaborative, content-based, category-based and
//! behavior-based) into one ranked list, caching results per user until they
//! expire or the user records a new interaction.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! hybridrec recommend --user alice_001 --count 5
//! hybridrec similar --product laptop_macbook_pro --transitive
//! hybridrec --catalog my_store.json stats
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use hybridrec::prelude::*;
//!
//! let service = RecommendationService::new(EngineConfig::default()).unwrap();
//! service.add_category("laptops", "Laptops", None).unwrap();
//! service.add_product_to_category("xps13".into(), "laptops").unwrap();
//! service.add_product_to_category("spectre".into(), "laptops").unwrap();
//! service.add_similarity("xps13".into(), "spectre".into(), 0.85).unwrap();
//! service
//!     .record_interaction("alice".into(), "xps13".into(), 5.0, ActionKind::Purchase)
//!     .unwrap();
//!
//! let recommendations = service.recommend(&"alice".into(), 5);
//! assert_eq!(recommendations[0].item, ProductId::from("spectre"));
//! ```
//!
//! ## Crate Structure
//!
//! - `hybridrec-core` - identifiers, records, the similarity graph, configuration
//! - `hybridrec-store` - interaction table, behavior log and category tree
//! - `hybridrec-engine` - strategies, fusion, caching and explanations

pub mod catalog;
pub mod service;

pub use catalog::{Catalog, CategorySpec, InteractionSpec, Placement, SimilaritySpec};
pub use service::{RecommendationService, SystemStatistics};

// Re-export core types
pub use hybridrec_core::{
    ActionKind, BehaviorRecord, EngineConfig, Error, FusionWeights, GraphStatistics, Interaction, ProductId, Result,
    SimilarityGraph, UserId,
};

// Re-export collaborators
pub use hybridrec_store::{BehaviorLog, CategoryTree, InteractionTable};

// Re-export engine
pub use hybridrec_engine::{
    HybridAggregator, Recommendation, RecommendationResponse, RecommendationStats, Strategy, StrategyContext,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ActionKind, Catalog, EngineConfig, Error, ProductId, Recommendation, RecommendationService, Result,
        SimilarityGraph, Strategy, UserId,
    };
}
