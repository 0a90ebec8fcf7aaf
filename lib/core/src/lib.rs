//! # hybridrec Core
//!
//! Core library for the hybridrec recommendation engine.
//!
//! This crate provides the fundamental data structures shared by every other crate:
//!
//! - [`SimilarityGraph`] - Undirected weighted product similarity graph
//! - [`ProductId`] / [`UserId`] - Opaque identifiers
//! - [`Interaction`] / [`BehaviorRecord`] - User interaction records
//! - [`InteractionStore`], [`TemporalIndex`], [`CategoryIndex`] - Collaborator interfaces
//!   consumed by the recommendation strategies
//! - [`EngineConfig`] - Tunable strategy and fusion parameters
//!
//! ## Example
//!
//! ```rust
//! use hybridrec_core::{ProductId, SimilarityGraph};
//!
//! let mut graph = SimilarityGraph::new();
//! graph.add_edge(ProductId::from("laptop_a"), ProductId::from("laptop_b"), 0.9);
//! graph.add_edge(ProductId::from("laptop_b"), ProductId::from("mouse"), 0.5);
//!
//! let similar = graph.neighbors(&ProductId::from("laptop_b"), 0.4, Some(10));
//! assert_eq!(similar.len(), 2);
//!
//! let chain = graph.shortest_chain(&ProductId::from("laptop_a"), &ProductId::from("mouse"), 3);
//! assert_eq!(chain.len(), 3);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod id;
pub mod interaction;
pub mod source;

pub use config::{BehaviorConfig, CategoryConfig, CollaborativeConfig, ContentConfig, EngineConfig, FusionWeights};
pub use error::{Error, Result};
pub use graph::{GraphStatistics, SimilarityGraph, TRANSITIVE_DAMPING};
pub use id::{ProductId, UserId};
pub use interaction::{ActionKind, BehaviorRecord, Interaction};
pub use source::{CategoryIndex, InteractionStore, TemporalIndex};
