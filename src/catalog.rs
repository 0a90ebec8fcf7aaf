//! JSON catalog documents
//!
//! A catalog describes a whole recommendation world: the category hierarchy,
//! product placements, similarity edges and user interactions. It is applied
//! to a service with [`RecommendationService::load_catalog`](crate::RecommendationService::load_catalog).

use hybridrec_core::{ActionKind, ProductId, Result, UserId};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub id: String,
    pub name: String,
    /// Parent category id; the root when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub category: String,
    pub products: Vec<ProductId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilaritySpec {
    pub from: ProductId,
    pub to: ProductId,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSpec {
    pub user: UserId,
    pub item: ProductId,
    pub rating: f32,
    pub action: ActionKind,
    /// Age of the interaction relative to load time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_ago: Option<i64>,
}

/// A complete catalog document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub categories: Vec<CategorySpec>,
    pub placements: Vec<Placement>,
    pub similarities: Vec<SimilaritySpec>,
    pub interactions: Vec<InteractionSpec>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The bundled electronics store catalog
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_CATALOG)
    }

    pub fn product_count(&self) -> usize {
        self.placements.iter().map(|p| p.products.len()).sum()
    }
}
