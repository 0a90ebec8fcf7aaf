use crate::{Error, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Weight given to each strategy when fusing candidate lists
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub collaborative: f32,
    pub content_based: f32,
    pub category_based: f32,
    pub behavior_based: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            collaborative: 0.30,
            content_based: 0.25,
            category_based: 0.25,
            behavior_based: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborativeConfig {
    /// Peers whose cosine similarity falls below this are discarded
    pub min_peer_similarity: f32,
    pub max_peers: usize,
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            min_peer_similarity: 0.1,
            max_peers: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Ratings at or above this make an item a seed
    pub min_seed_rating: f32,
    pub min_similarity: f32,
    /// Neighbors pulled per seed item
    pub max_neighbors: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_seed_rating: 4.0,
            min_similarity: 0.3,
            max_neighbors: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Ratings are divided by this before being summed into category preference
    pub rating_scale: f32,
    /// Upper bound on preferred categories visited; `None` visits all of them
    pub max_categories: Option<usize>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            rating_scale: 5.0,
            max_categories: Some(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub window_hours: i64,
    pub min_similarity: f32,
    /// Neighbors pulled per item of interest
    pub max_neighbors: usize,
}

impl BehaviorConfig {
    /// Length of the look-back window, `None` when `window_hours` does not fit a `Duration`
    pub fn window(&self) -> Option<Duration> {
        Duration::try_hours(self.window_hours)
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            window_hours: 168,
            min_similarity: 0.4,
            max_neighbors: 10,
        }
    }
}

/// Configuration for the hybrid recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: FusionWeights,
    /// Candidates requested from each strategy regardless of the caller's N
    pub candidate_pool: usize,
    pub cache_ttl_secs: u64,
    pub collaborative: CollaborativeConfig,
    pub content: ContentConfig,
    pub category: CategoryConfig,
    pub behavior: BehaviorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            candidate_pool: 15,
            cache_ttl_secs: 3600,
            collaborative: CollaborativeConfig::default(),
            content: ContentConfig::default(),
            category: CategoryConfig::default(),
            behavior: BehaviorConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Cache lifetime, `None` when `cache_ttl_secs` does not fit a `Duration`
    pub fn cache_ttl(&self) -> Option<Duration> {
        i64::try_from(self.cache_ttl_secs).ok().and_then(Duration::try_seconds)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("collaborative", self.weights.collaborative),
            ("content_based", self.weights.content_based),
            ("category_based", self.weights.category_based),
            ("behavior_based", self.weights.behavior_based),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "weight for {} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        if self.candidate_pool == 0 {
            return Err(Error::InvalidConfig("candidate_pool must be positive".to_string()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(Error::InvalidConfig("cache_ttl_secs must be positive".to_string()));
        }
        if self.cache_ttl().and_then(|ttl| Utc::now().checked_add_signed(ttl)).is_none() {
            return Err(Error::InvalidConfig(format!(
                "cache_ttl_secs {} is out of range",
                self.cache_ttl_secs
            )));
        }
        if self.category.rating_scale <= 0.0 {
            return Err(Error::InvalidConfig("category.rating_scale must be positive".to_string()));
        }
        if self.behavior.window_hours <= 0 {
            return Err(Error::InvalidConfig("behavior.window_hours must be positive".to_string()));
        }
        if self.behavior.window().and_then(|w| Utc::now().checked_sub_signed(w)).is_none() {
            return Err(Error::InvalidConfig(format!(
                "behavior.window_hours {} is out of range",
                self.behavior.window_hours
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.candidate_pool, 15);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.weights.collaborative, 0.30);
        assert_eq!(config.behavior.window_hours, 168);
        assert_eq!(config.category.max_categories, Some(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = EngineConfig::from_json(r#"{"candidate_pool": 30, "weights": {"behavior_based": 0.5}}"#)
            .unwrap();
        assert_eq!(config.candidate_pool, 30);
        assert_eq!(config.weights.behavior_based, 0.5);
        assert_eq!(config.weights.content_based, 0.25);
        assert_eq!(config.content.min_seed_rating, 4.0);
    }

    #[test]
    fn test_rejects_negative_weight() {
        let err = EngineConfig::from_json(r#"{"weights": {"collaborative": -1.0}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_overflowing_ttl() {
        let err = EngineConfig::from_json(&format!(r#"{{"cache_ttl_secs": {}}}"#, u64::MAX)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let config = EngineConfig {
            cache_ttl_secs: i64::MAX as u64,
            ..Default::default()
        };
        assert!(config.cache_ttl().is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_overflowing_window() {
        let err = EngineConfig::from_json(&format!(r#"{{"behavior": {{"window_hours": {}}}}}"#, i64::MAX)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        // representable as a Duration but reaches before the earliest timestamp
        let mut config = EngineConfig::default();
        config.behavior.window_hours = 2_500_000_000;
        assert!(config.behavior.window().is_some());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_uncapped_categories_from_json() {
        let config = EngineConfig::from_json(r#"{"category": {"max_categories": null}}"#).unwrap();
        assert_eq!(config.category.max_categories, None);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
