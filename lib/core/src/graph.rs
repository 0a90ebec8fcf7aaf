// Undirected, weighted product similarity graph
use crate::{Error, ProductId, Result};
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::VecDeque;

/// Damping applied to two-hop similarity estimates
pub const TRANSITIVE_DAMPING: f32 = 0.7;

/// Summary of graph shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub products: usize,
    pub edges: usize,
    pub density: f64,
    pub average_degree: f64,
    pub max_degree: usize,
    /// Adjacency entries per product, in product insertion order
    pub degree_distribution: Vec<usize>,
}

/// Product similarity graph backed by adjacency lists
///
/// Products live in an arena; each adjacency entry is `(neighbor index, weight)`.
/// Re-adding an existing pair appends a parallel edge instead of replacing the
/// old weight, and the edge counter counts each `add_edge` call once even though
/// two adjacency entries are written. Degree sums are therefore `2 * edges`.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    index: AHashMap<ProductId, usize>,
    products: Vec<ProductId>,
    adjacency: Vec<Vec<(usize, f32)>>,
    edge_count: usize,
}

impl SimilarityGraph {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product. Re-adding a known product is a no-op.
    pub fn add_product(&mut self, id: ProductId) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.products.len();
        self.index.insert(id.clone(), idx);
        self.products.push(id);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Add an undirected similarity edge, registering both endpoints if needed.
    ///
    /// Weights are conventionally in `[0, 1]` but are not validated here; see
    /// [`SimilarityGraph::add_edge_checked`].
    pub fn add_edge(&mut self, a: ProductId, b: ProductId, weight: f32) {
        if !(0.0..=1.0).contains(&weight) {
            tracing::warn!(%a, %b, weight, "similarity weight outside [0, 1]");
        }
        let a_idx = self.add_product(a);
        let b_idx = self.add_product(b);
        self.adjacency[a_idx].push((b_idx, weight));
        self.adjacency[b_idx].push((a_idx, weight));
        self.edge_count += 1;
    }

    /// Like [`SimilarityGraph::add_edge`] but rejects NaN and weights outside `[0, 1]`.
    pub fn add_edge_checked(&mut self, a: ProductId, b: ProductId, weight: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(Error::InvalidWeight {
                from: a.to_string(),
                to: b.to_string(),
                weight,
            });
        }
        self.add_edge(a, b, weight);
        Ok(())
    }

    #[inline]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.index.contains_key(id)
    }

    #[inline]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in insertion order
    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    /// Number of adjacency entries for a product (parallel edges count separately)
    pub fn degree(&self, id: &ProductId) -> usize {
        self.index
            .get(id)
            .map(|&idx| self.adjacency[idx].len())
            .unwrap_or(0)
    }

    /// Neighbors with `weight >= min_weight`, heaviest first.
    ///
    /// Equal weights keep adjacency insertion order. Parallel edges show up as
    /// separate entries. Unknown products have no neighbors.
    pub fn neighbors(
        &self,
        id: &ProductId,
        min_weight: f32,
        max_results: Option<usize>,
    ) -> Vec<(ProductId, f32)> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };

        let mut result: Vec<(ProductId, f32)> = self.adjacency[idx]
            .iter()
            .filter(|(_, weight)| *weight >= min_weight)
            .map(|&(n, weight)| (self.products[n].clone(), weight))
            .collect();

        result.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(limit) = max_results {
            result.truncate(limit);
        }
        result
    }

    /// Fewest-hops chain from `start` to `target` using at most `max_hops` edges.
    ///
    /// Every edge costs one hop regardless of weight, so the chain is the
    /// shortest one, not the most similar one. Returns an empty chain when
    /// either endpoint is unknown or no chain fits within `max_hops`.
    pub fn shortest_chain(&self, start: &ProductId, target: &ProductId, max_hops: usize) -> Vec<ProductId> {
        let (Some(&s), Some(&t)) = (self.index.get(start), self.index.get(target)) else {
            return Vec::new();
        };
        if s == t {
            return vec![start.clone()];
        }

        let mut visited = vec![false; self.products.len()];
        let mut parent: Vec<Option<usize>> = vec![None; self.products.len()];
        let mut queue = VecDeque::new();

        visited[s] = true;
        // (node, nodes on the chain so far)
        queue.push_back((s, 1usize));

        while let Some((current, chain_len)) = queue.pop_front() {
            if chain_len > max_hops {
                continue;
            }
            for &(n, _) in &self.adjacency[current] {
                if n == t {
                    parent[t] = Some(current);
                    return self.unwind_chain(&parent, t);
                }
                if !visited[n] {
                    visited[n] = true;
                    parent[n] = Some(current);
                    queue.push_back((n, chain_len + 1));
                }
            }
        }

        Vec::new()
    }

    fn unwind_chain(&self, parent: &[Option<usize>], target: usize) -> Vec<ProductId> {
        let mut chain = vec![self.products[target].clone()];
        let mut cursor = parent[target];
        while let Some(idx) = cursor {
            chain.push(self.products[idx].clone());
            cursor = parent[idx];
        }
        chain.reverse();
        chain
    }

    /// Direct and (optionally) two-hop similarity scores, best `k` first.
    ///
    /// Direct neighbors score their edge weight; for parallel edges the last
    /// inserted weight is the one kept. A two-hop product reached through
    /// neighbor `n` scores `sqrt(s1 * s2) * TRANSITIVE_DAMPING`. The first
    /// estimate computed for a two-hop product wins, walking direct neighbors
    /// in adjacency order. Equal scores keep discovery order.
    pub fn k_hop_similarity(&self, id: &ProductId, k: usize, include_transitive: bool) -> Vec<(ProductId, f32)> {
        let Some(&origin) = self.index.get(id) else {
            return Vec::new();
        };

        let mut scores: Vec<(usize, f32)> = Vec::new();
        let mut slots: AHashMap<usize, usize> = AHashMap::new();

        for &(n, weight) in &self.adjacency[origin] {
            match slots.get(&n) {
                Some(&slot) => scores[slot].1 = weight,
                None => {
                    slots.insert(n, scores.len());
                    scores.push((n, weight));
                }
            }
        }

        if include_transitive {
            for &(n, s1) in &self.adjacency[origin] {
                for &(second, s2) in &self.adjacency[n] {
                    if second == origin || slots.contains_key(&second) {
                        continue;
                    }
                    let estimate = (s1 * s2).sqrt() * TRANSITIVE_DAMPING;
                    slots.insert(second, scores.len());
                    scores.push((second, estimate));
                }
            }
        }

        scores.sort_by_key(|&(_, score)| Reverse(OrderedFloat(score)));
        scores.truncate(k);
        scores
            .into_iter()
            .map(|(idx, score)| (self.products[idx].clone(), score))
            .collect()
    }

    /// Connected components over edges with `weight >= min_weight`.
    ///
    /// Components are discovered depth-first from each unvisited product in
    /// insertion order; members are listed in discovery order. Singletons are
    /// dropped.
    pub fn clusters(&self, min_weight: f32) -> Vec<Vec<ProductId>> {
        let mut visited = vec![false; self.products.len()];
        let mut clusters = Vec::new();
        // (node, next adjacency position)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.products.len() {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            let mut members = vec![root];
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (node, pos) = *frame;
                let Some(&(n, weight)) = self.adjacency[node].get(pos) else {
                    stack.pop();
                    continue;
                };
                frame.1 += 1;
                if weight >= min_weight && !visited[n] {
                    visited[n] = true;
                    members.push(n);
                    stack.push((n, 0));
                }
            }

            if members.len() > 1 {
                clusters.push(members.into_iter().map(|idx| self.products[idx].clone()).collect());
            }
        }

        clusters
    }

    pub fn statistics(&self) -> GraphStatistics {
        let products = self.products.len();
        let degree_distribution: Vec<usize> = self.adjacency.iter().map(Vec::len).collect();

        let density = if products >= 2 {
            let max_edges = (products * (products - 1) / 2) as f64;
            self.edge_count as f64 / max_edges
        } else {
            0.0
        };
        let average_degree = if products > 0 {
            degree_distribution.iter().sum::<usize>() as f64 / products as f64
        } else {
            0.0
        };
        let max_degree = degree_distribution.iter().copied().max().unwrap_or(0);

        GraphStatistics {
            products,
            edges: self.edge_count,
            density,
            average_degree,
            max_degree,
            degree_distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::from(s)
    }

    fn graph_from(edges: &[(&str, &str, f32)]) -> SimilarityGraph {
        let mut graph = SimilarityGraph::new();
        for &(a, b, w) in edges {
            graph.add_edge(pid(a), pid(b), w);
        }
        graph
    }

    fn ids(items: &[(ProductId, f32)]) -> Vec<String> {
        items.iter().map(|(id, _)| id.to_string()).collect()
    }

    #[test]
    fn test_add_product_is_idempotent() {
        let mut graph = SimilarityGraph::new();
        let first = graph.add_product(pid("a"));
        let second = graph.add_product(pid("a"));
        assert_eq!(first, second);
        assert_eq!(graph.product_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbors(&pid("a"), 0.0, None).is_empty());
    }

    #[test]
    fn test_edges_are_symmetric() {
        let graph = graph_from(&[("a", "b", 0.8), ("a", "c", 0.3)]);
        assert!(graph.neighbors(&pid("a"), 0.0, None).contains(&(pid("b"), 0.8)));
        assert!(graph.neighbors(&pid("b"), 0.0, None).contains(&(pid("a"), 0.8)));
        assert!(graph.neighbors(&pid("c"), 0.0, None).contains(&(pid("a"), 0.3)));
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let graph = graph_from(&[("a", "b", 0.5), ("a", "b", 0.9)]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(
            graph.neighbors(&pid("a"), 0.0, None),
            vec![(pid("b"), 0.9), (pid("b"), 0.5)]
        );
        assert_eq!(graph.degree(&pid("b")), 2);
    }

    #[test]
    fn test_edge_count_is_half_the_degree_sum() {
        let graph = graph_from(&[("a", "b", 0.1), ("b", "c", 0.2), ("a", "b", 0.3), ("c", "d", 0.4)]);
        let stats = graph.statistics();
        assert_eq!(stats.edges, 4);
        assert_eq!(stats.degree_distribution.iter().sum::<usize>(), 8);
    }

    #[test]
    fn test_neighbors_threshold_and_order() {
        let graph = graph_from(&[("a", "b", 0.4), ("a", "c", 0.9), ("a", "d", 0.6), ("a", "e", 0.6)]);
        let result = graph.neighbors(&pid("a"), 0.5, None);
        assert_eq!(ids(&result), vec!["c", "d", "e"]);
        assert!(result.iter().all(|(_, w)| *w >= 0.5));

        let limited = graph.neighbors(&pid("a"), 0.0, Some(2));
        assert_eq!(ids(&limited), vec!["c", "d"]);
    }

    #[test]
    fn test_neighbors_of_unknown_product() {
        let graph = graph_from(&[("a", "b", 0.4)]);
        assert!(graph.neighbors(&pid("zzz"), 0.0, None).is_empty());
    }

    #[test]
    fn test_add_edge_checked_rejects_out_of_range() {
        let mut graph = SimilarityGraph::new();
        assert!(graph.add_edge_checked(pid("a"), pid("b"), 1.5).is_err());
        assert!(graph.add_edge_checked(pid("a"), pid("b"), f32::NAN).is_err());
        assert!(graph.is_empty());
        assert!(graph.add_edge_checked(pid("a"), pid("b"), 1.0).is_ok());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_add_edge_accepts_out_of_range() {
        let graph = graph_from(&[("a", "b", 2.5)]);
        assert_eq!(graph.neighbors(&pid("a"), 0.0, None), vec![(pid("b"), 2.5)]);
    }

    #[test]
    fn test_shortest_chain_through_intermediate() {
        let graph = graph_from(&[("a", "b", 0.8), ("b", "c", 0.7)]);
        assert_eq!(graph.shortest_chain(&pid("a"), &pid("c"), 3), vec![pid("a"), pid("b"), pid("c")]);
    }

    #[test]
    fn test_shortest_chain_same_node() {
        let graph = graph_from(&[("a", "b", 0.8)]);
        assert_eq!(graph.shortest_chain(&pid("a"), &pid("a"), 0), vec![pid("a")]);
        assert_eq!(graph.shortest_chain(&pid("a"), &pid("a"), 10), vec![pid("a")]);
    }

    #[test]
    fn test_shortest_chain_respects_max_hops() {
        let graph = graph_from(&[("a", "b", 0.9), ("b", "c", 0.9), ("c", "d", 0.9)]);
        assert!(graph.shortest_chain(&pid("a"), &pid("d"), 2).is_empty());
        assert_eq!(graph.shortest_chain(&pid("a"), &pid("d"), 3).len(), 4);
        assert!(graph.shortest_chain(&pid("a"), &pid("b"), 0).is_empty());
        assert_eq!(graph.shortest_chain(&pid("a"), &pid("b"), 1), vec![pid("a"), pid("b")]);
    }

    #[test]
    fn test_shortest_chain_prefers_fewer_hops_over_weight() {
        // a-d is weak but direct; a-b-c-d is strong but longer
        let graph = graph_from(&[("a", "b", 0.99), ("b", "c", 0.99), ("c", "d", 0.99), ("a", "d", 0.01)]);
        assert_eq!(graph.shortest_chain(&pid("a"), &pid("d"), 5), vec![pid("a"), pid("d")]);
    }

    #[test]
    fn test_shortest_chain_unknown_or_disconnected() {
        let graph = graph_from(&[("a", "b", 0.8), ("c", "d", 0.8)]);
        assert!(graph.shortest_chain(&pid("a"), &pid("zzz"), 3).is_empty());
        assert!(graph.shortest_chain(&pid("zzz"), &pid("zzz"), 3).is_empty());
        assert!(graph.shortest_chain(&pid("a"), &pid("d"), 10).is_empty());
    }

    #[test]
    fn test_k_hop_direct_only() {
        let graph = graph_from(&[("a", "b", 0.9), ("b", "c", 0.8), ("a", "d", 0.5)]);
        let result = graph.k_hop_similarity(&pid("a"), 10, false);
        assert_eq!(result, vec![(pid("b"), 0.9), (pid("d"), 0.5)]);
    }

    #[test]
    fn test_k_hop_transitive_damping() {
        let graph = graph_from(&[("a", "b", 0.9), ("b", "c", 0.4)]);
        let result = graph.k_hop_similarity(&pid("a"), 10, true);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], (pid("b"), 0.9));
        let expected = (0.9f32 * 0.4).sqrt() * TRANSITIVE_DAMPING;
        assert_eq!(result[1].0, pid("c"));
        assert!((result[1].1 - expected).abs() < 1e-6);
    }

    #[test]
    fn test_k_hop_direct_score_not_overwritten_by_transitive() {
        // c is both a direct neighbor (0.2) and reachable through b
        let graph = graph_from(&[("a", "b", 0.9), ("a", "c", 0.2), ("b", "c", 0.9)]);
        let result = graph.k_hop_similarity(&pid("a"), 10, true);
        assert!(result.contains(&(pid("c"), 0.2)));
    }

    #[test]
    fn test_k_hop_first_transitive_estimate_wins() {
        // d is reachable via b (weak) first, then via c (strong)
        let graph = graph_from(&[("a", "b", 0.3), ("a", "c", 0.9), ("b", "d", 0.3), ("c", "d", 0.9)]);
        let result = graph.k_hop_similarity(&pid("a"), 10, true);
        let d = result.iter().find(|(id, _)| *id == pid("d")).unwrap();
        let via_b = (0.3f32 * 0.3).sqrt() * TRANSITIVE_DAMPING;
        assert!((d.1 - via_b).abs() < 1e-6);
    }

    #[test]
    fn test_k_hop_truncates_and_excludes_origin() {
        let graph = graph_from(&[("a", "b", 0.9), ("a", "c", 0.8), ("b", "d", 0.9), ("c", "e", 0.9)]);
        let result = graph.k_hop_similarity(&pid("a"), 2, true);
        assert_eq!(ids(&result), vec!["b", "c"]);
        let all = graph.k_hop_similarity(&pid("a"), 10, true);
        assert!(all.iter().all(|(id, _)| *id != pid("a")));
        assert!(graph.k_hop_similarity(&pid("zzz"), 5, true).is_empty());
    }

    #[test]
    fn test_clusters_threshold() {
        let graph = graph_from(&[
            ("a", "b", 0.9),
            ("b", "c", 0.85),
            ("a", "c", 0.8),
            ("d", "e", 0.9),
            ("c", "d", 0.3),
        ]);
        let mut sizes: Vec<usize> = graph.clusters(0.8).iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 3]);
        assert!(graph.clusters(0.95).is_empty());
        assert_eq!(graph.clusters(0.0).len(), 1);
    }

    #[test]
    fn test_clusters_are_disjoint() {
        let graph = graph_from(&[("a", "b", 0.9), ("c", "d", 0.9), ("b", "c", 0.9), ("e", "f", 0.1)]);
        let clusters = graph.clusters(0.5);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0], vec![pid("a"), pid("b"), pid("c"), pid("d")]);
    }

    #[test]
    fn test_statistics() {
        let graph = graph_from(&[("a", "b", 0.9), ("b", "c", 0.5)]);
        let stats = graph.statistics();
        assert_eq!(stats.products, 3);
        assert_eq!(stats.edges, 2);
        assert!((stats.density - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.degree_distribution, vec![1, 2, 1]);
        assert_eq!(stats.max_degree, 2);
        assert!((stats.average_degree - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_single_node_graphs() {
        let empty = SimilarityGraph::new();
        let stats = empty.statistics();
        assert_eq!(stats.products, 0);
        assert_eq!(stats.density, 0.0);
        assert!(empty.clusters(0.0).is_empty());
        assert!(empty.k_hop_similarity(&pid("a"), 5, true).is_empty());

        let mut single = SimilarityGraph::new();
        single.add_product(pid("a"));
        assert_eq!(single.statistics().density, 0.0);
        assert!(single.clusters(0.0).is_empty());
        assert!(single.neighbors(&pid("a"), 0.0, None).is_empty());
        assert!(single.k_hop_similarity(&pid("a"), 5, true).is_empty());
    }

    #[test]
    fn test_integer_product_ids() {
        let mut graph = SimilarityGraph::new();
        graph.add_edge(ProductId::from(1u64), ProductId::from(2u64), 0.7);
        assert_eq!(graph.neighbors(&ProductId::from(2u64), 0.0, None), vec![(ProductId::from(1u64), 0.7)]);
    }
}
