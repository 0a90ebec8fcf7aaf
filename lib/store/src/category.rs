//! Hierarchical product categories
//!
//! An n-ary tree rooted at [`ROOT_CATEGORY`]. Categories are stored in an
//! arena in creation order; products may sit in any number of categories.
//! Construction mistakes (duplicate ids, unknown parents) fail loudly, while
//! queries against unknown categories or products return empty results.

use ahash::{AHashMap, AHashSet};
use hybridrec_core::{CategoryIndex, Error, ProductId, Result};
use serde::Serialize;

/// Id of the implicit root category
pub const ROOT_CATEGORY: &str = "root";

#[derive(Debug, Clone)]
struct CategoryNode {
    id: String,
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    products: Vec<ProductId>,
}

impl CategoryNode {
    fn new(id: String, name: String, parent: Option<usize>) -> Self {
        Self {
            id,
            name,
            parent,
            children: Vec::new(),
            products: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatistics {
    /// Includes the root
    pub total_categories: usize,
    /// Number of (product, category) placements
    pub total_products: usize,
    pub max_depth: usize,
    pub leaf_categories: usize,
    pub avg_products_per_category: f64,
}

/// Category hierarchy with product placement
#[derive(Debug, Clone)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    index: AHashMap<String, usize>,
    product_categories: AHashMap<ProductId, Vec<usize>>,
    total_products: usize,
}

impl Default for CategoryTree {
    fn default() -> Self {
        Self::new("Root")
    }
}

impl CategoryTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = CategoryNode::new(ROOT_CATEGORY.to_string(), root_name.into(), None);
        let mut index = AHashMap::new();
        index.insert(ROOT_CATEGORY.to_string(), 0);
        Self {
            nodes: vec![root],
            index,
            product_categories: AHashMap::new(),
            total_products: 0,
        }
    }

    /// Add a category under `parent` (the root when `None`)
    pub fn add_category(&mut self, id: &str, name: &str, parent: Option<&str>) -> Result<()> {
        if self.index.contains_key(id) {
            return Err(Error::CategoryExists(id.to_string()));
        }
        let parent_id = parent.unwrap_or(ROOT_CATEGORY);
        let parent_idx = *self
            .index
            .get(parent_id)
            .ok_or_else(|| Error::ParentNotFound(parent_id.to_string()))?;

        let idx = self.nodes.len();
        self.nodes
            .push(CategoryNode::new(id.to_string(), name.to_string(), Some(parent_idx)));
        self.nodes[parent_idx].children.push(idx);
        self.index.insert(id.to_string(), idx);
        tracing::debug!(category = id, parent = parent_id, "category added");
        Ok(())
    }

    /// Place a product in a category. Returns `false` if it was already there.
    pub fn add_product(&mut self, product: ProductId, category: &str) -> Result<bool> {
        let idx = *self
            .index
            .get(category)
            .ok_or_else(|| Error::CategoryNotFound(category.to_string()))?;

        let node = &mut self.nodes[idx];
        if node.products.contains(&product) {
            return Ok(false);
        }
        node.products.push(product.clone());
        self.product_categories.entry(product).or_default().push(idx);
        self.total_products += 1;
        Ok(true)
    }

    #[inline]
    pub fn contains(&self, category: &str) -> bool {
        self.index.contains_key(category)
    }

    /// Category name, if the category exists
    pub fn name(&self, category: &str) -> Option<&str> {
        self.index.get(category).map(|&idx| self.nodes[idx].name.as_str())
    }

    /// Products in a category, optionally including all descendants.
    ///
    /// Pre-order over the subtree; a product placed in several visited
    /// categories is listed once, at its first occurrence.
    pub fn products_in_category(&self, category: &str, include_descendants: bool) -> Vec<ProductId> {
        let Some(&start) = self.index.get(category) else {
            return Vec::new();
        };

        let mut seen = AHashSet::new();
        let mut products = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            for product in &node.products {
                if seen.insert(product) {
                    products.push(product.clone());
                }
            }
            if include_descendants {
                stack.extend(node.children.iter().rev());
            }
        }
        products
    }

    /// Ids of the categories directly holding `product`, in creation order
    pub fn categories_of(&self, product: &ProductId) -> Vec<String> {
        let Some(indices) = self.product_categories.get(product) else {
            return Vec::new();
        };
        let mut indices = indices.clone();
        indices.sort_unstable();
        indices.into_iter().map(|idx| self.nodes[idx].id.clone()).collect()
    }

    /// Category names from the root down to `category`
    pub fn category_path(&self, category: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(category) else {
            return Vec::new();
        };
        let mut path = Vec::new();
        let mut cursor = Some(idx);
        while let Some(i) = cursor {
            path.push(self.nodes[i].name.clone());
            cursor = self.nodes[i].parent;
        }
        path.reverse();
        path
    }

    fn depth_of(&self, idx: usize) -> usize {
        let mut depth = 0;
        let mut cursor = self.nodes[idx].parent;
        while let Some(i) = cursor {
            depth += 1;
            cursor = self.nodes[i].parent;
        }
        depth
    }

    /// Descendant category ids up to `depth` levels down (1 = direct children), pre-order
    pub fn subcategories(&self, category: &str, depth: usize) -> Vec<String> {
        let Some(&start) = self.index.get(category) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        let mut stack: Vec<(usize, usize)> = self.nodes[start]
            .children
            .iter()
            .rev()
            .map(|&child| (child, 1))
            .collect();
        while let Some((idx, level)) = stack.pop() {
            if level > depth {
                continue;
            }
            result.push(self.nodes[idx].id.clone());
            stack.extend(self.nodes[idx].children.iter().rev().map(|&child| (child, level + 1)));
        }
        result
    }

    /// Category ids whose name contains `needle`
    pub fn find_by_name(&self, needle: &str, case_sensitive: bool) -> Vec<String> {
        let needle = if case_sensitive {
            needle.to_string()
        } else {
            needle.to_lowercase()
        };
        self.nodes
            .iter()
            .filter(|node| {
                if case_sensitive {
                    node.name.contains(&needle)
                } else {
                    node.name.to_lowercase().contains(&needle)
                }
            })
            .map(|node| node.id.clone())
            .collect()
    }

    /// Products near `product` in the hierarchy.
    ///
    /// Uses the first category holding the product: other products in that
    /// category, then products in its sibling categories, then products in its
    /// parent unless the parent is the root.
    pub fn related_products(&self, product: &ProductId, max: usize) -> Vec<ProductId> {
        let Some(&home) = self.product_categories.get(product).and_then(|c| c.iter().min()) else {
            return Vec::new();
        };

        let node = &self.nodes[home];
        let mut sources: Vec<&[ProductId]> = vec![node.products.as_slice()];
        if let Some(parent) = node.parent {
            for &sibling in &self.nodes[parent].children {
                if sibling != home {
                    sources.push(self.nodes[sibling].products.as_slice());
                }
            }
            if parent != 0 {
                sources.push(self.nodes[parent].products.as_slice());
            }
        }

        let mut seen: AHashSet<&ProductId> = AHashSet::new();
        seen.insert(product);
        let mut related = Vec::new();
        for p in sources.into_iter().flatten() {
            if seen.insert(p) {
                related.push(p.clone());
            }
        }

        related.truncate(max);
        related
    }

    /// Indented text rendering of a subtree, or `None` for an unknown category
    pub fn render(&self, category: &str, max_depth: Option<usize>) -> Option<String> {
        let &start = self.index.get(category)?;
        let mut lines = Vec::new();
        // (node, depth, is last child)
        let mut stack = vec![(start, 0usize, None::<bool>)];
        while let Some((idx, depth, last)) = stack.pop() {
            if max_depth.is_some_and(|max| depth > max) {
                continue;
            }
            let node = &self.nodes[idx];
            let prefix = match last {
                None => "",
                Some(true) => "└── ",
                Some(false) => "├── ",
            };
            lines.push(format!(
                "{}{}{} ({} products)",
                "  ".repeat(depth),
                prefix,
                node.name,
                node.products.len()
            ));
            let count = node.children.len();
            for (i, &child) in node.children.iter().enumerate().rev() {
                stack.push((child, depth + 1, Some(i + 1 == count)));
            }
        }
        Some(lines.join("\n"))
    }

    pub fn statistics(&self) -> CategoryStatistics {
        let max_depth = (0..self.nodes.len()).map(|idx| self.depth_of(idx)).max().unwrap_or(0);
        let leaf_categories = self.nodes.iter().filter(|n| n.children.is_empty()).count();
        let placed: usize = self.nodes.iter().map(|n| n.products.len()).sum();

        CategoryStatistics {
            total_categories: self.nodes.len(),
            total_products: self.total_products,
            max_depth,
            leaf_categories,
            avg_products_per_category: placed as f64 / self.nodes.len() as f64,
        }
    }
}

impl CategoryIndex for CategoryTree {
    fn products_in_category(&self, category: &str, include_descendants: bool) -> Vec<ProductId> {
        CategoryTree::products_in_category(self, category, include_descendants)
    }

    fn categories_of(&self, item: &ProductId) -> Vec<String> {
        CategoryTree::categories_of(self, item)
    }
}
