//! Read-only traversal over the persisted category hierarchy.
//!
//! The category service hands out an already nested forest. Nodes carry no
//! parent pointer, so every upward query searches from the roots.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model::{CategoryId, CategoryNode};

/// Ordered top-level categories with their nested children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryForest {
    roots: Vec<CategoryNode>,
}

impl CategoryForest {
    #[must_use]
    pub fn new(roots: Vec<CategoryNode>) -> Self {
        Self { roots }
    }

    #[must_use]
    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    #[must_use]
    pub fn into_roots(self) -> Vec<CategoryNode> {
        self.roots
    }

    /// Depth-first pre-order traversal yielding `(depth, node)`, roots at depth 0.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.roots)
    }

    /// Total number of categories at every depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.find(id).is_some()
    }

    #[must_use]
    pub fn find(&self, id: &CategoryId) -> Option<&CategoryNode> {
        self.walk().map(|(_, node)| node).find(|node| node.id() == id)
    }

    /// First category with the given name in traversal order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CategoryNode> {
        self.walk()
            .map(|(_, node)| node)
            .find(|node| node.name().as_str() == name)
    }

    /// The node whose direct children include `id`. Roots have no parent.
    #[must_use]
    pub fn find_parent(&self, id: &CategoryId) -> Option<&CategoryNode> {
        self.walk()
            .map(|(_, node)| node)
            .find(|node| node.children().iter().any(|child| child.id() == id))
    }

    /// Direct children of `id`; empty when the id is unknown.
    #[must_use]
    pub fn children_of(&self, id: &CategoryId) -> &[CategoryNode] {
        match self.find(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    /// Every ancestor of `target`, immediate parent first and root last.
    ///
    /// Returns an empty list for roots and for ids not present in the forest.
    #[must_use]
    pub fn ancestor_chain(&self, target: &CategoryId) -> Vec<CategoryId> {
        let mut path = Vec::new();
        if !path_to(&self.roots, target, &mut path) {
            return Vec::new();
        }
        path.pop();
        path.into_iter().rev().map(|node| node.id().clone()).collect()
    }

    /// Every id below `target` in pre-order, `target` itself excluded.
    #[must_use]
    pub fn descendant_ids(&self, target: &CategoryId) -> IndexSet<CategoryId> {
        let Some(node) = self.find(target) else {
            return IndexSet::new();
        };
        Walk::new(node.children())
            .map(|(_, child)| child.id().clone())
            .collect()
    }

    /// Every category name once, in traversal order.
    #[must_use]
    pub fn all_names(&self) -> Vec<&str> {
        let names: IndexSet<&str> = self
            .walk()
            .map(|(_, node)| node.name().as_str())
            .collect();
        names.into_iter().collect()
    }
}

impl From<Vec<CategoryNode>> for CategoryForest {
    fn from(roots: Vec<CategoryNode>) -> Self {
        Self::new(roots)
    }
}

/// Fills `path` with the nodes from a root down to `target` inclusive.
fn path_to<'a>(
    nodes: &'a [CategoryNode],
    target: &CategoryId,
    path: &mut Vec<&'a CategoryNode>,
) -> bool {
    for node in nodes {
        path.push(node);
        if node.id() == target || path_to(node.children(), target, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Pre-order iterator over a slice of category nodes.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a CategoryNode)>,
}

impl<'a> Walk<'a> {
    fn new(nodes: &'a [CategoryNode]) -> Self {
        Self {
            stack: nodes.iter().rev().map(|node| (0, node)).collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a CategoryNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}
