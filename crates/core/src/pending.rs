//! Categories drafted locally before a batch save.
//!
//! Every operation returns a rebuilt tree and leaves the receiver untouched.

use thiserror::Error;

use crate::model::{CategoryError, CategoryId, CategoryName, CategoryRef, PendingId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PendingTreeError {
    #[error(transparent)]
    Name(#[from] CategoryError),

    #[error("parent {0} is not in the draft tree")]
    UnknownParent(PendingId),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Contents of the "new category" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub parent: Option<CategoryRef>,
}

impl CategoryDraft {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Nest the draft under a pending node, or anchor it to a saved category.
    #[must_use]
    pub fn under(mut self, parent: impl Into<CategoryRef>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

//
// ─── NODE ──────────────────────────────────────────────────────────────────────
//

/// A drafted category that has not been sent to the category service yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCategory {
    id: PendingId,
    name: CategoryName,
    description: Option<String>,
    anchor: Option<CategoryId>,
    expanded: bool,
    children: Vec<PendingCategory>,
}

impl PendingCategory {
    #[must_use]
    pub fn id(&self) -> PendingId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Saved category this top-level draft will be created under, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<&CategoryId> {
        self.anchor.as_ref()
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[must_use]
    pub fn children(&self) -> &[PendingCategory] {
        &self.children
    }

    fn rebuilt(&self, children: Vec<PendingCategory>) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            anchor: self.anchor.clone(),
            expanded: self.expanded,
            children,
        }
    }
}

//
// ─── TREE ──────────────────────────────────────────────────────────────────────
//

/// Forest of drafted categories awaiting a batch save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTree {
    roots: Vec<PendingCategory>,
}

impl PendingTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn roots(&self) -> &[PendingCategory] {
        &self.roots
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of drafts at every depth.
    #[must_use]
    pub fn count(&self) -> usize {
        self.walk().count()
    }

    /// Depth-first pre-order traversal yielding `(depth, node)`.
    #[must_use]
    pub fn walk(&self) -> PendingWalk<'_> {
        PendingWalk {
            stack: self.roots.iter().rev().map(|node| (0, node)).collect(),
        }
    }

    #[must_use]
    pub fn find(&self, id: PendingId) -> Option<&PendingCategory> {
        self.walk().map(|(_, node)| node).find(|node| node.id == id)
    }

    /// Add a draft and return the new tree along with the draft's temporary id.
    ///
    /// The new node starts expanded. When nested, its parent is expanded too.
    ///
    /// # Errors
    ///
    /// Returns `PendingTreeError::Name` if the name is blank.
    /// Returns `PendingTreeError::UnknownParent` if the pending parent is missing.
    pub fn add_draft(&self, draft: CategoryDraft) -> Result<(Self, PendingId), PendingTreeError> {
        let name = CategoryName::new(draft.name)?;
        let mut node = PendingCategory {
            id: PendingId::generate(),
            name,
            description: draft.description.filter(|d| !d.trim().is_empty()),
            anchor: None,
            expanded: true,
            children: Vec::new(),
        };
        let id = node.id;

        let roots = match draft.parent {
            Some(CategoryRef::Pending(parent)) => insert_under(&self.roots, parent, &node)
                .ok_or(PendingTreeError::UnknownParent(parent))?,
            Some(CategoryRef::Persisted(anchor)) => {
                node.anchor = Some(anchor);
                appended(&self.roots, node)
            }
            None => appended(&self.roots, node),
        };
        Ok((Self { roots }, id))
    }

    /// Drop a draft and its whole subtree. Unknown ids leave the tree as is.
    #[must_use]
    pub fn remove(&self, id: PendingId) -> Self {
        Self {
            roots: without(&self.roots, id),
        }
    }

    #[must_use]
    pub fn toggle_expanded(&self, id: PendingId) -> Self {
        Self {
            roots: toggled(&self.roots, id),
        }
    }
}

fn appended(nodes: &[PendingCategory], node: PendingCategory) -> Vec<PendingCategory> {
    let mut out = nodes.to_vec();
    out.push(node);
    out
}

fn insert_under(
    nodes: &[PendingCategory],
    parent: PendingId,
    child: &PendingCategory,
) -> Option<Vec<PendingCategory>> {
    for (index, node) in nodes.iter().enumerate() {
        let replacement = if node.id == parent {
            let mut updated = node.rebuilt(appended(&node.children, child.clone()));
            updated.expanded = true;
            Some(updated)
        } else {
            insert_under(&node.children, parent, child).map(|children| node.rebuilt(children))
        };

        if let Some(updated) = replacement {
            let mut out = nodes.to_vec();
            out[index] = updated;
            return Some(out);
        }
    }
    None
}

fn without(nodes: &[PendingCategory], id: PendingId) -> Vec<PendingCategory> {
    nodes
        .iter()
        .filter(|node| node.id != id)
        .map(|node| node.rebuilt(without(&node.children, id)))
        .collect()
}

fn toggled(nodes: &[PendingCategory], id: PendingId) -> Vec<PendingCategory> {
    nodes
        .iter()
        .map(|node| {
            let mut updated = node.rebuilt(toggled(&node.children, id));
            if node.id == id {
                updated.expanded = !node.expanded;
            }
            updated
        })
        .collect()
}

/// Pre-order iterator over drafted categories.
pub struct PendingWalk<'a> {
    stack: Vec<(usize, &'a PendingCategory)>,
}

impl<'a> Iterator for PendingWalk<'a> {
    type Item = (usize, &'a PendingCategory);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}
