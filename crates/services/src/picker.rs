//! Editor state behind the category checklist and the "new category" form.
//!
//! `CategoryPicker` owns the loaded forest, the current selection, the drafted
//! categories and which nodes are expanded. Rendering is left to the caller,
//! which reads `checklist` and `pending_rows`.

use std::collections::HashSet;
use std::sync::Arc;

use storage::repository::CategoryRepository;
use study_core::model::{CategoryId, CategoryName, PendingId};
use study_core::pending::{CategoryDraft, PendingTree};
use study_core::selection::Selection;
use study_core::tree::CategoryForest;

use crate::commit::{CommitReport, commit_all};
use crate::error::PickerError;

/// One visible line of the saved-category checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistRow {
    pub id: CategoryId,
    pub name: CategoryName,
    pub depth: usize,
    pub checked: bool,
    pub has_children: bool,
    pub expanded: bool,
}

/// One visible line of the drafted-category list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRow {
    pub id: PendingId,
    pub name: CategoryName,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

pub struct CategoryPicker {
    categories: Arc<dyn CategoryRepository>,
    forest: CategoryForest,
    selection: Selection,
    pending: PendingTree,
    expanded: HashSet<CategoryId>,
}

impl CategoryPicker {
    #[must_use]
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self {
            categories,
            forest: CategoryForest::default(),
            selection: Selection::new(),
            pending: PendingTree::new(),
            expanded: HashSet::new(),
        }
    }

    /// Start from an existing selection, e.g. when editing a saved deck.
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn forest(&self) -> &CategoryForest {
        &self.forest
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn pending(&self) -> &PendingTree {
        &self.pending
    }

    /// Fetch the forest again and forget selected ids that vanished.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::Storage` if the categories cannot be loaded.
    /// The previous state is kept in that case.
    pub async fn reload(&mut self) -> Result<(), PickerError> {
        let forest = self.categories.list_categories().await?;
        self.selection = self.selection.retain_known(&forest);
        self.expanded.retain(|id| forest.contains(id));
        self.forest = forest;
        Ok(())
    }

    pub fn toggle(&mut self, id: &CategoryId) {
        self.selection = self.selection.toggle(&self.forest, id);
    }

    pub fn toggle_expansion(&mut self, id: &CategoryId) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
    }

    #[must_use]
    pub fn is_expanded(&self, id: &CategoryId) -> bool {
        self.expanded.contains(id)
    }

    /// Queue a new category for the next `save_all`.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::Pending` if the name is blank or the pending
    /// parent is gone. The drafted tree is left unchanged.
    pub fn add_draft(&mut self, draft: CategoryDraft) -> Result<PendingId, PickerError> {
        let (pending, id) = self.pending.add_draft(draft)?;
        self.pending = pending;
        Ok(id)
    }

    pub fn remove_pending(&mut self, id: PendingId) {
        self.pending = self.pending.remove(id);
    }

    pub fn toggle_pending_expansion(&mut self, id: PendingId) {
        self.pending = self.pending.toggle_expanded(id);
    }

    /// Create every drafted category, then refresh and select what was created
    /// together with its saved ancestors.
    ///
    /// The drafts are cleared as soon as at least one of them was created.
    /// A failed refresh afterwards is logged and the report still returned.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::NothingToSave` when there are no drafts.
    pub async fn save_all(&mut self) -> Result<CommitReport, PickerError> {
        if self.pending.is_empty() {
            return Err(PickerError::NothingToSave);
        }

        let report = commit_all(&self.pending, self.categories.as_ref()).await;
        if report.success_count > 0 {
            self.pending = PendingTree::new();
            if let Err(e) = self.reload().await {
                tracing::warn!(error = %e, "reload after save failed");
            }
            let chosen: Vec<CategoryId> = report
                .created_ids()
                .flat_map(|id| std::iter::once(id.clone()).chain(self.forest.ancestor_chain(id)))
                .collect();
            self.selection = self.selection.merge(chosen);
        }
        Ok(report)
    }

    /// Selected names joined for the deck's category field.
    #[must_use]
    pub fn category_field(&self) -> String {
        self.selection.category_field(&self.forest)
    }

    #[must_use]
    pub fn selected_names(&self) -> Vec<&str> {
        self.selection.resolve_names(&self.forest)
    }

    /// Visible saved categories in display order. Children of collapsed nodes
    /// are hidden.
    #[must_use]
    pub fn checklist(&self) -> Vec<ChecklistRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<_> = self.forest.roots().iter().rev().map(|n| (0, n)).collect();
        while let Some((depth, node)) = stack.pop() {
            let expanded = self.expanded.contains(node.id());
            if expanded {
                stack.extend(node.children().iter().rev().map(|c| (depth + 1, c)));
            }
            rows.push(ChecklistRow {
                id: node.id().clone(),
                name: node.name().clone(),
                depth,
                checked: self.selection.contains(node.id()),
                has_children: node.has_children(),
                expanded,
            });
        }
        rows
    }

    /// Visible drafts in display order, same collapsing rule as `checklist`.
    #[must_use]
    pub fn pending_rows(&self) -> Vec<PendingRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<_> = self.pending.roots().iter().rev().map(|n| (0, n)).collect();
        while let Some((depth, node)) = stack.pop() {
            if node.is_expanded() {
                stack.extend(node.children().iter().rev().map(|c| (depth + 1, c)));
            }
            rows.push(PendingRow {
                id: node.id(),
                name: node.name().clone(),
                depth,
                has_children: !node.children().is_empty(),
                expanded: node.is_expanded(),
            });
        }
        rows
    }
}
