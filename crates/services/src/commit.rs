//! Batch save of drafted categories.

use storage::repository::{CategoryRepository, NewCategoryRecord};
use study_core::model::{CategoryId, CategoryName, PendingId};
use study_core::pending::{PendingCategory, PendingTree};

/// A draft that now exists on the category service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCategory {
    pub pending: PendingId,
    pub id: CategoryId,
    pub parent: Option<CategoryId>,
}

/// A draft the category service refused. Its subtree was not attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFailure {
    pub pending: PendingId,
    pub name: CategoryName,
    pub reason: String,
}

/// Outcome of `commit_all`. Counts cover every draft in the tree:
/// `success_count + error_count + skipped_count == tree.count()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub success_count: usize,
    pub error_count: usize,
    pub skipped_count: usize,
    pub created: Vec<CreatedCategory>,
    pub failures: Vec<CommitFailure>,
}

impl CommitReport {
    /// Server ids of everything created, in creation order.
    pub fn created_ids(&self) -> impl Iterator<Item = &CategoryId> {
        self.created.iter().map(|created| &created.id)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error_count == 0 && self.skipped_count == 0
    }
}

/// Create every draft, parents before children, one request at a time.
///
/// A child is only sent once its parent has a server id. When a draft fails,
/// its descendants are skipped and the walk moves on to its siblings.
pub async fn commit_all(tree: &PendingTree, repo: &dyn CategoryRepository) -> CommitReport {
    let mut report = CommitReport::default();
    let mut stack: Vec<(&PendingCategory, Option<CategoryId>)> = tree
        .roots()
        .iter()
        .rev()
        .map(|root| (root, root.anchor().cloned()))
        .collect();

    while let Some((node, parent)) = stack.pop() {
        let record = NewCategoryRecord::new(
            node.name().clone(),
            parent.clone(),
            node.description().map(str::to_owned),
        );

        match repo.create_category(record).await {
            Ok(id) => {
                report.success_count += 1;
                stack.extend(
                    node.children()
                        .iter()
                        .rev()
                        .map(|child| (child, Some(id.clone()))),
                );
                report.created.push(CreatedCategory {
                    pending: node.id(),
                    id,
                    parent,
                });
            }
            Err(e) => {
                let skipped = subtree_size(node) - 1;
                tracing::warn!(
                    pending = %node.id(),
                    name = %node.name(),
                    skipped,
                    error = %e,
                    "failed to create category"
                );
                report.error_count += 1;
                report.skipped_count += skipped;
                report.failures.push(CommitFailure {
                    pending: node.id(),
                    name: node.name().clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        created = report.success_count,
        failed = report.error_count,
        skipped = report.skipped_count,
        "category commit finished"
    );
    report
}

fn subtree_size(node: &PendingCategory) -> usize {
    1 + node.children().iter().map(subtree_size).sum::<usize>()
}
