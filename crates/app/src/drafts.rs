//! `pending.json` import format: `[{ "name", "description"?, "children"? }]`.

use serde::Deserialize;
use study_core::model::{CategoryId, CategoryRef};
use study_core::pending::{CategoryDraft, PendingTree, PendingTreeError};

#[derive(Debug, Clone, Deserialize)]
pub struct DraftEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<DraftEntry>,
}

/// Build a drafted tree from the file entries, optionally anchoring every
/// top-level entry under an existing category.
pub fn build_tree(
    entries: &[DraftEntry],
    anchor: Option<&CategoryId>,
) -> Result<PendingTree, study_core::Error> {
    let tree = add_entries(
        PendingTree::new(),
        entries,
        anchor.cloned().map(CategoryRef::from),
    )?;
    Ok(tree)
}

/// Parse command-line category ids, refusing temporary draft ids.
pub fn parse_ids(raw: &[String]) -> Result<Vec<CategoryId>, study_core::Error> {
    raw.iter()
        .map(|value| value.parse::<CategoryId>().map_err(study_core::Error::from))
        .collect()
}

fn add_entries(
    mut tree: PendingTree,
    entries: &[DraftEntry],
    parent: Option<CategoryRef>,
) -> Result<PendingTree, PendingTreeError> {
    for entry in entries {
        let mut draft = CategoryDraft::new(entry.name.as_str());
        if let Some(description) = &entry.description {
            draft = draft.with_description(description.as_str());
        }
        if let Some(parent) = &parent {
            draft = draft.under(parent.clone());
        }
        let (next, id) = tree.add_draft(draft)?;
        tree = add_entries(next, &entry.children, Some(CategoryRef::Pending(id)))?;
    }
    Ok(tree)
}
