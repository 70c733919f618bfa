//! Multi-select state over the category forest.
//!
//! Selecting a category also selects its whole ancestor chain. Deselecting a
//! category drops it together with everything below it. Ancestors that were
//! only selected as a side effect stay selected.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model::{CategoryId, CategoryNode};
use crate::tree::CategoryForest;

/// Separator used when the selection is sent as a single text field.
pub const FIELD_SEPARATOR: &str = ",";

/// Breadcrumb separator for `labelled_paths`.
pub const PATH_SEPARATOR: &str = " > ";

/// Set of chosen category ids, kept in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: IndexSet<CategoryId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryId> {
        self.ids.iter()
    }

    /// Flip the selection state of `target`.
    ///
    /// Ids missing from the forest are still added or removed, but without
    /// ancestors or descendants since none can be found.
    #[must_use]
    pub fn toggle(&self, forest: &CategoryForest, target: &CategoryId) -> Self {
        let mut ids = self.ids.clone();
        if ids.contains(target) {
            let descendants = forest.descendant_ids(target);
            ids.retain(|id| id != target && !descendants.contains(id));
        } else {
            ids.insert(target.clone());
            ids.extend(forest.ancestor_chain(target));
        }
        Self { ids }
    }

    /// Add ids verbatim, skipping ones already present.
    #[must_use]
    pub fn merge<I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = CategoryId>,
    {
        let mut merged = self.ids.clone();
        merged.extend(ids);
        Self { ids: merged }
    }

    /// Drop ids that no longer exist in `forest`.
    #[must_use]
    pub fn retain_known(&self, forest: &CategoryForest) -> Self {
        let mut ids = self.ids.clone();
        ids.retain(|id| forest.contains(id));
        Self { ids }
    }

    /// True when every selected node has all of its ancestors selected.
    #[must_use]
    pub fn is_upward_closed(&self, forest: &CategoryForest) -> bool {
        self.ids.iter().all(|id| {
            forest
                .ancestor_chain(id)
                .iter()
                .all(|ancestor| self.ids.contains(ancestor))
        })
    }

    /// Names of the selected categories in forest traversal order.
    #[must_use]
    pub fn resolve_names<'a>(&self, forest: &'a CategoryForest) -> Vec<&'a str> {
        forest
            .walk()
            .map(|(_, node)| node)
            .filter(|node| self.ids.contains(node.id()))
            .map(|node| node.name().as_str())
            .collect()
    }

    /// Resolved names joined into the single `category` text field.
    #[must_use]
    pub fn category_field(&self, forest: &CategoryForest) -> String {
        self.resolve_names(forest).join(FIELD_SEPARATOR)
    }

    /// `Root > Child > Leaf` labels for every selected category.
    #[must_use]
    pub fn labelled_paths(&self, forest: &CategoryForest) -> Vec<String> {
        let mut labels = Vec::new();
        let mut trail = Vec::new();
        collect_labels(forest.roots(), &self.ids, &mut trail, &mut labels);
        labels
    }
}

fn collect_labels<'a>(
    nodes: &'a [CategoryNode],
    selected: &IndexSet<CategoryId>,
    trail: &mut Vec<&'a str>,
    labels: &mut Vec<String>,
) {
    for node in nodes {
        trail.push(node.name().as_str());
        if selected.contains(node.id()) {
            labels.push(trail.join(PATH_SEPARATOR));
        }
        collect_labels(node.children(), selected, trail, labels);
        trail.pop();
    }
}

impl FromIterator<CategoryId> for Selection {
    fn from_iter<T: IntoIterator<Item = CategoryId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::{id, law_forest, node};

    fn scenario_forest() -> CategoryForest {
        CategoryForest::new(vec![node(
            "d",
            "Direito",
            vec![node("c", "Constitucional", vec![]), node("p", "Penal", vec![])],
        )])
    }

    #[test]
    fn selecting_a_leaf_selects_its_parent() {
        let forest = scenario_forest();
        let selection = Selection::new().toggle(&forest, &id("c"));
        assert_eq!(selection, [id("c"), id("d")].into_iter().collect());
    }

    #[test]
    fn deselecting_a_leaf_keeps_the_side_effect_parent() {
        let forest = scenario_forest();
        let selection = Selection::new()
            .toggle(&forest, &id("c"))
            .toggle(&forest, &id("c"));
        assert_eq!(selection, [id("d")].into_iter().collect());
    }

    #[test]
    fn deselecting_a_parent_cascades_to_children() {
        let forest = law_forest();
        let selection = Selection::new()
            .toggle(&forest, &id("f"))
            .toggle(&forest, &id("p"));
        assert_eq!(selection.len(), 4);

        let cleared = selection.toggle(&forest, &id("d"));
        assert!(cleared.is_empty());
    }

    #[test]
    fn deselecting_middle_node_leaves_root_and_siblings() {
        let forest = law_forest();
        let selection = Selection::new()
            .toggle(&forest, &id("f"))
            .toggle(&forest, &id("p"))
            .toggle(&forest, &id("c"));
        assert_eq!(selection, [id("d"), id("p")].into_iter().collect());
    }

    #[test]
    fn toggle_leaves_input_untouched() {
        let forest = scenario_forest();
        let original = Selection::new().toggle(&forest, &id("p"));
        let _ = original.toggle(&forest, &id("c"));
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn every_toggle_sequence_stays_upward_closed_for_selected_leaf() {
        let forest = law_forest();
        let sequence = ["p", "f", "c", "pt", "d", "f"];
        let mut selection = Selection::new();
        for raw in sequence {
            selection = selection.toggle(&forest, &id(raw));
        }
        assert!(selection.contains(&id("f")));
        assert!(selection.is_upward_closed(&forest));
    }

    #[test]
    fn unknown_ids_toggle_alone() {
        let forest = scenario_forest();
        let selected = Selection::new().toggle(&forest, &id("ghost"));
        assert_eq!(selected, [id("ghost")].into_iter().collect());
        assert!(selected.toggle(&forest, &id("ghost")).is_empty());
    }

    #[test]
    fn resolve_names_follows_tree_order() {
        let forest = scenario_forest();
        let selection: Selection = [id("p"), id("c")].into_iter().collect();
        assert_eq!(selection.resolve_names(&forest), vec!["Constitucional", "Penal"]);
    }

    #[test]
    fn resolve_names_lists_parents_first_and_skips_stale_ids() {
        let forest = law_forest();
        let selection: Selection = [id("f"), id("gone"), id("d"), id("c")].into_iter().collect();
        assert_eq!(
            selection.resolve_names(&forest),
            vec!["Direito", "Constitucional", "Direitos Fundamentais"]
        );
    }

    #[test]
    fn category_field_is_comma_joined() {
        let forest = scenario_forest();
        let selection = Selection::new().toggle(&forest, &id("p"));
        assert_eq!(selection.category_field(&forest), "Direito,Penal");
        assert_eq!(Selection::new().category_field(&forest), "");
    }

    #[test]
    fn labelled_paths_show_breadcrumbs() {
        let forest = law_forest();
        let selection = Selection::new().toggle(&forest, &id("f"));
        assert_eq!(
            selection.labelled_paths(&forest),
            vec![
                "Direito".to_string(),
                "Direito > Constitucional".to_string(),
                "Direito > Constitucional > Direitos Fundamentais".to_string(),
            ]
        );
    }

    #[test]
    fn retain_known_drops_stale_ids() {
        let forest = scenario_forest();
        let selection: Selection = [id("d"), id("old")].into_iter().collect();
        assert_eq!(selection.retain_known(&forest), [id("d")].into_iter().collect());
    }

    #[test]
    fn merge_adds_without_duplicates() {
        let selection: Selection = [id("a")].into_iter().collect();
        let merged = selection.merge([id("a"), id("b")]);
        assert_eq!(merged.iter().cloned().collect::<Vec<_>>(), vec![id("a"), id("b")]);
    }
}
