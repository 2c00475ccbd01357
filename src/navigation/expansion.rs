use std::collections::HashMap;

use super::tree::{BRANCHES_NODE_ID, NavigationNode, WORKSPACE_NODE_ID};

/// Expand/collapse flags keyed by node id, independent of node content.
///
/// Entries are never removed, so a node that disappears and comes back
/// (e.g. a deleted then recreated branch) keeps its last state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashMap<String, bool>,
}

impl Default for ExpansionState {
    fn default() -> Self {
        let expanded = [WORKSPACE_NODE_ID, BRANCHES_NODE_ID]
            .into_iter()
            .map(|id| (id.to_string(), true))
            .collect();
        Self { expanded }
    }
}

impl ExpansionState {
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get(id).copied().unwrap_or(false)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.expanded.contains_key(id)
    }

    /// Flips the entry for `id` and returns the new value.
    pub fn toggle(&mut self, id: &str) -> bool {
        let entry = self.expanded.entry(id.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    /// Adds a collapsed entry for every id not seen before.
    pub fn observe(&mut self, tree: &[NavigationNode]) {
        NavigationNode::walk(tree, &mut |node| {
            self.expanded.entry(node.id.clone()).or_insert(false);
        });
    }

    /// Copies the flags onto `tree`.
    pub fn resolve(&self, tree: &mut [NavigationNode]) {
        for node in tree {
            node.is_expanded = self.is_expanded(&node.id);
            self.resolve(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::tree::default_menu;

    #[test]
    fn test_seeded_groups_start_expanded() {
        let mut state = ExpansionState::default();
        state.observe(&default_menu());
        assert!(state.is_expanded(WORKSPACE_NODE_ID));
        assert!(state.is_expanded(BRANCHES_NODE_ID));
        assert!(state.contains("history"));
        assert!(!state.is_expanded("history"));
    }

    #[test]
    fn test_observe_does_not_override_existing_entries() {
        let mut state = ExpansionState::default();
        assert!(!state.toggle(WORKSPACE_NODE_ID));
        state.observe(&default_menu());
        assert!(!state.is_expanded(WORKSPACE_NODE_ID));
    }
}
