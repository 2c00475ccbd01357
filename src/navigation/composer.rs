use std::fmt::Write as _;

use tokio::sync::watch;

use super::expansion::ExpansionState;
use super::tree::{NavigationNode, NodeStyle, Route, compose, default_menu};
use crate::domain::Branch;

/// Result of activating a navigation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A group was expanded (`true`) or collapsed.
    Toggled(bool),
    Navigate(Route),
    Ignored,
}

/// Merges the static sidebar with the branches of the open repository and
/// keeps expansion state across recomputation.
pub struct NavigationComposer {
    static_tree: Vec<NavigationNode>,
    branches: Vec<Branch>,
    expansion: ExpansionState,
    revision: watch::Sender<u64>,
}

impl Default for NavigationComposer {
    fn default() -> Self {
        Self::new(default_menu())
    }
}

impl NavigationComposer {
    pub fn new(static_tree: Vec<NavigationNode>) -> Self {
        let mut expansion = ExpansionState::default();
        expansion.observe(&static_tree);
        let (revision, _) = watch::channel(0);
        Self {
            static_tree,
            branches: Vec::new(),
            expansion,
            revision,
        }
    }

    pub fn get_tree(&self) -> Vec<NavigationNode> {
        let mut tree = compose(&self.static_tree, &self.branches);
        self.expansion.resolve(&mut tree);
        tree
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Recomputes the tree for a new branch list. Returns false when the list
    /// is unchanged.
    pub fn set_branches(&mut self, branches: &[Branch]) -> bool {
        if self.branches == branches {
            return false;
        }
        self.branches = branches.to_vec();
        self.expansion
            .observe(&compose(&self.static_tree, &self.branches));
        self.bump();
        true
    }

    pub fn toggle(&mut self, id: &str) -> ToggleOutcome {
        let tree = compose(&self.static_tree, &self.branches);
        let Some(node) = NavigationNode::find(&tree, id) else {
            log::debug!("Ignoring toggle of unknown node '{id}'");
            return ToggleOutcome::Ignored;
        };

        if node.has_children() {
            let expanded = self.expansion.toggle(id);
            self.bump();
            ToggleOutcome::Toggled(expanded)
        } else if let Some(route) = node.link {
            ToggleOutcome::Navigate(route)
        } else {
            ToggleOutcome::Ignored
        }
    }

    /// Revision counter bumped on every tree change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

/// Plain-text rendering of a resolved tree, children of collapsed groups
/// omitted.
pub fn render_tree(tree: &[NavigationNode]) -> String {
    let mut out = String::new();
    render_level(&mut out, tree, 0);
    out
}

fn render_level(out: &mut String, nodes: &[NavigationNode], depth: usize) {
    for node in nodes {
        let marker = match (node.has_children(), node.is_expanded) {
            (true, true) => "⌄ ",
            (true, false) => "› ",
            (false, _) => "  ",
        };
        let _ = write!(out, "{}{}{}", "  ".repeat(depth), marker, node.label);
        if node.style == Some(NodeStyle::CurrentBranch) {
            out.push_str(" *");
        }
        if let Some(route) = node.link {
            let _ = write!(out, " ({route})");
        }
        out.push('\n');

        if node.is_expanded {
            render_level(out, &node.children, depth + 1);
        }
    }
}
