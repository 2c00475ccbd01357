//! Sidebar navigation: a static tree merged with the open repository's
//! branches, plus expand/collapse state keyed by node id.

mod composer;
mod expansion;
mod tree;

pub use composer::{NavigationComposer, ToggleOutcome, render_tree};
pub use expansion::ExpansionState;
pub use tree::{
    BRANCHES_NODE_ID, Icon, NavigationNode, NodeStyle, Route, WORKSPACE_NODE_ID, branch_node_id,
    compose, default_menu,
};
