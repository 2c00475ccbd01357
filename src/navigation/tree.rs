use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::Branch;

pub const WORKSPACE_NODE_ID: &str = "workspace";
pub const BRANCHES_NODE_ID: &str = "branches";

/// Pages a navigation leaf can lead to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Route {
    #[default]
    Home,
    History,
    Settings,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::History => "/history",
            Route::Settings => "/settings",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "/" => Ok(Route::Home),
            "/history" => Ok(Route::History),
            "/settings" => Ok(Route::Settings),
            other => Err(format!("Unknown route: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Icon {
    Folder,
    History,
    Settings,
    Branch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeStyle {
    CurrentBranch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationNode {
    pub id: String,
    pub label: String,
    pub icon: Option<Icon>,
    pub children: Vec<NavigationNode>,
    /// Only meaningful in trees returned by the composer.
    pub is_expanded: bool,
    pub link: Option<Route>,
    pub style: Option<NodeStyle>,
}

impl NavigationNode {
    pub fn group(
        id: impl Into<String>,
        label: impl Into<String>,
        icon: Icon,
        children: Vec<NavigationNode>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: Some(icon),
            children,
            is_expanded: false,
            link: None,
            style: None,
        }
    }

    pub fn link(id: impl Into<String>, label: impl Into<String>, icon: Icon, route: Route) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: Some(icon),
            children: Vec::new(),
            is_expanded: false,
            link: Some(route),
            style: None,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first search by id.
    pub fn find<'a>(nodes: &'a [NavigationNode], id: &str) -> Option<&'a NavigationNode> {
        nodes.iter().find_map(|node| {
            if node.id == id {
                Some(node)
            } else {
                Self::find(&node.children, id)
            }
        })
    }

    /// Visits every node depth-first.
    pub fn walk<'a>(nodes: &'a [NavigationNode], visit: &mut impl FnMut(&'a NavigationNode)) {
        for node in nodes {
            visit(node);
            Self::walk(&node.children, visit);
        }
    }
}

/// The sidebar shipped with the desktop client.
pub fn default_menu() -> Vec<NavigationNode> {
    vec![
        NavigationNode::group(
            WORKSPACE_NODE_ID,
            "Workspace",
            Icon::Folder,
            vec![
                NavigationNode::link("history", "History", Icon::History, Route::History),
                NavigationNode::link("settings", "Settings", Icon::Settings, Route::Settings),
            ],
        ),
        NavigationNode::group(BRANCHES_NODE_ID, "Branches", Icon::Branch, Vec::new()),
    ]
}

pub fn branch_node_id(name: &str) -> String {
    format!("branch-{name}")
}

/// Replaces the children of the `branches` node with one leaf per branch.
/// Every other subtree is returned unchanged.
pub fn compose(static_tree: &[NavigationNode], branches: &[Branch]) -> Vec<NavigationNode> {
    static_tree
        .iter()
        .map(|node| {
            if node.id == BRANCHES_NODE_ID {
                NavigationNode {
                    children: branches.iter().map(branch_leaf).collect(),
                    ..node.clone()
                }
            } else {
                NavigationNode {
                    children: compose(&node.children, branches),
                    ..node.clone()
                }
            }
        })
        .collect()
}

fn branch_leaf(branch: &Branch) -> NavigationNode {
    NavigationNode {
        id: branch_node_id(&branch.name),
        label: branch.name.clone(),
        icon: None,
        children: Vec::new(),
        is_expanded: false,
        link: None,
        style: branch.is_current.then_some(NodeStyle::CurrentBranch),
    }
}
