use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Repository description as returned by the backend command boundary.
///
/// This is the wire record; the session controller validates it into a
/// [`crate::domain::RepositorySnapshot`] before anyone gets to see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RepositoryInfo {
    pub path: PathBuf,
    pub branches: Vec<BranchInfo>,
    pub head: String,
    #[serde(default)]
    pub index: Vec<String>,
    #[serde(default, alias = "uncommited")]
    pub uncommitted: Vec<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub is_current: bool,
}

impl BranchInfo {
    pub fn new(name: impl Into<String>, is_current: bool) -> Self {
        Self {
            name: name.into(),
            is_current,
        }
    }
}
