//! Repository snapshot domain types.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::error::SnapshotError;
use super::repo::RepositoryInfo;

/// A branch as shown to views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    pub is_current: bool,
}

/// Immutable point-in-time description of the open repository.
///
/// Only the session controller builds snapshots, from a successful backend
/// response. Whenever `branches` is non-empty exactly one of them is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySnapshot {
    path: PathBuf,
    branches: Vec<Branch>,
    head: String,
    index: Vec<String>,
    uncommitted: Vec<String>,
    user_name: Option<String>,
    user_email: Option<String>,
    origin: Option<String>,
}

impl RepositorySnapshot {
    pub(crate) fn from_info(info: RepositoryInfo) -> Result<Self, SnapshotError> {
        if !info.path.is_absolute() {
            return Err(SnapshotError::RelativePath(info.path));
        }

        let mut seen = HashSet::new();
        let mut current: Option<&str> = None;
        for branch in &info.branches {
            if !seen.insert(branch.name.as_str()) {
                return Err(SnapshotError::DuplicateBranch(branch.name.clone()));
            }
            if branch.is_current {
                if let Some(first) = current {
                    return Err(SnapshotError::MultipleCurrentBranches {
                        first: first.to_string(),
                        second: branch.name.clone(),
                    });
                }
                current = Some(branch.name.as_str());
            }
        }
        if !info.branches.is_empty() && current.is_none() {
            return Err(SnapshotError::NoCurrentBranch(info.branches.len()));
        }

        ensure_unique_paths("index", &info.index)?;
        ensure_unique_paths("uncommitted changes", &info.uncommitted)?;

        Ok(Self {
            path: info.path,
            branches: info
                .branches
                .into_iter()
                .map(|b| Branch {
                    name: b.name,
                    is_current: b.is_current,
                })
                .collect(),
            head: info.head,
            index: info.index,
            uncommitted: info.uncommitted,
            user_name: non_empty(info.user_name),
            user_email: non_empty(info.user_email),
            origin: non_empty(info.origin),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn current_branch(&self) -> Option<&Branch> {
        self.branches.iter().find(|b| b.is_current)
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn uncommitted(&self) -> &[String] {
        &self.uncommitted
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Display name of the repository (last path component).
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn ensure_unique_paths(area: &'static str, paths: &[String]) -> Result<(), SnapshotError> {
    let mut seen = HashSet::new();
    for path in paths {
        if !seen.insert(path.as_str()) {
            return Err(SnapshotError::DuplicatePath {
                area,
                path: path.clone(),
            });
        }
    }
    Ok(())
}

// An empty string in the config file means "unset".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BranchInfo;

    fn info(branches: Vec<BranchInfo>) -> RepositoryInfo {
        RepositoryInfo {
            path: PathBuf::from("/work/flux"),
            branches,
            head: "refs/heads/main".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_info_keeps_branch_order_and_current() {
        let snapshot = RepositorySnapshot::from_info(info(vec![
            BranchInfo::new("main", true),
            BranchInfo::new("dev", false),
        ]))
        .unwrap();

        let names: Vec<_> = snapshot.branches().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["main", "dev"]);
        assert_eq!(snapshot.current_branch().unwrap().name, "main");
        assert_eq!(snapshot.name(), "flux");
    }

    #[test]
    fn test_from_info_allows_empty_branch_list() {
        let snapshot = RepositorySnapshot::from_info(info(vec![])).unwrap();
        assert!(snapshot.branches().is_empty());
        assert!(snapshot.current_branch().is_none());
    }

    #[test]
    fn test_from_info_rejects_missing_current_branch() {
        let err = RepositorySnapshot::from_info(info(vec![
            BranchInfo::new("main", false),
            BranchInfo::new("dev", false),
        ]))
        .unwrap_err();
        assert_eq!(err, SnapshotError::NoCurrentBranch(2));
    }

    #[test]
    fn test_from_info_rejects_two_current_branches() {
        let err = RepositorySnapshot::from_info(info(vec![
            BranchInfo::new("main", true),
            BranchInfo::new("dev", true),
        ]))
        .unwrap_err();
        assert!(matches!(err, SnapshotError::MultipleCurrentBranches { .. }));
    }

    #[test]
    fn test_from_info_rejects_duplicate_branch_names() {
        let err = RepositorySnapshot::from_info(info(vec![
            BranchInfo::new("main", true),
            BranchInfo::new("main", false),
        ]))
        .unwrap_err();
        assert_eq!(err, SnapshotError::DuplicateBranch("main".into()));
    }

    #[test]
    fn test_from_info_path_may_be_both_staged_and_unstaged() {
        let mut record = info(vec![BranchInfo::new("main", true)]);
        record.index = vec!["src/lib.rs".into()];
        record.uncommitted = vec!["src/lib.rs".into()];
        assert!(RepositorySnapshot::from_info(record).is_ok());
    }

    #[test]
    fn test_from_info_rejects_duplicate_index_paths() {
        let mut record = info(vec![BranchInfo::new("main", true)]);
        record.index = vec!["a.txt".into(), "a.txt".into()];
        assert!(matches!(
            RepositorySnapshot::from_info(record),
            Err(SnapshotError::DuplicatePath { area: "index", .. })
        ));
    }

    #[test]
    fn test_from_info_rejects_relative_path() {
        let mut record = info(vec![]);
        record.path = PathBuf::from("relative/repo");
        assert!(matches!(
            RepositorySnapshot::from_info(record),
            Err(SnapshotError::RelativePath(_))
        ));
    }

    #[test]
    fn test_blank_config_values_are_unset() {
        let mut record = info(vec![]);
        record.user_name = Some("  ".into());
        record.origin = Some("https://flux.example/repo".into());
        let snapshot = RepositorySnapshot::from_info(record).unwrap();
        assert_eq!(snapshot.user_name(), None);
        assert_eq!(snapshot.origin(), Some("https://flux.example/repo"));
    }
}
