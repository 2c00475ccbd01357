use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::StoreError;
use crate::infra::hash::content_hash;

/// Staging area: relative path -> content hash at the time it was staged.
#[derive(Debug)]
pub struct Index {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl Index {
    pub fn init(path: &Path) -> Result<Self, StoreError> {
        let index = Self {
            path: path.to_path_buf(),
            entries: BTreeMap::new(),
        };
        index.save()?;
        Ok(index)
    }

    /// A missing index file is an empty index.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                entries: BTreeMap::new(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|e| StoreError::read(path, e))?;
        let entries = if contents.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn add(&mut self, rel_path: String, hash: String) -> Result<(), StoreError> {
        self.entries.insert(rel_path, hash);
        self.save()
    }

    /// Staged paths in sorted order.
    pub fn paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Staged paths whose working copy is gone or differs from what was staged.
    pub fn unstaged_changes(&self, work_tree: &Path) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(rel, staged_hash)| match fs::read(work_tree.join(rel)) {
                Ok(bytes) => &content_hash(&bytes) != *staged_hash,
                Err(_) => true,
            })
            .map(|(rel, _)| rel.clone())
            .collect()
    }

    fn save(&self) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            StoreError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;
        fs::write(&self.path, contents).map_err(|e| StoreError::write(&self.path, e))
    }
}
