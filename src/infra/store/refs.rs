use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::StoreError;

const HEADS_PREFIX: &str = "refs/heads/";

/// Branch references of a flux store (`HEAD` plus `refs/heads/*`).
#[derive(Debug)]
pub struct Refs {
    heads_path: PathBuf,
    head_path: PathBuf,
}

impl Refs {
    /// Creates `refs/heads/main` and points `HEAD` at it.
    pub fn init(store_dir: &Path) -> Result<Self, StoreError> {
        let refs = Self::at(store_dir);
        fs::create_dir_all(&refs.heads_path)
            .map_err(|e| StoreError::write(&refs.heads_path, e))?;

        let main_path = refs.heads_path.join("main");
        fs::write(&main_path, "").map_err(|e| StoreError::write(&main_path, e))?;
        refs.set_head("main")?;
        Ok(refs)
    }

    pub fn load(store_dir: &Path) -> Result<Self, StoreError> {
        let refs = Self::at(store_dir);
        if !refs.heads_path.is_dir() {
            return Err(StoreError::Missing(refs.heads_path));
        }
        Ok(refs)
    }

    fn at(store_dir: &Path) -> Self {
        Self {
            heads_path: store_dir.join("refs").join("heads"),
            head_path: store_dir.join("HEAD"),
        }
    }

    /// Symbolic ref `HEAD` points to, e.g. `refs/heads/main`.
    pub fn head_ref(&self) -> Result<String, StoreError> {
        let raw = fs::read_to_string(&self.head_path)
            .map_err(|e| StoreError::read(&self.head_path, e))?;
        parse_head_ref(&raw)
    }

    pub fn current_branch(&self) -> Result<String, StoreError> {
        let head_ref = self.head_ref()?;
        head_ref
            .strip_prefix(HEADS_PREFIX)
            .map(str::to_string)
            .ok_or_else(|| StoreError::InvalidHead(head_ref.clone()))
    }

    /// Branch names sorted alphabetically.
    pub fn branch_names(&self) -> Result<Vec<String>, StoreError> {
        let entries =
            fs::read_dir(&self.heads_path).map_err(|e| StoreError::read(&self.heads_path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::read(&self.heads_path, e))?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn create_branch(&self, name: &str) -> Result<(), StoreError> {
        let path = self.heads_path.join(name);
        let start = self.head_commit()?;
        fs::write(&path, start).map_err(|e| StoreError::write(&path, e))
    }

    pub fn set_head(&self, branch: &str) -> Result<(), StoreError> {
        fs::write(&self.head_path, format!("ref: {HEADS_PREFIX}{branch}\n"))
            .map_err(|e| StoreError::write(&self.head_path, e))
    }

    fn head_commit(&self) -> Result<String, StoreError> {
        let branch_path = self.heads_path.join(self.current_branch()?);
        let commit =
            fs::read_to_string(&branch_path).map_err(|e| StoreError::read(&branch_path, e))?;
        Ok(commit.trim().to_string())
    }
}

fn parse_head_ref(contents: &str) -> Result<String, StoreError> {
    let trimmed = contents.trim();
    let head_ref = trimmed
        .strip_prefix("ref: ")
        .ok_or_else(|| StoreError::InvalidHead(trimmed.to_string()))?;

    if !head_ref.starts_with(HEADS_PREFIX) {
        return Err(StoreError::InvalidHead(head_ref.to_string()));
    }
    Ok(head_ref.to_string())
}
