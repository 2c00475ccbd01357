//! On-disk flux repository store.
//!
//! A repository is a work tree with a `.flux` directory holding `HEAD`,
//! `refs/heads/*`, a TOML `config` and a JSON `index`. Only the parts the
//! desktop shell reads or edits are implemented here.

pub mod config;
pub mod index;
pub mod refs;

use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::{BranchInfo, RepositoryInfo, StoreError};
use crate::infra::hash::content_hash;

pub use config::{ConfigField, RepoConfig};
pub use index::Index;
pub use refs::Refs;

pub const STORE_DIR: &str = ".flux";

#[derive(Debug)]
pub struct FluxStore {
    work_tree: PathBuf,
    refs: Refs,
    config: RepoConfig,
    index: Index,
}

impl FluxStore {
    pub fn init(work_tree: &Path) -> Result<Self, StoreError> {
        let work_tree = absolute(work_tree);
        let store_dir = work_tree.join(STORE_DIR);
        if store_dir.exists() {
            return Err(StoreError::AlreadyInitialized(work_tree));
        }
        fs::create_dir_all(&store_dir).map_err(|e| StoreError::write(&store_dir, e))?;

        Ok(Self {
            refs: Refs::init(&store_dir)?,
            config: RepoConfig::init(&store_dir.join("config"))?,
            index: Index::init(&store_dir.join("index"))?,
            work_tree,
        })
    }

    pub fn open(work_tree: &Path) -> Result<Self, StoreError> {
        let work_tree = absolute(work_tree);
        let store_dir = work_tree.join(STORE_DIR);
        if !store_dir.is_dir() {
            return Err(StoreError::NotRepository(work_tree));
        }

        Ok(Self {
            refs: Refs::load(&store_dir)?,
            config: RepoConfig::load(&store_dir.join("config"))?,
            index: Index::load(&store_dir.join("index"))?,
            work_tree,
        })
    }

    /// Copies the store of the repository named by `url` into `destination`
    /// and records `url` as its origin.
    pub fn clone_from(url: &str, destination: &Path) -> Result<Self, StoreError> {
        let source = local_source(url)?;
        let source_store = source.join(STORE_DIR);
        if !source_store.is_dir() {
            return Err(StoreError::NotRepository(source));
        }

        let destination = absolute(destination);
        let target_store = destination.join(STORE_DIR);
        if target_store.exists() {
            return Err(StoreError::AlreadyInitialized(destination));
        }

        let cloned = copy_dir(&source_store, &target_store).and_then(|()| {
            let mut store = Self::open(&destination)?;
            store.config.set(ConfigField::Origin, url)?;
            Ok(store)
        });
        if cloned.is_err()
            && target_store.exists()
            && let Err(e) = fs::remove_dir_all(&target_store)
        {
            log::warn!("Failed to remove partial clone at '{}': {e}", target_store.display());
        }
        cloned
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn set_config(&mut self, field: ConfigField, value: &str) -> Result<(), StoreError> {
        self.config.set(field, value)
    }

    /// Records the current content of a work-tree file in the index.
    pub fn stage(&mut self, rel_path: &str) -> Result<(), StoreError> {
        let full_path = self.work_tree.join(rel_path);
        let escapes = Path::new(rel_path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || !full_path.starts_with(&self.work_tree) {
            return Err(StoreError::OutsideWorkTree(full_path));
        }
        let bytes = fs::read(&full_path).map_err(|e| StoreError::read(&full_path, e))?;
        self.index.add(rel_path.to_string(), content_hash(&bytes))
    }

    pub fn snapshot(&self) -> Result<RepositoryInfo, StoreError> {
        let head = self.refs.head_ref()?;
        let current = self.refs.current_branch()?;
        let branches = self
            .refs
            .branch_names()?
            .into_iter()
            .map(|name| BranchInfo {
                is_current: name == current,
                name,
            })
            .collect();

        Ok(RepositoryInfo {
            path: self.work_tree.clone(),
            branches,
            head,
            index: self.index.paths(),
            uncommitted: self.index.unstaged_changes(&self.work_tree),
            user_name: self.config.get(ConfigField::UserName).map(str::to_string),
            user_email: self.config.get(ConfigField::UserEmail).map(str::to_string),
            origin: self.config.get(ConfigField::Origin).map(str::to_string),
        })
    }
}

fn local_source(url: &str) -> Result<PathBuf, StoreError> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(absolute(Path::new(path)));
    }
    if url.contains("://") {
        return Err(StoreError::UnsupportedTransport(url.to_string()));
    }
    Ok(absolute(Path::new(url)))
}

fn copy_dir(from: &Path, to: &Path) -> Result<(), StoreError> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            StoreError::read(path, std::io::Error::other(e.to_string()))
        })?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| StoreError::OutsideWorkTree(entry.path().to_path_buf()))?;
        let target = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| StoreError::write(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| StoreError::write(&target, e))?;
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_and_snapshot() {
        let dir = tempdir().unwrap();
        let store = FluxStore::init(dir.path()).unwrap();
        store.refs().create_branch("dev").unwrap();

        let info = FluxStore::open(dir.path()).unwrap().snapshot().unwrap();
        assert!(info.path.is_absolute());
        assert_eq!(info.head, "refs/heads/main");
        assert_eq!(
            info.branches,
            vec![BranchInfo::new("dev", false), BranchInfo::new("main", true)]
        );
        assert!(info.index.is_empty());
        assert_eq!(info.user_name, None);
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = tempdir().unwrap();
        FluxStore::init(dir.path()).unwrap();
        assert!(matches!(
            FluxStore::init(dir.path()),
            Err(StoreError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_open_plain_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            FluxStore::open(dir.path()),
            Err(StoreError::NotRepository(_))
        ));
    }

    #[test]
    fn test_stage_and_edit_shows_in_both_lists() {
        let dir = tempdir().unwrap();
        let mut store = FluxStore::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "draft").unwrap();
        store.stage("notes.txt").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "draft v2").unwrap();

        let info = store.snapshot().unwrap();
        assert_eq!(info.index, ["notes.txt"]);
        assert_eq!(info.uncommitted, ["notes.txt"]);
    }

    #[test]
    fn test_stage_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let mut store = FluxStore::init(dir.path()).unwrap();
        assert!(matches!(
            store.stage("../outside.txt"),
            Err(StoreError::OutsideWorkTree(_))
        ));
    }

    #[test]
    fn test_stage_accepts_dotted_names() {
        let dir = tempdir().unwrap();
        let mut store = FluxStore::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("notes..txt"), "draft").unwrap();
        store.stage("notes..txt").unwrap();

        assert_eq!(store.snapshot().unwrap().index, ["notes..txt"]);
        assert!(matches!(
            store.stage("docs/../../outside.txt"),
            Err(StoreError::OutsideWorkTree(_))
        ));
        assert!(matches!(
            store.stage("/etc/hosts"),
            Err(StoreError::OutsideWorkTree(_))
        ));
    }

    #[test]
    fn test_failed_clone_leaves_no_partial_store() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        FluxStore::init(src.path()).unwrap();
        let source_config = src.path().join(STORE_DIR).join("config");
        std::fs::write(&source_config, "user_name = ").unwrap();

        let url = src.path().display().to_string();
        let target = dst.path().join("copy");
        assert!(matches!(
            FluxStore::clone_from(&url, &target),
            Err(StoreError::Parse { .. })
        ));
        assert!(!target.join(STORE_DIR).exists());

        std::fs::write(&source_config, "user_name = \"Ada\"\n").unwrap();
        let cloned = FluxStore::clone_from(&url, &target).unwrap();
        assert_eq!(cloned.snapshot().unwrap().user_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_clone_from_local_path_sets_origin() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let mut source = FluxStore::init(src.path()).unwrap();
        source.set_config(ConfigField::UserName, "Ada").unwrap();
        source.refs().create_branch("dev").unwrap();

        let url = format!("file://{}", src.path().display());
        let target = dst.path().join("copy");
        let cloned = FluxStore::clone_from(&url, &target).unwrap();
        let info = cloned.snapshot().unwrap();

        assert_eq!(info.origin.as_deref(), Some(url.as_str()));
        assert_eq!(info.user_name.as_deref(), Some("Ada"));
        assert_eq!(info.branches.len(), 2);
        assert!(target.join(STORE_DIR).join("HEAD").is_file());
    }

    #[test]
    fn test_clone_rejects_remote_transport() {
        let dst = tempdir().unwrap();
        assert!(matches!(
            FluxStore::clone_from("https://flux.example/ada/repo", dst.path()),
            Err(StoreError::UnsupportedTransport(_))
        ));
    }

    #[test]
    fn test_clone_into_existing_repository_fails() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        FluxStore::init(src.path()).unwrap();
        FluxStore::init(dst.path()).unwrap();

        let url = src.path().display().to_string();
        assert!(matches!(
            FluxStore::clone_from(&url, dst.path()),
            Err(StoreError::AlreadyInitialized(_))
        ));
    }
}
