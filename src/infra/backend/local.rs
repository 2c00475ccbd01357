use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CloneRequest, OpenRequest, OriginRequest, RepositoryBackend, UserConfigRequest};
use crate::domain::{BackendError, RepositoryInfo};
use crate::infra::store::{ConfigField, FluxStore};

/// Backend over the on-disk flux store.
///
/// Remembers the repository opened last; configuration writes apply to it.
#[derive(Default, Clone)]
pub struct LocalBackend {
    current: Arc<Mutex<Option<FluxStore>>>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&Mutex<Option<FluxStore>>) -> anyhow::Result<T> + Send + 'static,
    {
        let current = self.current.clone();
        tokio::task::spawn_blocking(move || f(current.as_ref()))
            .await
            .map_err(|e| BackendError::new(format!("Backend task failed: {e}")))?
            .map_err(BackendError::from)
    }
}

#[async_trait]
impl RepositoryBackend for LocalBackend {
    async fn open_repository(&self, request: OpenRequest) -> Result<RepositoryInfo, BackendError> {
        self.blocking(move |current| {
            let store = FluxStore::open(&PathBuf::from(&request.path))?;
            let info = store.snapshot()?;
            *current.lock() = Some(store);
            Ok(info)
        })
        .await
    }

    async fn clone_repository(
        &self,
        request: CloneRequest,
    ) -> Result<RepositoryInfo, BackendError> {
        self.blocking(move |current| {
            let store = FluxStore::clone_from(&request.url, &PathBuf::from(&request.destination))
                .with_context(|| format!("Failed to clone '{}'", request.url))?;
            let info = store.snapshot()?;
            *current.lock() = Some(store);
            Ok(info)
        })
        .await
    }

    async fn update_user_config(&self, request: UserConfigRequest) -> Result<(), BackendError> {
        self.blocking(move |current| {
            let mut guard = current.lock();
            let store = guard.as_mut().context("No repository open")?;
            store.set_config(ConfigField::UserName, &request.name)?;
            store.set_config(ConfigField::UserEmail, &request.email)?;
            Ok(())
        })
        .await
    }

    async fn update_origin(&self, request: OriginRequest) -> Result<(), BackendError> {
        self.blocking(move |current| {
            let mut guard = current.lock();
            let store = guard.as_mut().context("No repository open")?;
            store.set_config(ConfigField::Origin, &request.origin)?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_request(path: &std::path::Path) -> OpenRequest {
        OpenRequest {
            path: path.display().to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_reports_store_contents() {
        let dir = tempdir().unwrap();
        FluxStore::init(dir.path()).unwrap();

        let backend = LocalBackend::new();
        let info = backend.open_repository(open_request(dir.path())).await.unwrap();
        assert_eq!(info.head, "refs/heads/main");
        assert_eq!(info.branches.len(), 1);
    }

    #[tokio::test]
    async fn test_open_non_repository_fails_with_message() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new();
        let err = backend
            .open_repository(open_request(dir.path()))
            .await
            .unwrap_err();
        assert!(err.message().contains("Repository not initialized"));
    }

    #[tokio::test]
    async fn test_config_writes_need_open_repository() {
        let backend = LocalBackend::new();
        let err = backend
            .update_origin(OriginRequest {
                origin: "file:///srv/flux".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "No repository open");
    }

    #[tokio::test]
    async fn test_config_writes_visible_on_reopen() {
        let dir = tempdir().unwrap();
        FluxStore::init(dir.path()).unwrap();
        let backend = LocalBackend::new();
        backend.open_repository(open_request(dir.path())).await.unwrap();

        backend
            .update_user_config(UserConfigRequest {
                name: "Ada".into(),
                email: "ada@example.com".into(),
            })
            .await
            .unwrap();
        backend
            .update_origin(OriginRequest {
                origin: "file:///srv/flux".into(),
            })
            .await
            .unwrap();

        let info = backend.open_repository(open_request(dir.path())).await.unwrap();
        assert_eq!(info.user_name.as_deref(), Some("Ada"));
        assert_eq!(info.user_email.as_deref(), Some("ada@example.com"));
        assert_eq!(info.origin.as_deref(), Some("file:///srv/flux"));
    }

    #[tokio::test]
    async fn test_clone_failure_carries_context() {
        let dst = tempdir().unwrap();
        let backend = LocalBackend::new();
        let err = backend
            .clone_repository(CloneRequest {
                url: "https://flux.example/ada/repo".into(),
                destination: dst.path().display().to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.message().starts_with("Failed to clone 'https://flux.example/ada/repo'"));
        assert!(err.message().contains("Unsupported transport"));
    }
}
