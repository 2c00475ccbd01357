//! In-memory backend with scripted failures and an in-flight gate.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::{CloneRequest, OpenRequest, OriginRequest, RepositoryBackend, UserConfigRequest};
use crate::domain::{BackendError, BranchInfo, RepositoryInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Open,
    Clone,
    UserConfig,
    Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Open { path: String },
    Clone { url: String, destination: String },
    UpdateUserConfig { name: String, email: String },
    UpdateOrigin { origin: String },
}

impl BackendCall {
    pub fn kind(&self) -> CallKind {
        match self {
            BackendCall::Open { .. } => CallKind::Open,
            BackendCall::Clone { .. } => CallKind::Clone,
            BackendCall::UpdateUserConfig { .. } => CallKind::UserConfig,
            BackendCall::UpdateOrigin { .. } => CallKind::Origin,
        }
    }
}

#[derive(Default)]
struct Inner {
    repositories: HashMap<PathBuf, RepositoryInfo>,
    remotes: HashMap<String, RepositoryInfo>,
    current: Option<PathBuf>,
    failures: HashMap<CallKind, VecDeque<String>>,
    calls: Vec<BackendCall>,
}

/// Backend keeping repositories in memory.
///
/// Calls are recorded before they suspend. While the gate is held every call
/// waits for one [`MemoryBackend::release`] before completing.
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    held: AtomicBool,
    permits: Semaphore,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            held: AtomicBool::new(false),
            permits: Semaphore::new(0),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(self, info: RepositoryInfo) -> Self {
        self.inner
            .lock()
            .repositories
            .insert(info.path.clone(), info);
        self
    }

    pub fn with_remote(self, url: impl Into<String>, info: RepositoryInfo) -> Self {
        self.inner.lock().remotes.insert(url.into(), info);
        self
    }

    /// Replaces the branch list the next open of `path` will report.
    pub fn set_branches(&self, path: impl Into<PathBuf>, branches: Vec<BranchInfo>) {
        if let Some(info) = self.inner.lock().repositories.get_mut(&path.into()) {
            info.branches = branches;
        }
    }

    pub fn repository(&self, path: impl Into<PathBuf>) -> Option<RepositoryInfo> {
        self.inner.lock().repositories.get(&path.into()).cloned()
    }

    /// Makes the next call of `kind` fail with `message`.
    pub fn fail_next(&self, kind: CallKind, message: impl Into<String>) {
        self.inner
            .lock()
            .failures
            .entry(kind)
            .or_default()
            .push_back(message.into());
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }

    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Lets one held call complete.
    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    /// Waits until at least `count` calls were recorded; false on timeout.
    pub async fn wait_for_calls(&self, count: usize) -> bool {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.inner.lock().calls.len() < count {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .is_ok()
    }

    async fn enter(&self, call: BackendCall) -> Result<(), BackendError> {
        let kind = call.kind();
        self.inner.lock().calls.push(call);

        if self.held.load(Ordering::SeqCst) {
            let permit = self
                .permits
                .acquire()
                .await
                .map_err(|e| BackendError::new(e.to_string()))?;
            permit.forget();
        }

        let failure = self
            .inner
            .lock()
            .failures
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(message) => Err(BackendError::new(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RepositoryBackend for MemoryBackend {
    async fn open_repository(&self, request: OpenRequest) -> Result<RepositoryInfo, BackendError> {
        self.enter(BackendCall::Open {
            path: request.path.clone(),
        })
        .await?;

        let path = PathBuf::from(&request.path);
        let mut inner = self.inner.lock();
        let info = inner.repositories.get(&path).cloned().ok_or_else(|| {
            BackendError::new(format!("Repository not initialized at: '{}'", request.path))
        })?;
        inner.current = Some(path);
        Ok(info)
    }

    async fn clone_repository(
        &self,
        request: CloneRequest,
    ) -> Result<RepositoryInfo, BackendError> {
        self.enter(BackendCall::Clone {
            url: request.url.clone(),
            destination: request.destination.clone(),
        })
        .await?;

        let destination = PathBuf::from(&request.destination);
        let mut inner = self.inner.lock();
        if inner.repositories.contains_key(&destination) {
            return Err(BackendError::new(format!(
                "Repository already initialized at '{}'",
                request.destination
            )));
        }
        let remote = inner
            .remotes
            .get(&request.url)
            .cloned()
            .ok_or_else(|| BackendError::new(format!("Remote '{}' not found", request.url)))?;

        let info = RepositoryInfo {
            path: destination.clone(),
            origin: Some(request.url),
            ..remote
        };
        inner.repositories.insert(destination.clone(), info.clone());
        inner.current = Some(destination);
        Ok(info)
    }

    async fn update_user_config(&self, request: UserConfigRequest) -> Result<(), BackendError> {
        self.enter(BackendCall::UpdateUserConfig {
            name: request.name.clone(),
            email: request.email.clone(),
        })
        .await?;

        let mut inner = self.inner.lock();
        let info = current_repository(&mut inner)?;
        info.user_name = Some(request.name);
        info.user_email = Some(request.email);
        Ok(())
    }

    async fn update_origin(&self, request: OriginRequest) -> Result<(), BackendError> {
        self.enter(BackendCall::UpdateOrigin {
            origin: request.origin.clone(),
        })
        .await?;

        let mut inner = self.inner.lock();
        let info = current_repository(&mut inner)?;
        info.origin = Some(request.origin);
        Ok(())
    }
}

fn current_repository(inner: &mut Inner) -> Result<&mut RepositoryInfo, BackendError> {
    let path = inner
        .current
        .clone()
        .ok_or_else(|| BackendError::new("No repository open"))?;
    inner
        .repositories
        .get_mut(&path)
        .ok_or_else(|| BackendError::new("No repository open"))
}
