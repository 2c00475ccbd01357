//! Backend command boundary.
//!
//! The desktop shell reaches the version-control engine only through these
//! four asynchronous calls. Each either succeeds with a structured value or
//! fails with an opaque message; no atomicity is assumed across calls.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{BackendError, RepositoryInfo};

pub use local::LocalBackend;
pub use memory::{BackendCall, CallKind, MemoryBackend};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneRequest {
    pub url: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfigRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginRequest {
    pub origin: String,
}

#[async_trait]
pub trait RepositoryBackend: Send + Sync {
    /// Opens the repository at `path` and makes it the backend's current one.
    async fn open_repository(&self, request: OpenRequest) -> Result<RepositoryInfo, BackendError>;

    /// Clones `url` into `destination` and makes the clone current.
    async fn clone_repository(
        &self,
        request: CloneRequest,
    ) -> Result<RepositoryInfo, BackendError>;

    async fn update_user_config(&self, request: UserConfigRequest) -> Result<(), BackendError>;

    async fn update_origin(&self, request: OriginRequest) -> Result<(), BackendError>;
}
