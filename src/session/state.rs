use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::domain::RepositorySnapshot;

/// What an in-flight (or failed) operation was trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Open,
    Clone,
    Refresh,
    UpdateConfig,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Intent::Open => "open",
            Intent::Clone => "clone",
            Intent::Refresh => "refresh",
            Intent::UpdateConfig => "update config",
        };
        f.write_str(label)
    }
}

/// Identity of one admitted operation. Completions carrying any other id are
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub(crate) u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Lifecycle of the currently open repository.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Loading {
        intent: Intent,
        operation: OperationId,
        previous: Option<Arc<RepositorySnapshot>>,
    },
    Open(Arc<RepositorySnapshot>),
    Failed {
        intent: Intent,
        last_snapshot: Option<Arc<RepositorySnapshot>>,
        message: String,
    },
}

impl SessionState {
    /// The snapshot views should display: the open one, or the last good one
    /// while loading or after a failure.
    pub fn snapshot(&self) -> Option<&Arc<RepositorySnapshot>> {
        match self {
            SessionState::Closed => None,
            SessionState::Loading { previous, .. } => previous.as_ref(),
            SessionState::Open(snapshot) => Some(snapshot),
            SessionState::Failed { last_snapshot, .. } => last_snapshot.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading { .. })
    }

    pub fn known_path(&self) -> Option<&Path> {
        self.snapshot().map(|s| s.path())
    }

    pub fn operation(&self) -> Option<OperationId> {
        match self {
            SessionState::Loading { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Closed => write!(f, "closed"),
            SessionState::Loading { intent, operation, .. } => {
                write!(f, "loading ({intent}, {operation})")
            }
            SessionState::Open(snapshot) => write!(f, "open {}", snapshot.path().display()),
            SessionState::Failed {
                intent, message, ..
            } => write!(f, "failed to {intent}: {message}"),
        }
    }
}
