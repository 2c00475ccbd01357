//! Domain error types for the flux desktop shell.
//!
//! Session errors are returned synchronously when an operation is not
//! admitted. Backend and snapshot errors never reach callers directly: the
//! session controller turns them into a `Failed` state carrying the message.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a session operation was not admitted. None of these change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Another repository operation is already in progress")]
    Busy,

    #[error("Repository selection was cancelled")]
    Cancelled,

    #[error("No repository open")]
    NoRepository,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Input rejected before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Remote URL is required")]
    EmptyRemoteUrl,

    #[error("Destination folder is required")]
    EmptyDestination,
}

/// A backend record that cannot become a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Repository path must be absolute: '{}'", .0.display())]
    RelativePath(PathBuf),

    #[error("Branch '{0}' is listed more than once")]
    DuplicateBranch(String),

    #[error("No current branch among {0} branches")]
    NoCurrentBranch(usize),

    #[error("Both '{first}' and '{second}' are marked as the current branch")]
    MultipleCurrentBranches { first: String, second: String },

    #[error("Path '{path}' is listed more than once in the {area}")]
    DuplicatePath { area: &'static str, path: String },
}

/// Opaque failure reported by the backend command boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<anyhow::Error> for BackendError {
    fn from(err: anyhow::Error) -> Self {
        // Keep the whole context chain, the UI shows this verbatim.
        Self(format!("{err:#}"))
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        Self(err.to_string())
    }
}

/// Failures of the on-disk repository store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read '{}'. {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{}'. {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing required path '{}'", .0.display())]
    Missing(PathBuf),

    #[error("Repository not initialized at: '{}'", .0.display())]
    NotRepository(PathBuf),

    #[error("Repository already initialized at '{}'", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("Invalid head format: {0}")]
    InvalidHead(String),

    #[error("The field {0} is unsupported by the configuration")]
    UnsupportedField(String),

    #[error("Failed to parse '{}'. {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Path '{}' is outside of the working directory", .0.display())]
    OutsideWorkTree(PathBuf),

    #[error("Unsupported transport for '{0}', only local paths and file:// URLs can be cloned")]
    UnsupportedTransport(String),
}

impl StoreError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Write {
            path: path.into(),
            source,
        }
    }
}
