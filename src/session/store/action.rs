use std::path::PathBuf;

use crate::domain::{ConfigUpdate, RepositoryInfo};
use crate::session::state::OperationId;

#[derive(Debug)]
pub enum Action {
    Session(SessionAction),
    Async(AsyncAction),
}

/// User-initiated operations.
#[derive(Debug)]
pub enum SessionAction {
    /// `None` means the picker was dismissed.
    Open { selection: Option<PathBuf> },
    Clone {
        remote_url: String,
        destination: String,
    },
    Refresh,
    UpdateConfig(ConfigUpdate),
    Close,
}

/// Completions reported by backend tasks.
#[derive(Debug)]
pub enum AsyncAction {
    SnapshotLoaded {
        operation: OperationId,
        result: Result<RepositoryInfo, String>,
        /// Failure of the config writes that preceded this re-read.
        write_error: Option<String>,
    },
    ConfigWritten {
        operation: OperationId,
        result: Result<(), String>,
    },
}
