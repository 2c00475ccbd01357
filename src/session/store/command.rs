use std::path::PathBuf;

use crate::domain::ConfigUpdate;
use crate::session::state::OperationId;

/// Backend work requested by the reducer. Each command reports back with an
/// [`super::AsyncAction`] tagged with its operation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadSnapshot {
        operation: OperationId,
        path: PathBuf,
        write_error: Option<String>,
    },
    CloneRepository {
        operation: OperationId,
        url: String,
        destination: String,
    },
    WriteConfig {
        operation: OperationId,
        update: ConfigUpdate,
    },
}
