use std::sync::Arc;

use super::action::{Action, AsyncAction, SessionAction};
use super::command::Command;
use crate::domain::{RepositoryInfo, RepositorySnapshot, SessionError, ValidationError};
use crate::session::state::{Intent, OperationId, SessionState};

/// Session state plus the operation id counter.
#[derive(Debug, Default)]
pub struct SessionStore {
    pub state: SessionState,
    last_operation: u64,
}

impl SessionStore {
    fn begin(&mut self, intent: Intent) -> OperationId {
        self.last_operation += 1;
        let operation = OperationId(self.last_operation);
        let previous = self.state.snapshot().cloned();
        self.state = SessionState::Loading {
            intent,
            operation,
            previous,
        };
        log::info!("Started {intent} ({operation})");
        operation
    }
}

pub fn reduce(store: &mut SessionStore, action: Action) -> Result<Vec<Command>, SessionError> {
    match action {
        Action::Session(action) => reduce_session(store, action).inspect_err(|err| {
            log::debug!("Rejected session operation: {err}");
        }),
        Action::Async(action) => Ok(reduce_async(store, action)),
    }
}

fn reduce_session(
    store: &mut SessionStore,
    action: SessionAction,
) -> Result<Vec<Command>, SessionError> {
    match action {
        SessionAction::Open { selection } => {
            let path = selection.ok_or(SessionError::Cancelled)?;
            ensure_idle(&store.state)?;
            let operation = store.begin(Intent::Open);
            Ok(vec![Command::LoadSnapshot {
                operation,
                path,
                write_error: None,
            }])
        }
        SessionAction::Clone {
            remote_url,
            destination,
        } => {
            let url = remote_url.trim();
            let destination = destination.trim();
            if url.is_empty() {
                return Err(ValidationError::EmptyRemoteUrl.into());
            }
            if destination.is_empty() {
                return Err(ValidationError::EmptyDestination.into());
            }
            ensure_idle(&store.state)?;
            let operation = store.begin(Intent::Clone);
            Ok(vec![Command::CloneRepository {
                operation,
                url: url.to_string(),
                destination: destination.to_string(),
            }])
        }
        SessionAction::Refresh => {
            ensure_idle(&store.state)?;
            let path = store
                .state
                .known_path()
                .ok_or(SessionError::NoRepository)?
                .to_path_buf();
            let operation = store.begin(Intent::Refresh);
            Ok(vec![Command::LoadSnapshot {
                operation,
                path,
                write_error: None,
            }])
        }
        SessionAction::UpdateConfig(update) => {
            ensure_idle(&store.state)?;
            if !matches!(store.state, SessionState::Open(_)) {
                return Err(SessionError::NoRepository);
            }
            let operation = store.begin(Intent::UpdateConfig);
            Ok(vec![Command::WriteConfig { operation, update }])
        }
        SessionAction::Close => {
            ensure_idle(&store.state)?;
            if let Some(snapshot) = store.state.snapshot() {
                log::info!("Closed repository {}", snapshot.path().display());
            }
            store.state = SessionState::Closed;
            Ok(Vec::new())
        }
    }
}

fn ensure_idle(state: &SessionState) -> Result<(), SessionError> {
    if state.is_loading() {
        return Err(SessionError::Busy);
    }
    Ok(())
}

fn reduce_async(store: &mut SessionStore, action: AsyncAction) -> Vec<Command> {
    match action {
        AsyncAction::SnapshotLoaded {
            operation,
            result,
            write_error,
        } => {
            let Some((intent, previous)) = in_flight(&store.state, operation) else {
                return Vec::new();
            };
            store.state = settle(intent, previous, result, write_error);
            match &store.state {
                SessionState::Failed { message, .. } => {
                    log::warn!("Failed to {intent} ({operation}): {message}");
                }
                state => log::info!("Finished {intent} ({operation}): {state}"),
            }
            Vec::new()
        }
        AsyncAction::ConfigWritten { operation, result } => {
            let Some((intent, previous)) = in_flight(&store.state, operation) else {
                return Vec::new();
            };
            // Re-read even when a write failed: the first one may have landed.
            let Some(path) = previous.as_ref().map(|s| s.path().to_path_buf()) else {
                store.state = SessionState::Failed {
                    intent,
                    last_snapshot: None,
                    message: SessionError::NoRepository.to_string(),
                };
                return Vec::new();
            };
            vec![Command::LoadSnapshot {
                operation,
                path,
                write_error: result.err(),
            }]
        }
    }
}

/// Intent and previous snapshot of the operation in flight, if it is `operation`.
fn in_flight(
    state: &SessionState,
    operation: OperationId,
) -> Option<(Intent, Option<Arc<RepositorySnapshot>>)> {
    match state {
        SessionState::Loading {
            intent,
            operation: current,
            previous,
        } if *current == operation => Some((*intent, previous.clone())),
        _ => {
            log::debug!("Discarding stale completion of {operation}");
            None
        }
    }
}

fn settle(
    intent: Intent,
    previous: Option<Arc<RepositorySnapshot>>,
    result: Result<RepositoryInfo, String>,
    write_error: Option<String>,
) -> SessionState {
    let loaded = result.and_then(|info| {
        RepositorySnapshot::from_info(info).map_err(|e| format!("Malformed repository data: {e}"))
    });
    match (loaded, write_error) {
        (Ok(snapshot), None) => SessionState::Open(Arc::new(snapshot)),
        (Ok(snapshot), Some(message)) => SessionState::Failed {
            intent,
            last_snapshot: Some(Arc::new(snapshot)),
            message,
        },
        (Err(message), write_error) => SessionState::Failed {
            intent,
            last_snapshot: previous,
            message: write_error.unwrap_or(message),
        },
    }
}
