use std::sync::Arc;

use tokio::sync::mpsc;

use super::action::{Action, AsyncAction};
use super::command::Command;
use crate::domain::BackendError;
use crate::infra::backend::{
    CloneRequest, OpenRequest, OriginRequest, RepositoryBackend, UserConfigRequest,
};

/// Spawns the backend work for `command`; the completion comes back on
/// `action_tx`.
pub fn run(
    backend: &Arc<dyn RepositoryBackend>,
    action_tx: &mpsc::Sender<Action>,
    command: Command,
) {
    let backend = backend.clone();
    let action_tx = action_tx.clone();

    tokio::spawn(async move {
        let action = match command {
            Command::LoadSnapshot {
                operation,
                path,
                write_error,
            } => {
                let request = OpenRequest {
                    path: path.display().to_string(),
                };
                let call = async move { backend.open_repository(request).await };
                let result = contained(call).await;
                AsyncAction::SnapshotLoaded {
                    operation,
                    result,
                    write_error,
                }
            }
            Command::CloneRepository {
                operation,
                url,
                destination,
            } => {
                let request = CloneRequest { url, destination };
                let call = async move { backend.clone_repository(request).await };
                let result = contained(call).await;
                AsyncAction::SnapshotLoaded {
                    operation,
                    result,
                    write_error: None,
                }
            }
            Command::WriteConfig { operation, update } => {
                let result = contained(async move {
                    backend
                        .update_user_config(UserConfigRequest {
                            name: update.user_name,
                            email: update.user_email,
                        })
                        .await?;
                    backend
                        .update_origin(OriginRequest {
                            origin: update.origin,
                        })
                        .await
                })
                .await;
                AsyncAction::ConfigWritten { operation, result }
            }
        };

        if action_tx.send(Action::Async(action)).await.is_err() {
            log::debug!("Session controller dropped before backend call finished");
        }
    });
}

/// Runs a backend call on its own task. A panic inside the backend still
/// produces a failed completion.
async fn contained<T, F>(call: F) -> Result<T, String>
where
    T: Send + 'static,
    F: Future<Output = Result<T, BackendError>> + Send + 'static,
{
    match tokio::spawn(call).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => {
            log::error!("Backend task failed: {e}");
            Err(format!("Backend task failed: {e}"))
        }
    }
}
