//! Repository session controller.
//!
//! Owns the single notion of "the currently open repository". Operations are
//! admitted synchronously; backend work runs on spawned tasks whose
//! completions are applied when the owner drains them (`poll`,
//! `next_transition` or `settle`).

pub mod state;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::domain::{ConfigUpdate, SessionError};
use crate::infra::backend::RepositoryBackend;

pub use state::{Intent, OperationId, SessionState};
use store::{Action, SessionAction, SessionStore};

const ACTION_CHANNEL_SIZE: usize = 16;
const EVENT_CHANNEL_SIZE: usize = 64;

pub struct SessionController {
    store: SessionStore,
    backend: Arc<dyn RepositoryBackend>,
    action_tx: mpsc::Sender<Action>,
    action_rx: mpsc::Receiver<Action>,
    events: broadcast::Sender<SessionState>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn RepositoryBackend>) -> Self {
        let (action_tx, action_rx) = mpsc::channel(ACTION_CHANNEL_SIZE);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            store: SessionStore::default(),
            backend,
            action_tx,
            action_rx,
            events,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.store.state
    }

    /// Every state change is published once, in the order it was applied.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.events.subscribe()
    }

    /// Opens the repository picked by the user. `None` means the picker was
    /// dismissed.
    pub fn open(&mut self, selection: Option<PathBuf>) -> Result<OperationId, SessionError> {
        self.admit(SessionAction::Open { selection })
    }

    pub fn clone_repository(
        &mut self,
        remote_url: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<OperationId, SessionError> {
        self.admit(SessionAction::Clone {
            remote_url: remote_url.into(),
            destination: destination.into(),
        })
    }

    pub fn refresh(&mut self) -> Result<OperationId, SessionError> {
        self.admit(SessionAction::Refresh)
    }

    /// Writes user name, email and origin, then re-reads the repository.
    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<OperationId, SessionError> {
        self.admit(SessionAction::UpdateConfig(update))
    }

    /// Forgets the open repository. Refused while an operation is in flight.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.try_dispatch(Action::Session(SessionAction::Close))
    }

    /// Applies every completion that already arrived. Returns true if any did.
    pub fn poll(&mut self) -> bool {
        let mut any = false;
        while let Ok(action) = self.action_rx.try_recv() {
            self.dispatch(action);
            any = true;
        }
        any
    }

    /// Waits for the in-flight operation to change the state and returns the
    /// new state. Returns `None` when nothing is in flight.
    pub async fn next_transition(&mut self) -> Option<SessionState> {
        let before = self.store.state.clone();
        while self.store.state.is_loading() {
            let action = self.action_rx.recv().await?;
            self.dispatch(action);
            if self.store.state != before {
                return Some(self.store.state.clone());
            }
        }
        None
    }

    /// Waits until no operation is in flight.
    pub async fn settle(&mut self) -> &SessionState {
        while self.next_transition().await.is_some() {}
        &self.store.state
    }

    fn admit(&mut self, action: SessionAction) -> Result<OperationId, SessionError> {
        self.try_dispatch(Action::Session(action))?;
        self.store.state.operation().ok_or(SessionError::NoRepository)
    }

    fn dispatch(&mut self, action: Action) {
        if let Err(err) = self.try_dispatch(action) {
            log::debug!("Ignored action: {err}");
        }
    }

    fn try_dispatch(&mut self, action: Action) -> Result<(), SessionError> {
        let before = self.store.state.clone();
        let commands = store::reduce(&mut self.store, action)?;
        if self.store.state != before {
            // No receivers is fine, views subscribe lazily.
            let _ = self.events.send(self.store.state.clone());
        }
        for command in commands {
            store::run(&self.backend, &self.action_tx, command);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::{BackendError, BranchInfo, RepositoryInfo, ValidationError};
    use crate::infra::backend::{
        BackendCall, CallKind, CloneRequest, MemoryBackend, OpenRequest, OriginRequest,
        UserConfigRequest,
    };

    const REPO: &str = "/work/flux";

    fn repo_info(branches: &[(&str, bool)]) -> RepositoryInfo {
        RepositoryInfo {
            path: PathBuf::from(REPO),
            branches: branches
                .iter()
                .map(|(name, current)| BranchInfo::new(*name, *current))
                .collect(),
            head: "refs/heads/main".into(),
            ..Default::default()
        }
    }

    fn controller(backend: &Arc<MemoryBackend>) -> SessionController {
        SessionController::new(backend.clone())
    }

    #[tokio::test]
    async fn test_open_success_publishes_loading_then_open() {
        let backend = Arc::new(MemoryBackend::new().with_repository(repo_info(&[("main", true)])));
        let mut session = controller(&backend);
        let mut events = session.subscribe();

        session.open(Some(PathBuf::from(REPO))).unwrap();
        let state = session.settle().await.clone();

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionState::Loading {
                intent: Intent::Open,
                ..
            }
        ));
        assert_eq!(events.recv().await.unwrap(), state);
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.current_branch().unwrap().name, "main");
    }

    #[tokio::test]
    async fn test_single_flight_rejects_second_call() {
        let backend = Arc::new(MemoryBackend::new().with_repository(repo_info(&[("main", true)])));
        backend.hold();
        let mut session = controller(&backend);

        session.open(Some(PathBuf::from(REPO))).unwrap();
        let loading = session.state().clone();

        assert_eq!(session.refresh(), Err(SessionError::Busy));
        assert_eq!(
            session.clone_repository("file:///srv/a", "/work/b"),
            Err(SessionError::Busy)
        );
        assert_eq!(session.state(), &loading);

        assert!(backend.wait_for_calls(1).await);
        backend.release();
        session.settle().await;
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_clone_input_makes_no_backend_call() {
        let backend = Arc::new(MemoryBackend::new());
        let mut session = controller(&backend);
        let mut events = session.subscribe();

        assert_eq!(
            session.clone_repository("", "/work/b"),
            Err(SessionError::Validation(ValidationError::EmptyRemoteUrl))
        );
        assert_eq!(
            session.clone_repository("file:///srv/a", "  "),
            Err(SessionError::Validation(ValidationError::EmptyDestination))
        );

        tokio::task::yield_now().await;
        assert!(!session.poll());
        assert_eq!(session.state(), &SessionState::Closed);
        assert!(events.try_recv().is_err());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_then_success() {
        let backend = Arc::new(MemoryBackend::new().with_repository(repo_info(&[("main", true)])));
        let mut session = controller(&backend);
        session.open(Some(PathBuf::from(REPO))).unwrap();
        let first = session.settle().await.snapshot().cloned().unwrap();

        backend.fail_next(CallKind::Open, "index locked");
        session.refresh().unwrap();
        let failed = session.settle().await.clone();
        assert_eq!(
            failed,
            SessionState::Failed {
                intent: Intent::Refresh,
                last_snapshot: Some(first.clone()),
                message: "index locked".into(),
            }
        );

        backend.set_branches(
            REPO,
            vec![BranchInfo::new("dev", true), BranchInfo::new("main", false)],
        );
        session.refresh().unwrap();
        let SessionState::Open(second) = session.settle().await.clone() else {
            panic!("expected Open");
        };
        assert_ne!(second, first);
        assert_eq!(second.current_branch().unwrap().name, "dev");
    }

    #[tokio::test]
    async fn test_update_config_issues_writes_then_reread() {
        let backend = Arc::new(MemoryBackend::new().with_repository(repo_info(&[("main", true)])));
        let mut session = controller(&backend);
        session.open(Some(PathBuf::from(REPO))).unwrap();
        session.settle().await;

        session
            .update_config(ConfigUpdate::new("Ada", "ada@example.com", "file:///srv/flux"))
            .unwrap();
        let SessionState::Open(snapshot) = session.settle().await.clone() else {
            panic!("expected Open");
        };

        assert_eq!(snapshot.user_name(), Some("Ada"));
        assert_eq!(snapshot.origin(), Some("file:///srv/flux"));
        let kinds: Vec<_> = backend.calls().iter().map(BackendCall::kind).collect();
        assert_eq!(
            kinds,
            [CallKind::Open, CallKind::UserConfig, CallKind::Origin, CallKind::Open]
        );
    }

    #[tokio::test]
    async fn test_update_config_stops_at_first_failed_write() {
        let backend = Arc::new(MemoryBackend::new().with_repository(repo_info(&[("main", true)])));
        let mut session = controller(&backend);
        session.open(Some(PathBuf::from(REPO))).unwrap();
        session.settle().await;

        backend.fail_next(CallKind::UserConfig, "config is read-only");
        session
            .update_config(ConfigUpdate::new("Ada", "ada@example.com", "file:///srv/flux"))
            .unwrap();
        let state = session.settle().await.clone();

        assert_eq!(state.error_message(), Some("config is read-only"));
        assert!(state.snapshot().is_some());
        let kinds: Vec<_> = backend.calls().iter().map(BackendCall::kind).collect();
        assert_eq!(kinds, [CallKind::Open, CallKind::UserConfig, CallKind::Open]);
    }

    /// Backend whose open call panics mid-flight.
    struct PanickingBackend;

    #[async_trait::async_trait]
    impl RepositoryBackend for PanickingBackend {
        async fn open_repository(
            &self,
            _request: OpenRequest,
        ) -> Result<RepositoryInfo, BackendError> {
            panic!("index corrupted")
        }

        async fn clone_repository(
            &self,
            _request: CloneRequest,
        ) -> Result<RepositoryInfo, BackendError> {
            Err(BackendError::new("clone unsupported"))
        }

        async fn update_user_config(
            &self,
            _request: UserConfigRequest,
        ) -> Result<(), BackendError> {
            Ok(())
        }

        async fn update_origin(&self, _request: OriginRequest) -> Result<(), BackendError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_panicking_backend_fails_the_operation() {
        let mut session = SessionController::new(Arc::new(PanickingBackend));
        session.open(Some(PathBuf::from(REPO))).unwrap();

        let state = tokio::time::timeout(Duration::from_secs(2), session.settle())
            .await
            .expect("settle timed out")
            .clone();
        let SessionState::Failed {
            intent,
            last_snapshot,
            message,
        } = &state
        else {
            panic!("expected Failed, got {state:?}");
        };
        assert_eq!(*intent, Intent::Open);
        assert_eq!(*last_snapshot, None);
        assert!(message.starts_with("Backend task failed"), "{message}");

        assert!(session.open(Some(PathBuf::from(REPO))).is_ok());
    }

    #[tokio::test]
    async fn test_close_publishes_closed_once() {
        let backend = Arc::new(MemoryBackend::new().with_repository(repo_info(&[("main", true)])));
        let mut session = controller(&backend);
        session.open(Some(PathBuf::from(REPO))).unwrap();
        session.settle().await;
        let mut events = session.subscribe();

        session.close().unwrap();
        session.close().unwrap();

        assert_eq!(session.state(), &SessionState::Closed);
        assert_eq!(events.try_recv().unwrap(), SessionState::Closed);
        assert!(events.try_recv().is_err());
        assert_eq!(
            session.update_config(ConfigUpdate::default()),
            Err(SessionError::NoRepository)
        );
    }

    #[tokio::test]
    async fn test_next_transition_without_operation() {
        let backend = Arc::new(MemoryBackend::new());
        let mut session = controller(&backend);
        assert_eq!(session.next_transition().await, None);
        assert_eq!(session.open(None), Err(SessionError::Cancelled));
        assert_eq!(session.refresh(), Err(SessionError::NoRepository));
    }
}
