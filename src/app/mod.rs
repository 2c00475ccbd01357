//! Application shell: owns the session controller and the navigation
//! composer, and turns session transitions into routes and notifications.

mod notifications;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::domain::{ConfigUpdate, SessionError};
use crate::infra::backend::RepositoryBackend;
use crate::navigation::{NavigationComposer, NavigationNode, Route, ToggleOutcome};
use crate::session::{Intent, OperationId, SessionController, SessionState};

pub use notifications::{Notification, NotificationLevel, NotificationQueue};

const SETTINGS_SAVED: &str = "Settings saved successfully!";

pub struct FluxApp {
    session: SessionController,
    navigation: NavigationComposer,
    events: broadcast::Receiver<SessionState>,
    notifications: NotificationQueue,
    route: Route,
    open_path: Option<PathBuf>,
    last_intent: Option<Intent>,
}

impl FluxApp {
    pub fn new(backend: Arc<dyn RepositoryBackend>) -> Self {
        let session = SessionController::new(backend);
        let events = session.subscribe();
        Self {
            session,
            navigation: NavigationComposer::default(),
            events,
            notifications: NotificationQueue::default(),
            route: Route::Home,
            open_path: None,
            last_intent: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn navigation(&self) -> &NavigationComposer {
        &self.navigation
    }

    pub fn tree(&self) -> Vec<NavigationNode> {
        self.navigation.get_tree()
    }

    pub fn current_route(&self) -> Route {
        self.route
    }

    pub fn open(&mut self, selection: Option<PathBuf>) -> Result<OperationId, SessionError> {
        let result = self.session.open(selection);
        self.sync();
        result
    }

    pub fn clone_repository(
        &mut self,
        remote_url: &str,
        destination: &str,
    ) -> Result<OperationId, SessionError> {
        let result = self.session.clone_repository(remote_url, destination);
        self.sync();
        result
    }

    pub fn refresh(&mut self) -> Result<OperationId, SessionError> {
        let result = self.session.refresh();
        self.sync();
        result
    }

    pub fn close(&mut self) -> Result<(), SessionError> {
        let result = self.session.close();
        self.sync();
        result
    }

    /// Settings view-model for the open repository. Absent values are empty.
    pub fn settings_form(&self) -> Option<ConfigUpdate> {
        match self.session.state() {
            SessionState::Open(snapshot) => Some(ConfigUpdate::from_snapshot(snapshot)),
            _ => None,
        }
    }

    pub fn submit_settings(&mut self, form: ConfigUpdate) -> Result<OperationId, SessionError> {
        let result = self.session.update_config(form);
        self.sync();
        result
    }

    /// Activates a sidebar node. Links change the current route.
    pub fn toggle_menu(&mut self, id: &str) -> ToggleOutcome {
        let outcome = self.navigation.toggle(id);
        if let ToggleOutcome::Navigate(route) = outcome {
            self.route = route;
        }
        outcome
    }

    /// Applies completed backend work. Returns true if anything arrived.
    pub fn poll(&mut self) -> bool {
        let any = self.session.poll();
        self.sync();
        any
    }

    /// Waits for the in-flight operation, if any, to finish.
    pub async fn settle(&mut self) -> &SessionState {
        self.session.settle().await;
        self.sync();
        self.session.state()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.pending()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.take()
    }

    pub fn prune_notifications(&mut self) {
        self.notifications.prune(Utc::now());
    }

    fn sync(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(state) => self.on_transition(&state),
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("Skipped {skipped} session transitions");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        let branches = self
            .session
            .state()
            .snapshot()
            .map(|s| s.branches().to_vec())
            .unwrap_or_default();
        self.navigation.set_branches(&branches);
    }

    fn on_transition(&mut self, state: &SessionState) {
        match state {
            SessionState::Closed => {
                self.open_path = None;
                self.route = Route::Home;
            }
            SessionState::Loading { intent, .. } => self.last_intent = Some(*intent),
            SessionState::Open(snapshot) => {
                self.track_repository(snapshot.path());
                if self.last_intent.take() == Some(Intent::UpdateConfig) {
                    self.notifications
                        .push(Notification::success(SETTINGS_SAVED));
                }
            }
            SessionState::Failed {
                intent,
                last_snapshot,
                message,
            } => {
                self.last_intent = None;
                if let Some(snapshot) = last_snapshot {
                    self.track_repository(snapshot.path());
                }
                self.notifications.push(
                    Notification::error(failure_title(*intent), message.clone())
                        .with_key(format!("{intent}-error")),
                );
            }
        }
    }

    fn track_repository(&mut self, path: &Path) {
        if self.open_path.as_deref() != Some(path) {
            self.open_path = Some(path.to_path_buf());
            self.route = Route::Home;
        }
    }
}

fn failure_title(intent: Intent) -> &'static str {
    match intent {
        Intent::Open => "Failed to open repository",
        Intent::Clone => "Failed to clone repository",
        Intent::Refresh => "Failed to refresh repository",
        Intent::UpdateConfig => "Failed to save settings",
    }
}
