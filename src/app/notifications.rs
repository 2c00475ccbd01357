use chrono::{DateTime, Duration, Utc};

const DEFAULT_TTL_MS: i64 = 3_000;
const ERROR_TTL_MS: i64 = 6_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient toast shown by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub detail: Option<String>,
    /// Notifications sharing a key replace each other instead of stacking.
    pub key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(title: impl Into<String>) -> Self {
        Self::at(NotificationLevel::Success, title.into(), None, Utc::now())
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::at(
            NotificationLevel::Error,
            title.into(),
            Some(detail.into()),
            Utc::now(),
        )
    }

    fn at(
        level: NotificationLevel,
        title: String,
        detail: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let ttl = match level {
            NotificationLevel::Error => ERROR_TTL_MS,
            NotificationLevel::Success => DEFAULT_TTL_MS,
        };
        Self {
            level,
            title,
            detail,
            key: None,
            created_at,
            expires_at: created_at + Duration::milliseconds(ttl),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, notification: Notification) {
        if let Some(key) = &notification.key {
            self.pending.retain(|n| n.key.as_ref() != Some(key));
        }
        self.pending.push(notification);
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    /// Drops notifications whose display time has run out.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.pending.retain(|n| !n.is_expired(now));
    }
}
