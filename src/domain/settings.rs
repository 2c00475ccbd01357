use serde::{Deserialize, Serialize};

use super::snapshot::RepositorySnapshot;

/// Repository configuration as edited in the Settings view.
///
/// Absent values are represented as empty strings, matching the form fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub user_name: String,
    pub user_email: String,
    pub origin: String,
}

impl ConfigUpdate {
    pub fn new(
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            user_email: user_email.into(),
            origin: origin.into(),
        }
    }

    /// Pre-fills the form from the values currently stored in the repository.
    pub fn from_snapshot(snapshot: &RepositorySnapshot) -> Self {
        Self {
            user_name: snapshot.user_name().unwrap_or_default().to_string(),
            user_email: snapshot.user_email().unwrap_or_default().to_string(),
            origin: snapshot.origin().unwrap_or_default().to_string(),
        }
    }
}
