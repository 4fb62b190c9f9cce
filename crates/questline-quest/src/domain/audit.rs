//! Activity feed lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::submission::Submitter;

/// One human-readable line in a user's or team's activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates an entry addressed to whoever made a submission.
    #[must_use]
    pub fn for_submitter(
        id: Uuid,
        submitter: Submitter,
        message: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: submitter.user_id(),
            team_id: submitter.team_id(),
            message,
            created_at,
        }
    }
}
