//! Player and team submissions.

use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who answered a challenge: exactly one user or one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Submitter {
    /// A single player.
    UserId(Uuid),
    /// A team of players.
    TeamId(Uuid),
}

impl Submitter {
    /// Builds a submitter from the optional ids carried by a request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` unless exactly one id is present.
    pub fn from_ids(user_id: Option<Uuid>, team_id: Option<Uuid>) -> Result<Self, DomainError> {
        match (user_id, team_id) {
            (Some(user_id), None) => Ok(Self::UserId(user_id)),
            (None, Some(team_id)) => Ok(Self::TeamId(team_id)),
            (Some(_), Some(_)) => Err(DomainError::Validation(
                "submission must name a user or a team, not both".to_owned(),
            )),
            (None, None) => Err(DomainError::Validation(
                "submission must name a user or a team".to_owned(),
            )),
        }
    }

    /// The user id, for user submissions.
    #[must_use]
    pub const fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::UserId(id) => Some(*id),
            Self::TeamId(_) => None,
        }
    }

    /// The team id, for team submissions.
    #[must_use]
    pub const fn team_id(&self) -> Option<Uuid> {
        match self {
            Self::TeamId(id) => Some(*id),
            Self::UserId(_) => None,
        }
    }
}

/// A stored answer to a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Submission identifier.
    pub id: Uuid,
    /// Challenge answered.
    pub challenge_id: Uuid,
    /// Who answered.
    #[serde(flatten)]
    pub submitter: Submitter,
    /// Evidence image, if any.
    pub image_url: Option<String>,
    /// Free text answer, if any.
    pub text: Option<String>,
    /// Judge verdict.
    pub is_correct: bool,
    /// Judge explanation.
    pub reason: String,
    /// When the submission was recorded.
    pub created_at: DateTime<Utc>,
}
