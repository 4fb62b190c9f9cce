//! Background job payloads.

use questline_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A queued job, as found on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobPayload {
    /// Regenerate one recurring quest.
    RecurringQuest {
        #[serde(rename = "questId")]
        quest_id: Uuid,
    },
    /// Generate a fresh quest for a zone from an archetype.
    GenerateQuest {
        #[serde(rename = "zoneId")]
        zone_id: Uuid,
        #[serde(rename = "questArchetypeId")]
        quest_archetype_id: Uuid,
    },
}

impl JobPayload {
    /// Parses a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the payload matches neither shape.
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw)
            .map_err(|e| DomainError::Validation(format!("unrecognized job payload: {e}")))
    }
}
