//! Outcome of a submission.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An item handed to the submitter by the reward allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub rarity: String,
}

/// Judge verdict on a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the answer satisfies the challenge.
    pub successful: bool,
    /// Explanation shown to the player.
    pub reason: String,
}

/// Everything a submission earned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub successful: bool,
    pub reason: String,
    pub quest_completed: bool,
    pub items_awarded: Vec<InventoryItem>,
    pub experience_awarded: i64,
    pub reputation_awarded: i64,
    pub zone_id: Option<Uuid>,
    pub level_up: bool,
    pub reputation_up: bool,
}

impl SubmissionResult {
    /// Result for an answer the judge turned down.
    #[must_use]
    pub fn rejected(reason: String) -> Self {
        Self {
            successful: false,
            reason,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_result_awards_nothing() {
        let result = SubmissionResult::rejected("wrong statue".to_owned());

        assert!(!result.successful);
        assert_eq!(result.reason, "wrong statue");
        assert!(!result.quest_completed);
        assert!(result.items_awarded.is_empty());
        assert_eq!(result.experience_awarded, 0);
        assert_eq!(result.reputation_awarded, 0);
        assert_eq!(result.zone_id, None);
    }

    #[test]
    fn test_result_serializes_in_camel_case() {
        let result = SubmissionResult {
            successful: true,
            quest_completed: true,
            experience_awarded: 350,
            ..SubmissionResult::default()
        };

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["questCompleted"], true);
        assert_eq!(json["experienceAwarded"], 350);
        assert_eq!(json["itemsAwarded"], serde_json::json!([]));
        assert!(json["zoneId"].is_null());
        assert_eq!(json["reputationUp"], false);
    }
}
