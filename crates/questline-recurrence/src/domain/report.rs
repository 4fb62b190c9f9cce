//! Results of a recurrence run.

use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use uuid::Uuid;

/// Recurrence knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceSettings {
    /// Most quests regenerated per batch.
    pub batch_size: usize,
}

impl Default for RecurrenceSettings {
    fn default() -> Self {
        Self { batch_size: 50 }
    }
}

/// A template that spawned a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegeneratedQuest {
    pub original_quest_id: Uuid,
    pub new_quest_id: Uuid,
    pub recurring_group_id: Uuid,
    pub next_occurrence_at: DateTime<Utc>,
}

/// What happened to one quest handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceOutcome {
    /// A clone was created and the template retired.
    Regenerated(RegeneratedQuest),
    /// Nothing was done; the reason says why.
    Skipped { quest_id: Uuid, reason: String },
}

/// Summary of one batch.
#[derive(Debug, Default)]
pub struct RecurrenceReport {
    pub regenerated: Vec<RegeneratedQuest>,
    pub skipped: Vec<(Uuid, String)>,
    /// One `DomainError::PartialCloneFailure` per quest that failed.
    pub failed: Vec<DomainError>,
}

impl RecurrenceReport {
    /// Quests looked at in this batch.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.regenerated.len() + self.skipped.len() + self.failed.len()
    }
}
