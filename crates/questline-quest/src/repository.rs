//! Store contracts for the quest graph and everything that hangs off it.
//!
//! Reads that do not need isolation go through [`QuestGraphStore`]. Every
//! mutation happens inside a [`QuestTransaction`] obtained from
//! [`QuestGraphStore::begin`]; dropping a transaction without calling
//! [`QuestTransaction::commit`] discards its writes. While a transaction is
//! open, callers use only the transaction for reads and writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use questline_progression::ProgressionCounter;
use uuid::Uuid;

use crate::domain::audit::AuditEntry;
use crate::domain::character::CharacterAction;
use crate::domain::graph::{Challenge, Quest, QuestGraph};
use crate::domain::location::PointOfInterest;
use crate::domain::submission::{Submission, Submitter};

/// Read side of the quest store, and the entry point for transactions.
#[async_trait]
pub trait QuestGraphStore: Send + Sync {
    /// Loads a single challenge.
    async fn find_challenge(&self, challenge_id: Uuid) -> Result<Option<Challenge>, DomainError>;

    /// Loads a quest with all of its nodes, challenges and edges.
    async fn load_quest_graph(&self, quest_id: Uuid) -> Result<Option<QuestGraph>, DomainError>;

    /// Loads a point of interest from the location catalog.
    async fn find_point_of_interest(
        &self,
        point_of_interest_id: Uuid,
    ) -> Result<Option<PointOfInterest>, DomainError>;

    /// Zone containing a point of interest, if it belongs to one.
    async fn find_zone_for_point_of_interest(
        &self,
        point_of_interest_id: Uuid,
    ) -> Result<Option<Uuid>, DomainError>;

    /// Quests with at least one node within `radius_meters` of the given
    /// coordinates.
    async fn find_quest_ids_near(
        &self,
        lat: f64,
        lng: f64,
        radius_meters: f64,
    ) -> Result<Vec<Uuid>, DomainError>;

    /// Quests on which the user has submitted at least once.
    async fn find_quest_ids_started_by_user(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError>;

    /// Every submission made by the user, oldest first.
    async fn find_submissions_by_user(&self, user_id: Uuid) -> Result<Vec<Submission>, DomainError>;

    /// Whether the submitter already has a correct submission for the challenge.
    async fn has_correct_submission(
        &self,
        challenge_id: Uuid,
        submitter: Submitter,
    ) -> Result<bool, DomainError>;

    /// Scheduled quests whose next occurrence is at or before `now`, oldest
    /// first, at most `limit` of them.
    async fn find_due_recurring_quest_ids(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Uuid>, DomainError>;

    /// Opens a transaction.
    async fn begin(&self) -> Result<Box<dyn QuestTransaction>, DomainError>;
}

/// A unit of work against the quest store.
#[async_trait]
pub trait QuestTransaction: Send {
    /// Locks a quest for the rest of the transaction and loads its graph.
    async fn claim_quest(&mut self, quest_id: Uuid) -> Result<Option<QuestGraph>, DomainError>;

    /// Inserts a new quest with its nodes, challenges, edges and rewards.
    async fn insert_quest_graph(&mut self, graph: &QuestGraph) -> Result<(), DomainError>;

    /// Overwrites the quest record (not its graph).
    async fn update_quest(&mut self, quest: &Quest) -> Result<(), DomainError>;

    /// Actions offered by a character.
    async fn find_character_actions(
        &mut self,
        character_id: Uuid,
    ) -> Result<Vec<CharacterAction>, DomainError>;

    /// Adds an action to a character.
    async fn insert_character_action(&mut self, action: &CharacterAction) -> Result<(), DomainError>;

    /// Removes an action. Removing an unknown action is not an error.
    async fn delete_character_action(&mut self, action_id: Uuid) -> Result<(), DomainError>;

    /// Records a submission.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyCompleted` when the submission is correct
    /// and the submitter already has a correct submission for the challenge.
    async fn record_submission(&mut self, submission: &Submission) -> Result<(), DomainError>;

    /// The user's experience counter, if one exists.
    async fn load_user_level(&mut self, user_id: Uuid)
    -> Result<Option<ProgressionCounter>, DomainError>;

    /// Creates or replaces the user's experience counter.
    async fn save_user_level(
        &mut self,
        user_id: Uuid,
        counter: &ProgressionCounter,
    ) -> Result<(), DomainError>;

    /// The user's reputation counter in a zone, if one exists.
    async fn load_zone_reputation(
        &mut self,
        user_id: Uuid,
        zone_id: Uuid,
    ) -> Result<Option<ProgressionCounter>, DomainError>;

    /// Creates or replaces the user's reputation counter in a zone.
    async fn save_zone_reputation(
        &mut self,
        user_id: Uuid,
        zone_id: Uuid,
        counter: &ProgressionCounter,
    ) -> Result<(), DomainError>;

    /// Appends a line to the activity feed.
    async fn append_audit_entry(&mut self, entry: &AuditEntry) -> Result<(), DomainError>;

    /// Makes every write of the transaction visible.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}
