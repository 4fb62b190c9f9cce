//! In-process quest store.
//!
//! Writers are serialized: [`QuestGraphStore::begin`] waits for the previous
//! transaction to finish, then works on a private copy of the state that
//! replaces the shared state on commit. Seeding helpers write straight to the
//! shared state and are meant for setting up tests before any transaction is
//! open.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use questline_progression::ProgressionCounter;
use questline_quest::domain::audit::AuditEntry;
use questline_quest::domain::character::CharacterAction;
use questline_quest::domain::graph::{Challenge, Quest, QuestGraph};
use questline_quest::domain::location::PointOfInterest;
use questline_quest::domain::submission::{Submission, Submitter};
use questline_quest::repository::{QuestGraphStore, QuestTransaction};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::geo::distance_meters;

#[derive(Debug, Clone, Default)]
struct StoreState {
    graphs: HashMap<Uuid, QuestGraph>,
    quest_order: Vec<Uuid>,
    points_of_interest: HashMap<Uuid, PointOfInterest>,
    point_zones: HashMap<Uuid, Uuid>,
    submissions: Vec<Submission>,
    user_levels: HashMap<Uuid, ProgressionCounter>,
    zone_reputations: HashMap<(Uuid, Uuid), ProgressionCounter>,
    character_actions: Vec<CharacterAction>,
    audit_entries: Vec<AuditEntry>,
}

impl StoreState {
    fn graphs_in_order(&self) -> impl Iterator<Item = &QuestGraph> {
        self.quest_order.iter().filter_map(|id| self.graphs.get(id))
    }

    fn put_graph(&mut self, graph: QuestGraph) {
        let id = graph.quest.id;
        if self.graphs.insert(id, graph).is_none() {
            self.quest_order.push(id);
        }
    }

    fn has_correct_submission(&self, challenge_id: Uuid, submitter: Submitter) -> bool {
        self.submissions.iter().any(|submission| {
            submission.is_correct
                && submission.challenge_id == challenge_id
                && submission.submitter == submitter
        })
    }
}

/// Quest store held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestStore {
    state: Arc<Mutex<StoreState>>,
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl InMemoryQuestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces a quest graph without validating it.
    pub fn seed_quest_graph(&self, graph: QuestGraph) {
        self.state().put_graph(graph);
    }

    /// Adds a point of interest, optionally inside a zone.
    pub fn seed_point_of_interest(&self, point: PointOfInterest, zone_id: Option<Uuid>) {
        let mut state = self.state();
        if let Some(zone_id) = zone_id {
            state.point_zones.insert(point.id, zone_id);
        }
        state.points_of_interest.insert(point.id, point);
    }

    /// Adds a submission without the correct-submission uniqueness check.
    pub fn seed_submission(&self, submission: Submission) {
        self.state().submissions.push(submission);
    }

    /// Adds a character action.
    pub fn seed_character_action(&self, action: CharacterAction) {
        self.state().character_actions.push(action);
    }

    /// Sets a user's experience counter.
    pub fn seed_user_level(&self, user_id: Uuid, counter: ProgressionCounter) {
        self.state().user_levels.insert(user_id, persisted(&counter));
    }

    /// A stored quest graph.
    #[must_use]
    pub fn quest_graph(&self, quest_id: Uuid) -> Option<QuestGraph> {
        self.state().graphs.get(&quest_id).cloned()
    }

    /// Every stored quest, in insertion order.
    #[must_use]
    pub fn quests(&self) -> Vec<Quest> {
        self.state()
            .graphs_in_order()
            .map(|graph| graph.quest.clone())
            .collect()
    }

    /// Every stored submission, in insertion order.
    #[must_use]
    pub fn submissions(&self) -> Vec<Submission> {
        self.state().submissions.clone()
    }

    /// A user's experience counter.
    #[must_use]
    pub fn user_level(&self, user_id: Uuid) -> Option<ProgressionCounter> {
        self.state().user_levels.get(&user_id).copied()
    }

    /// A user's reputation counter in a zone.
    #[must_use]
    pub fn zone_reputation(&self, user_id: Uuid, zone_id: Uuid) -> Option<ProgressionCounter> {
        self.state()
            .zone_reputations
            .get(&(user_id, zone_id))
            .copied()
    }

    /// Every feed line, in insertion order.
    #[must_use]
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state().audit_entries.clone()
    }

    /// Actions offered by a character.
    #[must_use]
    pub fn character_actions(&self, character_id: Uuid) -> Vec<CharacterAction> {
        self.state()
            .character_actions
            .iter()
            .filter(|action| action.character_id == character_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl QuestGraphStore for InMemoryQuestStore {
    async fn find_challenge(&self, challenge_id: Uuid) -> Result<Option<Challenge>, DomainError> {
        Ok(self
            .state()
            .graphs
            .values()
            .find_map(|graph| graph.challenge(challenge_id).cloned()))
    }

    async fn load_quest_graph(&self, quest_id: Uuid) -> Result<Option<QuestGraph>, DomainError> {
        Ok(self.quest_graph(quest_id))
    }

    async fn find_point_of_interest(
        &self,
        point_of_interest_id: Uuid,
    ) -> Result<Option<PointOfInterest>, DomainError> {
        Ok(self
            .state()
            .points_of_interest
            .get(&point_of_interest_id)
            .cloned())
    }

    async fn find_zone_for_point_of_interest(
        &self,
        point_of_interest_id: Uuid,
    ) -> Result<Option<Uuid>, DomainError> {
        Ok(self.state().point_zones.get(&point_of_interest_id).copied())
    }

    async fn find_quest_ids_near(
        &self,
        lat: f64,
        lng: f64,
        radius_meters: f64,
    ) -> Result<Vec<Uuid>, DomainError> {
        let state = self.state();
        let ids = state
            .graphs_in_order()
            .filter(|graph| {
                graph.nodes.iter().any(|node| {
                    state
                        .points_of_interest
                        .get(&node.point_of_interest_id)
                        .is_some_and(|point| {
                            distance_meters(lat, lng, point.lat, point.lng) <= radius_meters
                        })
                })
            })
            .map(|graph| graph.quest.id)
            .collect();
        Ok(ids)
    }

    async fn find_quest_ids_started_by_user(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let state = self.state();
        let mut ids: Vec<Uuid> = Vec::new();
        for submission in &state.submissions {
            if submission.submitter.user_id() != Some(user_id) {
                continue;
            }
            let quest_id = state
                .graphs
                .values()
                .find_map(|graph| graph.challenge(submission.challenge_id))
                .map(|challenge| challenge.quest_id);
            if let Some(quest_id) = quest_id {
                if !ids.contains(&quest_id) {
                    ids.push(quest_id);
                }
            }
        }
        Ok(ids)
    }

    async fn find_submissions_by_user(&self, user_id: Uuid) -> Result<Vec<Submission>, DomainError> {
        let mut submissions: Vec<Submission> = self
            .state()
            .submissions
            .iter()
            .filter(|submission| submission.submitter.user_id() == Some(user_id))
            .cloned()
            .collect();
        submissions.sort_by_key(|submission| submission.created_at);
        Ok(submissions)
    }

    async fn has_correct_submission(
        &self,
        challenge_id: Uuid,
        submitter: Submitter,
    ) -> Result<bool, DomainError> {
        Ok(self.state().has_correct_submission(challenge_id, submitter))
    }

    async fn find_due_recurring_quest_ids(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Uuid>, DomainError> {
        let state = self.state();
        let mut due: Vec<(DateTime<Utc>, Uuid)> = state
            .graphs_in_order()
            .filter_map(|graph| {
                let schedule = graph.quest.schedule.as_ref()?;
                (schedule.next_occurrence_at <= now)
                    .then_some((schedule.next_occurrence_at, graph.quest.id))
            })
            .collect();
        due.sort_by_key(|(next_occurrence_at, _)| *next_occurrence_at);
        Ok(due.into_iter().take(limit).map(|(_, id)| id).collect())
    }

    async fn begin(&self) -> Result<Box<dyn QuestTransaction>, DomainError> {
        let writer = Arc::clone(&self.writer).lock_owned().await;
        let working = self.state().clone();
        Ok(Box::new(InMemoryTransaction {
            shared: Arc::clone(&self.state),
            working,
            _writer: writer,
        }))
    }
}

/// A transaction over [`InMemoryQuestStore`]. Holds the writer lock until
/// committed or dropped.
#[derive(Debug)]
pub struct InMemoryTransaction {
    shared: Arc<Mutex<StoreState>>,
    working: StoreState,
    _writer: OwnedMutexGuard<()>,
}

#[async_trait]
impl QuestTransaction for InMemoryTransaction {
    async fn claim_quest(&mut self, quest_id: Uuid) -> Result<Option<QuestGraph>, DomainError> {
        Ok(self.working.graphs.get(&quest_id).cloned())
    }

    async fn insert_quest_graph(&mut self, graph: &QuestGraph) -> Result<(), DomainError> {
        graph.validate()?;
        if self.working.graphs.contains_key(&graph.quest.id) {
            return Err(DomainError::Validation(format!(
                "quest {} already exists",
                graph.quest.id
            )));
        }
        self.working.put_graph(graph.clone());
        Ok(())
    }

    async fn update_quest(&mut self, quest: &Quest) -> Result<(), DomainError> {
        let graph = self
            .working
            .graphs
            .get_mut(&quest.id)
            .ok_or_else(|| DomainError::not_found("quest", quest.id))?;
        graph.quest = quest.clone();
        Ok(())
    }

    async fn find_character_actions(
        &mut self,
        character_id: Uuid,
    ) -> Result<Vec<CharacterAction>, DomainError> {
        Ok(self
            .working
            .character_actions
            .iter()
            .filter(|action| action.character_id == character_id)
            .cloned()
            .collect())
    }

    async fn insert_character_action(&mut self, action: &CharacterAction) -> Result<(), DomainError> {
        self.working.character_actions.push(action.clone());
        Ok(())
    }

    async fn delete_character_action(&mut self, action_id: Uuid) -> Result<(), DomainError> {
        self.working
            .character_actions
            .retain(|action| action.id != action_id);
        Ok(())
    }

    async fn record_submission(&mut self, submission: &Submission) -> Result<(), DomainError> {
        if submission.is_correct
            && self
                .working
                .has_correct_submission(submission.challenge_id, submission.submitter)
        {
            return Err(DomainError::AlreadyCompleted {
                challenge_id: submission.challenge_id,
            });
        }
        self.working.submissions.push(submission.clone());
        Ok(())
    }

    async fn load_user_level(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<ProgressionCounter>, DomainError> {
        Ok(self.working.user_levels.get(&user_id).copied())
    }

    async fn save_user_level(
        &mut self,
        user_id: Uuid,
        counter: &ProgressionCounter,
    ) -> Result<(), DomainError> {
        self.working.user_levels.insert(user_id, persisted(counter));
        Ok(())
    }

    async fn load_zone_reputation(
        &mut self,
        user_id: Uuid,
        zone_id: Uuid,
    ) -> Result<Option<ProgressionCounter>, DomainError> {
        Ok(self
            .working
            .zone_reputations
            .get(&(user_id, zone_id))
            .copied())
    }

    async fn save_zone_reputation(
        &mut self,
        user_id: Uuid,
        zone_id: Uuid,
        counter: &ProgressionCounter,
    ) -> Result<(), DomainError> {
        self.working
            .zone_reputations
            .insert((user_id, zone_id), persisted(counter));
        Ok(())
    }

    async fn append_audit_entry(&mut self, entry: &AuditEntry) -> Result<(), DomainError> {
        self.working.audit_entries.push(entry.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self {
            shared, working, ..
        } = *self;
        *shared.lock().unwrap_or_else(PoisonError::into_inner) = working;
        Ok(())
    }
}

/// The stored shape of a counter: `levels_gained` only describes the call
/// that produced it and is not kept.
const fn persisted(counter: &ProgressionCounter) -> ProgressionCounter {
    ProgressionCounter::restore(counter.level, counter.total_points, counter.points_on_level)
}
