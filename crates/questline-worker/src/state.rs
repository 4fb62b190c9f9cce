//! Shared worker state.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use questline_core::clock::Clock;
use questline_core::error::DomainError;
use questline_core::rng::DeterministicRng;
use questline_quest::repository::QuestGraphStore;
use questline_recurrence::application::command_handlers::RecurrenceServices;
use questline_recurrence::collaborators::QuestGenerator;
use questline_recurrence::domain::report::RecurrenceSettings;
use uuid::Uuid;

/// Generator used when no quest generation service is wired in. Every
/// generate-quest job fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableQuestGenerator;

#[async_trait]
impl QuestGenerator for UnavailableQuestGenerator {
    async fn generate_quest(
        &self,
        _zone_id: Uuid,
        _quest_archetype_id: Uuid,
    ) -> Result<Uuid, DomainError> {
        Err(DomainError::external(
            "quest generator",
            "no quest generator configured",
        ))
    }
}

/// Everything the worker loop hands to the recurrence handlers.
#[derive(Clone)]
pub struct WorkerState {
    /// Quest store.
    pub store: Arc<dyn QuestGraphStore>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Id source.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Generate-quest job target.
    pub generator: Arc<dyn QuestGenerator>,
    /// Batch knobs.
    pub settings: RecurrenceSettings,
}

impl WorkerState {
    /// Create new worker state.
    #[must_use]
    pub fn new(
        store: Arc<dyn QuestGraphStore>,
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        settings: RecurrenceSettings,
    ) -> Self {
        Self {
            store,
            clock,
            rng,
            generator: Arc::new(UnavailableQuestGenerator),
            settings,
        }
    }

    /// Replaces the quest generator.
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn QuestGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Borrows the state as recurrence handler collaborators.
    #[must_use]
    pub fn services(&self) -> RecurrenceServices<'_> {
        RecurrenceServices {
            clock: self.clock.as_ref(),
            rng: self.rng.as_ref(),
            store: self.store.as_ref(),
        }
    }
}
