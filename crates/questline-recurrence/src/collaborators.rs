//! External services the recurrence context calls out to.

use async_trait::async_trait;
use questline_core::error::DomainError;
use uuid::Uuid;

/// Procedural quest generator for a zone and quest archetype.
#[async_trait]
pub trait QuestGenerator: Send + Sync {
    /// Generates and stores a new quest, returning its id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ExternalService` when generation fails.
    async fn generate_quest(
        &self,
        zone_id: Uuid,
        quest_archetype_id: Uuid,
    ) -> Result<Uuid, DomainError>;
}
