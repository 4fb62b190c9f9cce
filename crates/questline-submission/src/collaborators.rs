//! External services the submission processor calls out to.
//!
//! Implementations report their own failures as
//! `DomainError::ExternalService`; the processor propagates them unchanged.

use async_trait::async_trait;
use questline_core::error::DomainError;
use questline_quest::domain::graph::Challenge;
use questline_quest::domain::submission::{Submission, Submitter};
use uuid::Uuid;

use crate::domain::results::{InventoryItem, Verdict};

/// Decides whether a submission answers a challenge.
#[async_trait]
pub trait ChallengeJudge: Send + Sync {
    /// Judges one submission.
    async fn judge(&self, challenge: &Challenge, submission: &Submission)
    -> Result<Verdict, DomainError>;
}

/// Hands out inventory items (the quartermaster).
#[async_trait]
pub trait RewardAllocator: Send + Sync {
    /// Grants a random item from the drop pool.
    async fn allocate_random(&self, submitter: Submitter) -> Result<InventoryItem, DomainError>;

    /// Grants a specific inventory item.
    async fn allocate_specific(
        &self,
        submitter: Submitter,
        inventory_item_id: i32,
    ) -> Result<InventoryItem, DomainError>;
}

/// Receives the stat points a player earns by levelling.
#[async_trait]
pub trait StatPool: Send + Sync {
    /// Adds unspent stat points to the user's pool.
    async fn credit_stat_points(&self, user_id: Uuid, points: i32) -> Result<(), DomainError>;
}
