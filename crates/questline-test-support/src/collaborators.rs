//! Test doubles for the judge, the reward allocator and the stat pool.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use questline_core::error::DomainError;
use questline_quest::domain::graph::Challenge;
use questline_quest::domain::submission::{Submission, Submitter};
use questline_submission::collaborators::{ChallengeJudge, RewardAllocator, StatPool};
use questline_submission::domain::results::{InventoryItem, Verdict};
use uuid::Uuid;

/// A judge that returns scripted verdicts in order, then repeats its fallback.
/// Records the challenge of every submission it judges.
#[derive(Debug)]
pub struct ScriptedJudge {
    scripted: Mutex<VecDeque<Verdict>>,
    fallback: Verdict,
    judged: Mutex<Vec<Uuid>>,
}

impl ScriptedJudge {
    fn with_fallback(fallback: Verdict) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback,
            judged: Mutex::new(Vec::new()),
        }
    }

    /// A judge that accepts every submission.
    #[must_use]
    pub fn accepting() -> Self {
        Self::with_fallback(Verdict {
            successful: true,
            reason: "looks right".to_owned(),
        })
    }

    /// A judge that rejects every submission with `reason`.
    #[must_use]
    pub fn rejecting(reason: &str) -> Self {
        Self::with_fallback(Verdict {
            successful: false,
            reason: reason.to_owned(),
        })
    }

    /// A judge that returns `verdicts` first, then rejects.
    #[must_use]
    pub fn scripted(verdicts: Vec<Verdict>) -> Self {
        let judge = Self::rejecting("no more scripted verdicts");
        *judge.scripted.lock().unwrap() = verdicts.into();
        judge
    }

    /// Challenges judged so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn judged(&self) -> Vec<Uuid> {
        self.judged.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChallengeJudge for ScriptedJudge {
    async fn judge(
        &self,
        challenge: &Challenge,
        _submission: &Submission,
    ) -> Result<Verdict, DomainError> {
        self.judged.lock().unwrap().push(challenge.id);
        let next = self.scripted.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

/// A judge that always fails.
#[derive(Debug)]
pub struct FailingJudge;

#[async_trait]
impl ChallengeJudge for FailingJudge {
    async fn judge(
        &self,
        _challenge: &Challenge,
        _submission: &Submission,
    ) -> Result<Verdict, DomainError> {
        Err(DomainError::external("judge", "model unavailable"))
    }
}

/// One call made to a [`RecordingAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// A random drop.
    Random(Submitter),
    /// A named item.
    Specific(Submitter, i32),
}

/// Item id every random drop resolves to.
const RANDOM_DROP_ITEM_ID: i32 = 9_001;

/// An allocator that grants every request and records it.
#[derive(Debug, Default)]
pub struct RecordingAllocator {
    allocations: Mutex<Vec<Allocation>>,
}

impl RecordingAllocator {
    /// Create an allocator with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn allocations(&self) -> Vec<Allocation> {
        self.allocations.lock().unwrap().clone()
    }

    fn item(id: i32) -> InventoryItem {
        InventoryItem {
            id,
            name: format!("Item {id}"),
            image_url: format!("https://images.example/items/{id}.png"),
            rarity: "common".to_owned(),
        }
    }
}

#[async_trait]
impl RewardAllocator for RecordingAllocator {
    async fn allocate_random(&self, submitter: Submitter) -> Result<InventoryItem, DomainError> {
        self.allocations
            .lock()
            .unwrap()
            .push(Allocation::Random(submitter));
        Ok(Self::item(RANDOM_DROP_ITEM_ID))
    }

    async fn allocate_specific(
        &self,
        submitter: Submitter,
        inventory_item_id: i32,
    ) -> Result<InventoryItem, DomainError> {
        self.allocations
            .lock()
            .unwrap()
            .push(Allocation::Specific(submitter, inventory_item_id));
        Ok(Self::item(inventory_item_id))
    }
}

/// An allocator that always fails.
#[derive(Debug)]
pub struct FailingAllocator;

#[async_trait]
impl RewardAllocator for FailingAllocator {
    async fn allocate_random(&self, _submitter: Submitter) -> Result<InventoryItem, DomainError> {
        Err(DomainError::external("quartermaster", "inventory service down"))
    }

    async fn allocate_specific(
        &self,
        _submitter: Submitter,
        _inventory_item_id: i32,
    ) -> Result<InventoryItem, DomainError> {
        Err(DomainError::external("quartermaster", "inventory service down"))
    }
}

/// A stat pool that records every credit.
#[derive(Debug, Default)]
pub struct RecordingStatPool {
    credits: Mutex<Vec<(Uuid, i32)>>,
}

impl RecordingStatPool {
    /// Create a pool with no recorded credits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `(user_id, points)` pairs credited so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn credits(&self) -> Vec<(Uuid, i32)> {
        self.credits.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatPool for RecordingStatPool {
    async fn credit_stat_points(&self, user_id: Uuid, points: i32) -> Result<(), DomainError> {
        self.credits.lock().unwrap().push((user_id, points));
        Ok(())
    }
}

/// A stat pool that always fails.
#[derive(Debug)]
pub struct FailingStatPool;

#[async_trait]
impl StatPool for FailingStatPool {
    async fn credit_stat_points(&self, _user_id: Uuid, _points: i32) -> Result<(), DomainError> {
        Err(DomainError::external("stat pool", "character service down"))
    }
}
