//! Test stores: `QuestGraphStore` implementations for error paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use questline_quest::domain::graph::{Challenge, QuestGraph};
use questline_quest::domain::location::PointOfInterest;
use questline_quest::domain::submission::{Submission, Submitter};
use questline_quest::repository::{QuestGraphStore, QuestTransaction};
use uuid::Uuid;

/// A store whose every call fails with `DomainError::Infrastructure`.
#[derive(Debug)]
pub struct FailingQuestStore;

fn unavailable<T>() -> Result<T, DomainError> {
    Err(DomainError::Infrastructure("store unavailable".to_owned()))
}

#[async_trait]
impl QuestGraphStore for FailingQuestStore {
    async fn find_challenge(&self, _challenge_id: Uuid) -> Result<Option<Challenge>, DomainError> {
        unavailable()
    }

    async fn load_quest_graph(&self, _quest_id: Uuid) -> Result<Option<QuestGraph>, DomainError> {
        unavailable()
    }

    async fn find_point_of_interest(
        &self,
        _point_of_interest_id: Uuid,
    ) -> Result<Option<PointOfInterest>, DomainError> {
        unavailable()
    }

    async fn find_zone_for_point_of_interest(
        &self,
        _point_of_interest_id: Uuid,
    ) -> Result<Option<Uuid>, DomainError> {
        unavailable()
    }

    async fn find_quest_ids_near(
        &self,
        _lat: f64,
        _lng: f64,
        _radius_meters: f64,
    ) -> Result<Vec<Uuid>, DomainError> {
        unavailable()
    }

    async fn find_quest_ids_started_by_user(&self, _user_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        unavailable()
    }

    async fn find_submissions_by_user(&self, _user_id: Uuid) -> Result<Vec<Submission>, DomainError> {
        unavailable()
    }

    async fn has_correct_submission(
        &self,
        _challenge_id: Uuid,
        _submitter: Submitter,
    ) -> Result<bool, DomainError> {
        unavailable()
    }

    async fn find_due_recurring_quest_ids(
        &self,
        _now: DateTime<Utc>,
        _limit: usize,
    ) -> Result<Vec<Uuid>, DomainError> {
        unavailable()
    }

    async fn begin(&self) -> Result<Box<dyn QuestTransaction>, DomainError> {
        unavailable()
    }
}
