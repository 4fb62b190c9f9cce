//! Command handlers for the Submission Processing context.
//!
//! A correct answer is recorded together with its items, experience,
//! reputation and feed lines inside a single store transaction. The store
//! rejects a second correct submission for the same challenge and submitter,
//! so a racing duplicate fails with `AlreadyCompleted` before anything is
//! committed. The allocator and stat pool are called while the transaction is
//! open; if either fails the transaction is dropped and nothing is recorded.

use std::sync::Mutex;

use questline_core::clock::Clock;
use questline_core::command::Command;
use questline_core::error::DomainError;
use questline_core::rng::DeterministicRng;
use questline_progression::{LevelCurve, ReputationCurve};
use questline_quest::domain::audit::AuditEntry;
use questline_quest::domain::graph::Challenge;
use questline_quest::domain::submission::{Submission, Submitter};
use questline_quest::repository::{QuestGraphStore, QuestTransaction};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::collaborators::{ChallengeJudge, RewardAllocator, StatPool};
use crate::domain::commands::SubmitChallenge;
use crate::domain::feed;
use crate::domain::results::{InventoryItem, SubmissionResult};
use crate::domain::settings::SubmissionSettings;

/// Experience for every correct answer.
pub const EXPERIENCE_PER_CAPTURE: i64 = 100;
/// Extra experience when the answer finishes the quest.
pub const EXPERIENCE_PER_FINISHED_QUEST: i64 = 250;
/// Zone reputation for every correct answer.
pub const REPUTATION_PER_CAPTURE: i64 = 100;
/// Extra zone reputation when the answer finishes the quest.
pub const REPUTATION_PER_FINISHED_QUEST: i64 = 250;

/// Everything the submission handler talks to.
#[derive(Clone, Copy)]
pub struct SubmissionServices<'a> {
    /// Time source for submissions and feed lines.
    pub clock: &'a dyn Clock,
    /// Id source. Locked only while minting ids.
    pub rng: &'a Mutex<dyn DeterministicRng + Send>,
    /// Quest store.
    pub store: &'a dyn QuestGraphStore,
    /// Answer judge.
    pub judge: &'a dyn ChallengeJudge,
    /// Item allocator.
    pub allocator: &'a dyn RewardAllocator,
    /// Stat point sink.
    pub stat_pool: &'a dyn StatPool,
}

struct ProgressionAward {
    experience: i64,
    reputation: i64,
    levels_gained: i32,
    reputation_up: bool,
}

fn mint_ids<const N: usize>(
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<[Uuid; N], DomainError> {
    let mut rng_guard = rng
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
    Ok(std::array::from_fn(|_| rng_guard.next_uuid()))
}

const fn points_for(base: i64, finished_bonus: i64, quest_completed: bool) -> i64 {
    if quest_completed {
        base + finished_bonus
    } else {
        base
    }
}

async fn award_progression(
    tx: &mut dyn QuestTransaction,
    user_id: Uuid,
    zone_id: Uuid,
    quest_completed: bool,
) -> Result<ProgressionAward, DomainError> {
    let experience = points_for(
        EXPERIENCE_PER_CAPTURE,
        EXPERIENCE_PER_FINISHED_QUEST,
        quest_completed,
    );
    let level = tx
        .load_user_level(user_id)
        .await?
        .unwrap_or_default()
        .add_points(&LevelCurve, experience);
    tx.save_user_level(user_id, &level).await?;

    let reputation = points_for(
        REPUTATION_PER_CAPTURE,
        REPUTATION_PER_FINISHED_QUEST,
        quest_completed,
    );
    let standing = tx
        .load_zone_reputation(user_id, zone_id)
        .await?
        .unwrap_or_default()
        .add_points(&ReputationCurve, reputation);
    tx.save_zone_reputation(user_id, zone_id, &standing).await?;

    if level.leveled_up() {
        info!(%user_id, level = level.level, "user levelled up");
    }
    if standing.leveled_up() {
        info!(%user_id, %zone_id, level = standing.level, "zone reputation increased");
    }

    Ok(ProgressionAward {
        experience,
        reputation,
        levels_gained: level.levels_gained,
        reputation_up: standing.leveled_up(),
    })
}

/// The named item, if the challenge has one, plus a random drop.
async fn allocate_items(
    challenge: &Challenge,
    submitter: Submitter,
    allocator: &dyn RewardAllocator,
) -> Result<Vec<InventoryItem>, DomainError> {
    let mut items = Vec::with_capacity(2);
    if let Some(item_id) = challenge.inventory_item_id.filter(|id| *id != 0) {
        items.push(allocator.allocate_specific(submitter, item_id).await?);
    }
    items.push(allocator.allocate_random(submitter).await?);
    Ok(items)
}

/// Handles the `SubmitChallenge` command: judges the answer and, when it is
/// correct, records it and awards completion, items, experience and zone
/// reputation.
///
/// Experience and reputation go to user submissions only. Team submissions
/// still complete quests, earn items and write feed lines.
///
/// # Errors
///
/// - `DomainError::Validation` when the command names both or neither of a
///   user and a team.
/// - `DomainError::NotFound` when the challenge, its quest or node, or (for
///   user submissions) the zone cannot be resolved.
/// - `DomainError::AlreadyCompleted` when the submitter already answered the
///   challenge correctly.
/// - `DomainError::ExternalService` when the judge, allocator or stat pool
///   fails, and `DomainError::Infrastructure` when the store does. Nothing is
///   recorded in either case.
#[instrument(
    skip_all,
    fields(
        context = command.context(),
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        challenge_id = %command.challenge_id,
    )
)]
pub async fn handle_submit_challenge(
    command: &SubmitChallenge,
    settings: &SubmissionSettings,
    services: SubmissionServices<'_>,
) -> Result<SubmissionResult, DomainError> {
    let submitter = Submitter::from_ids(command.user_id, command.team_id)?;
    let store = services.store;

    let challenge = store
        .find_challenge(command.challenge_id)
        .await?
        .ok_or_else(|| DomainError::not_found("challenge", command.challenge_id))?;
    let graph = store
        .load_quest_graph(challenge.quest_id)
        .await?
        .ok_or_else(|| DomainError::not_found("quest", challenge.quest_id))?;
    let point_of_interest_id = graph
        .node(challenge.node_id)
        .ok_or_else(|| DomainError::not_found("node", challenge.node_id))?
        .point_of_interest_id;

    if store.has_correct_submission(challenge.id, submitter).await? {
        warn!("challenge already completed by submitter");
        return Err(DomainError::AlreadyCompleted {
            challenge_id: challenge.id,
        });
    }

    let [submission_id, capture_entry_id, completion_entry_id] = mint_ids(services.rng)?;
    let now = services.clock.now();
    let mut submission = Submission {
        id: submission_id,
        challenge_id: challenge.id,
        submitter,
        image_url: command.image_url.clone(),
        text: command.text.clone(),
        is_correct: false,
        reason: String::new(),
        created_at: now,
    };

    let verdict = services.judge.judge(&challenge, &submission).await?;
    if !verdict.successful {
        info!(reason = %verdict.reason, "submission rejected by judge");
        return Ok(SubmissionResult::rejected(verdict.reason));
    }
    submission.is_correct = true;
    submission.reason.clone_from(&verdict.reason);

    let quest_completed = graph.is_terminal(&challenge);
    let zone_id = store
        .find_zone_for_point_of_interest(point_of_interest_id)
        .await?
        .or(graph.quest.zone_id);
    let progression_target = match submitter {
        Submitter::UserId(user_id) => {
            let zone_id =
                zone_id.ok_or_else(|| DomainError::not_found("zone", point_of_interest_id))?;
            Some((user_id, zone_id))
        }
        Submitter::TeamId(_) => None,
    };

    let mut tx = store.begin().await?;
    tx.record_submission(&submission).await?;

    let items_awarded = allocate_items(&challenge, submitter, services.allocator).await?;

    let award = match progression_target {
        Some((user_id, zone_id)) => {
            let award = award_progression(tx.as_mut(), user_id, zone_id, quest_completed).await?;
            if award.levels_gained > 0 {
                services
                    .stat_pool
                    .credit_stat_points(user_id, settings.stat_points_per_level * award.levels_gained)
                    .await?;
            }
            Some(award)
        }
        None => None,
    };

    tx.append_audit_entry(&AuditEntry::for_submitter(
        capture_entry_id,
        submitter,
        feed::capture_message(submitter, point_of_interest_id, challenge.tier),
        now,
    ))
    .await?;
    if quest_completed {
        tx.append_audit_entry(&AuditEntry::for_submitter(
            completion_entry_id,
            submitter,
            feed::quest_completed_message(submitter, &graph.quest.name),
            now,
        ))
        .await?;
    }
    tx.commit().await?;

    let mut result = SubmissionResult {
        successful: true,
        reason: verdict.reason,
        quest_completed,
        items_awarded,
        zone_id,
        ..SubmissionResult::default()
    };
    if let Some(award) = award {
        result.experience_awarded = award.experience;
        result.reputation_awarded = award.reputation;
        result.level_up = award.levels_gained > 0;
        result.reputation_up = award.reputation_up;
    }

    info!(
        quest_id = %graph.quest.id,
        quest_completed,
        items = result.items_awarded.len(),
        experience = result.experience_awarded,
        "submission accepted"
    );

    Ok(result)
}
