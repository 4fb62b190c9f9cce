//! Command handlers for the Recurrence context.
//!
//! Each quest is regenerated in its own store transaction. The transaction
//! claims the template first and re-checks that it is still due, so two
//! overlapping runs cannot both clone it.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use questline_core::clock::Clock;
use questline_core::command::Command;
use questline_core::error::DomainError;
use questline_core::rng::DeterministicRng;
use questline_quest::repository::QuestGraphStore;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::application::quest_giver::{
    ensure_quest_action_for_character, remove_quest_action_for_character,
};
use crate::collaborators::QuestGenerator;
use crate::domain::clone::{CloneSchedule, plan_clone};
use crate::domain::commands::{ProcessDueRecurringQuests, ProcessRecurringQuest};
use crate::domain::frequency::{RecurrenceFrequency, advance_next_occurrence};
use crate::domain::jobs::JobPayload;
use crate::domain::report::{
    RecurrenceOutcome, RecurrenceReport, RecurrenceSettings, RegeneratedQuest,
};

/// Everything the recurrence handlers talk to.
#[derive(Clone, Copy)]
pub struct RecurrenceServices<'a> {
    /// Decides what is due.
    pub clock: &'a dyn Clock,
    /// Id source for clones. Locked only while minting ids.
    pub rng: &'a Mutex<dyn DeterministicRng + Send>,
    /// Quest store.
    pub store: &'a dyn QuestGraphStore,
}

/// What a dispatched job did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// A recurring quest job ran.
    Recurrence(RecurrenceOutcome),
    /// The generator produced a quest.
    Generated { quest_id: Uuid },
}

async fn regenerate(
    quest_id: Uuid,
    now: DateTime<Utc>,
    services: RecurrenceServices<'_>,
) -> Result<RecurrenceOutcome, DomainError> {
    let skipped = |reason: &str| RecurrenceOutcome::Skipped {
        quest_id,
        reason: reason.to_owned(),
    };

    let mut tx = services.store.begin().await?;
    let template = tx
        .claim_quest(quest_id)
        .await?
        .ok_or_else(|| DomainError::not_found("quest", quest_id))?;

    let Some(schedule) = template.quest.schedule.clone() else {
        return Ok(skipped("quest is not scheduled"));
    };
    if schedule.next_occurrence_at > now {
        return Ok(skipped("quest is not due"));
    }
    let frequency: RecurrenceFrequency = match schedule.frequency.parse() {
        Ok(frequency) => frequency,
        Err(e) => {
            warn!(%quest_id, frequency = %schedule.frequency, "skipping recurring quest: {e}");
            return Ok(skipped(&e.to_string()));
        }
    };
    let next_occurrence_at =
        advance_next_occurrence(Some(schedule.next_occurrence_at), now, frequency).ok_or_else(
            || DomainError::Validation(format!("schedule of quest {quest_id} overflows")),
        )?;

    // Lock RNG only while minting ids, never across an await.
    let plan = {
        let mut rng_guard = services
            .rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        let recurring_group_id = template
            .quest
            .recurring_group_id
            .unwrap_or_else(|| rng_guard.next_uuid());
        let schedule = CloneSchedule {
            recurring_group_id,
            frequency,
            next_occurrence_at,
        };
        plan_clone(&template, schedule, now, &mut *rng_guard)
    };
    for edge_id in &plan.skipped_edges {
        warn!(%quest_id, %edge_id, "edge endpoint missing from clone; edge skipped");
    }

    let clone_id = plan.graph.quest.id;
    let recurring_group_id = plan
        .graph
        .quest
        .recurring_group_id
        .ok_or_else(|| DomainError::Infrastructure("clone lost its recurring group".to_owned()))?;
    tx.insert_quest_graph(&plan.graph).await?;

    if let Some(character_id) = template.quest.quest_giver_character_id {
        remove_quest_action_for_character(tx.as_mut(), character_id, quest_id).await?;
        ensure_quest_action_for_character(tx.as_mut(), services.rng, character_id, clone_id)
            .await?;
    }

    let mut retired = template.quest;
    retired.recurring_group_id = Some(recurring_group_id);
    retired.schedule = None;
    retired.updated_at = now;
    tx.update_quest(&retired).await?;
    tx.commit().await?;

    info!(%quest_id, new_quest_id = %clone_id, %next_occurrence_at, "recurring quest regenerated");
    Ok(RecurrenceOutcome::Regenerated(RegeneratedQuest {
        original_quest_id: quest_id,
        new_quest_id: clone_id,
        recurring_group_id,
        next_occurrence_at,
    }))
}

/// Handles the `ProcessDueRecurringQuests` command: regenerates up to
/// `settings.batch_size` due quests.
///
/// A quest that fails is recorded as `DomainError::PartialCloneFailure` in
/// the report and the batch carries on.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` only if the due quests cannot be
/// listed.
#[instrument(
    skip_all,
    fields(
        context = command.context(),
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
    )
)]
pub async fn handle_process_due_recurring_quests(
    command: &ProcessDueRecurringQuests,
    settings: &RecurrenceSettings,
    services: RecurrenceServices<'_>,
) -> Result<RecurrenceReport, DomainError> {
    let now = services.clock.now();
    let due = services
        .store
        .find_due_recurring_quest_ids(now, settings.batch_size)
        .await?;
    if due.is_empty() {
        info!("no recurring quests due");
        return Ok(RecurrenceReport::default());
    }
    info!(due = due.len(), "processing recurring quests");

    let mut report = RecurrenceReport::default();
    for quest_id in due {
        match regenerate(quest_id, now, services).await {
            Ok(RecurrenceOutcome::Regenerated(regenerated)) => report.regenerated.push(regenerated),
            Ok(RecurrenceOutcome::Skipped { quest_id, reason }) => {
                report.skipped.push((quest_id, reason));
            }
            Err(e) => {
                error!(%quest_id, error = %e, "failed to regenerate recurring quest");
                report.failed.push(DomainError::PartialCloneFailure {
                    quest_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        regenerated = report.regenerated.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "recurring quest batch finished"
    );
    Ok(report)
}

/// Handles the `ProcessRecurringQuest` command: regenerates one quest if it
/// is scheduled and due.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the quest does not exist, or the
/// store's error if regeneration fails.
#[instrument(
    skip_all,
    fields(
        context = command.context(),
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        quest_id = %command.quest_id,
    )
)]
pub async fn handle_process_recurring_quest(
    command: &ProcessRecurringQuest,
    services: RecurrenceServices<'_>,
) -> Result<RecurrenceOutcome, DomainError> {
    regenerate(command.quest_id, services.clock.now(), services).await
}

/// Runs a queued job.
///
/// # Errors
///
/// Propagates the error of the recurrence handler or the generator.
#[instrument(skip_all, fields(%correlation_id, payload = ?payload))]
pub async fn dispatch_job(
    payload: JobPayload,
    correlation_id: Uuid,
    services: RecurrenceServices<'_>,
    generator: &dyn QuestGenerator,
) -> Result<JobOutcome, DomainError> {
    match payload {
        JobPayload::RecurringQuest { quest_id } => {
            let command = ProcessRecurringQuest {
                correlation_id,
                quest_id,
            };
            let outcome = handle_process_recurring_quest(&command, services).await?;
            Ok(JobOutcome::Recurrence(outcome))
        }
        JobPayload::GenerateQuest {
            zone_id,
            quest_archetype_id,
        } => {
            let quest_id = generator.generate_quest(zone_id, quest_archetype_id).await?;
            info!(%zone_id, %quest_archetype_id, %quest_id, "quest generated");
            Ok(JobOutcome::Generated { quest_id })
        }
    }
}
