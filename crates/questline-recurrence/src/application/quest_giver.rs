//! Keeps quest-giving characters pointed at the live instance of a quest.

use std::sync::Mutex;

use questline_core::error::DomainError;
use questline_core::rng::DeterministicRng;
use questline_quest::domain::character::CharacterAction;
use questline_quest::repository::QuestTransaction;
use tracing::debug;
use uuid::Uuid;

/// Gives `character_id` a give-quest action for `quest_id` unless it already
/// has one. Returns whether an action was created.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails or the RNG mutex
/// is poisoned.
pub async fn ensure_quest_action_for_character(
    tx: &mut dyn QuestTransaction,
    rng: &Mutex<dyn DeterministicRng + Send>,
    character_id: Uuid,
    quest_id: Uuid,
) -> Result<bool, DomainError> {
    let actions = tx.find_character_actions(character_id).await?;
    if actions.iter().any(|action| action.gives_quest(quest_id)) {
        return Ok(false);
    }

    let action_id = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        rng_guard.next_uuid()
    };
    tx.insert_character_action(&CharacterAction::give_quest(action_id, character_id, quest_id))
        .await?;
    debug!(%character_id, %quest_id, "attached give-quest action");
    Ok(true)
}

/// Removes every give-quest action of `character_id` that points at
/// `quest_id`. Returns how many were removed.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn remove_quest_action_for_character(
    tx: &mut dyn QuestTransaction,
    character_id: Uuid,
    quest_id: Uuid,
) -> Result<usize, DomainError> {
    let actions = tx.find_character_actions(character_id).await?;
    let mut removed = 0;
    for action in actions.iter().filter(|action| action.gives_quest(quest_id)) {
        tx.delete_character_action(action.id).await?;
        removed += 1;
    }
    if removed > 0 {
        debug!(%character_id, %quest_id, removed, "detached give-quest actions");
    }
    Ok(removed)
}
