//! Deep copy of a quest graph under fresh identifiers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use questline_core::rng::DeterministicRng;
use questline_quest::domain::graph::{
    Challenge, ChallengeEdge, Node, Quest, QuestGraph, QuestItemReward, RecurrenceSchedule,
};
use uuid::Uuid;

use super::frequency::RecurrenceFrequency;

/// A cloned graph plus the identifier mappings used to build it.
#[derive(Debug, Clone)]
pub struct ClonePlan {
    /// The new quest instance.
    pub graph: QuestGraph,
    /// Template node id to clone node id.
    pub node_ids: HashMap<Uuid, Uuid>,
    /// Template challenge id to clone challenge id.
    pub challenge_ids: HashMap<Uuid, Uuid>,
    /// Template edges left out because an endpoint had no clone.
    pub skipped_edges: Vec<Uuid>,
}

/// Where the clone sits in its recurring group.
#[derive(Debug, Clone, Copy)]
pub struct CloneSchedule {
    /// Group shared by every instance of the template.
    pub recurring_group_id: Uuid,
    /// Normalized frequency.
    pub frequency: RecurrenceFrequency,
    /// When the clone is next due.
    pub next_occurrence_at: DateTime<Utc>,
}

/// Copies `template` into a new quest that carries the schedule forward.
///
/// Nodes are copied in `order_index` order, followed by their challenges.
/// Item rewards without an item or a positive quantity are dropped. Edges are
/// copied once both endpoints have clones; an edge gated by a challenge that
/// was not copied becomes ungated.
pub fn plan_clone(
    template: &QuestGraph,
    schedule: CloneSchedule,
    now: DateTime<Utc>,
    rng: &mut dyn DeterministicRng,
) -> ClonePlan {
    let source = &template.quest;
    let quest_id = rng.next_uuid();

    let item_rewards = source
        .item_rewards
        .iter()
        .filter(|reward| reward.is_grantable())
        .map(|reward| QuestItemReward {
            id: rng.next_uuid(),
            inventory_item_id: reward.inventory_item_id,
            quantity: reward.quantity,
        })
        .collect();

    let quest = Quest {
        id: quest_id,
        name: source.name.clone(),
        description: source.description.clone(),
        acceptance_dialogue: source.acceptance_dialogue.clone(),
        image_url: source.image_url.clone(),
        zone_id: source.zone_id,
        quest_archetype_id: source.quest_archetype_id,
        quest_giver_character_id: source.quest_giver_character_id,
        gold: source.gold,
        item_rewards,
        schedule: Some(RecurrenceSchedule {
            frequency: schedule.frequency.as_str().to_owned(),
            next_occurrence_at: schedule.next_occurrence_at,
        }),
        recurring_group_id: Some(schedule.recurring_group_id),
        created_at: now,
        updated_at: now,
    };

    let ordered = template.nodes_in_order();
    let mut node_ids = HashMap::new();
    let mut challenge_ids = HashMap::new();
    let mut nodes = Vec::with_capacity(template.nodes.len());
    let mut challenges = Vec::with_capacity(template.challenges.len());

    for node in &ordered {
        let node_id = rng.next_uuid();
        node_ids.insert(node.id, node_id);
        nodes.push(Node {
            id: node_id,
            quest_id,
            ..(*node).clone()
        });

        for challenge in template.challenges_on(node.id) {
            let challenge_id = rng.next_uuid();
            challenge_ids.insert(challenge.id, challenge_id);
            challenges.push(Challenge {
                id: challenge_id,
                quest_id,
                node_id,
                ..challenge.clone()
            });
        }
    }

    let mut edges = Vec::with_capacity(template.edges.len());
    let mut skipped_edges = Vec::new();
    for node in &ordered {
        for edge in template.edges_from(node.id) {
            let (Some(from), Some(to)) = (
                node_ids.get(&edge.node_id),
                node_ids.get(&edge.next_node_id),
            ) else {
                skipped_edges.push(edge.id);
                continue;
            };
            edges.push(ChallengeEdge {
                id: rng.next_uuid(),
                node_id: *from,
                challenge_id: edge
                    .challenge_id
                    .and_then(|gate| challenge_ids.get(&gate).copied()),
                next_node_id: *to,
            });
        }
    }

    ClonePlan {
        graph: QuestGraph {
            quest,
            nodes,
            challenges,
            edges,
        },
        node_ids,
        challenge_ids,
        skipped_edges,
    }
}
