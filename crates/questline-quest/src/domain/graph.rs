//! The quest graph: a quest and its location-bound nodes, challenges and edges.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recurrence settings carried by a quest that regenerates on a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceSchedule {
    /// Raw frequency as stored (`daily`, `weekly`, `monthly`, possibly with
    /// stray whitespace or casing).
    pub frequency: String,
    /// When the quest is next due to regenerate.
    pub next_occurrence_at: DateTime<Utc>,
}

/// An item handed out when the quest is turned in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestItemReward {
    /// Reward identifier.
    pub id: Uuid,
    /// Inventory item granted, if one is set.
    pub inventory_item_id: Option<i32>,
    /// How many of the item are granted.
    pub quantity: i32,
}

impl QuestItemReward {
    /// A reward is only worth carrying over when it names an item and a
    /// positive quantity.
    #[must_use]
    pub fn is_grantable(&self) -> bool {
        self.inventory_item_id.is_some_and(|id| id != 0) && self.quantity > 0
    }
}

/// The named container for one rooted challenge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    /// Quest identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Lines the quest giver speaks when the quest is accepted.
    #[serde(default)]
    pub acceptance_dialogue: Vec<String>,
    /// Cover image.
    pub image_url: String,
    /// Zone the quest belongs to, if any.
    pub zone_id: Option<Uuid>,
    /// Archetype the quest was generated from, if any.
    pub quest_archetype_id: Option<Uuid>,
    /// Character that hands out the quest, if any.
    pub quest_giver_character_id: Option<Uuid>,
    /// Gold granted on turn-in.
    pub gold: i32,
    /// Items granted on turn-in.
    #[serde(default)]
    pub item_rewards: Vec<QuestItemReward>,
    /// Present while the quest is scheduled to regenerate.
    pub schedule: Option<RecurrenceSchedule>,
    /// Shared by every instance spawned from the same recurring template.
    pub recurring_group_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// How a node expects its challenges to be answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    /// Photo evidence.
    #[default]
    Photo,
    /// Free text answer.
    Text,
    /// Video evidence.
    Video,
}

impl SubmissionType {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Text => "text",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionType {
    type Err = DomainError;

    /// Blank values fall back to the default.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "photo" => Ok(Self::Photo),
            "text" => Ok(Self::Text),
            "video" => Ok(Self::Video),
            other => Err(DomainError::Validation(format!(
                "unknown submission type {other:?}"
            ))),
        }
    }
}

/// A graph vertex bound to one point of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node identifier.
    pub id: Uuid,
    /// Owning quest.
    pub quest_id: Uuid,
    /// Authoring order within the quest.
    pub order_index: i32,
    /// Location this node is bound to.
    pub point_of_interest_id: Uuid,
    /// Expected answer format.
    #[serde(default)]
    pub submission_type: SubmissionType,
}

/// A task attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Challenge identifier.
    pub id: Uuid,
    /// Quest the challenge belongs to.
    pub quest_id: Uuid,
    /// Node the challenge is attached to.
    pub node_id: Uuid,
    /// Difficulty ordinal, shown as a roman numeral.
    pub tier: i32,
    /// Prompt shown to the player.
    pub question: String,
    /// Gold reward.
    pub reward: i32,
    /// Specific inventory item granted on capture, if any.
    pub inventory_item_id: Option<i32>,
    /// Judge difficulty.
    pub difficulty: i32,
    /// Stat tags used for proficiency checks.
    #[serde(default)]
    pub stat_tags: Vec<String>,
    /// Proficiency the challenge exercises, if any.
    pub proficiency: Option<String>,
}

/// Edge from a node (optionally gated by one of its challenges) to the next node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeEdge {
    /// Edge identifier.
    pub id: Uuid,
    /// Source node.
    pub node_id: Uuid,
    /// Challenge that unlocks the edge; `None` for an ungated edge.
    pub challenge_id: Option<Uuid>,
    /// Target node.
    pub next_node_id: Uuid,
}

/// A quest with its full graph materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestGraph {
    /// The quest record.
    pub quest: Quest,
    /// Member nodes.
    pub nodes: Vec<Node>,
    /// Challenges on the member nodes.
    pub challenges: Vec<Challenge>,
    /// Edges between member nodes.
    pub edges: Vec<ChallengeEdge>,
}

impl QuestGraph {
    /// Looks up a member node.
    #[must_use]
    pub fn node(&self, node_id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    /// Looks up a challenge of this quest.
    #[must_use]
    pub fn challenge(&self, challenge_id: Uuid) -> Option<&Challenge> {
        self.challenges
            .iter()
            .find(|challenge| challenge.id == challenge_id)
    }

    /// Member nodes sorted by `order_index` (stable for ties).
    #[must_use]
    pub fn nodes_in_order(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_by_key(|node| node.order_index);
        nodes
    }

    /// Challenges attached to `node_id`, in stored order.
    pub fn challenges_on(&self, node_id: Uuid) -> impl Iterator<Item = &Challenge> {
        self.challenges
            .iter()
            .filter(move |challenge| challenge.node_id == node_id)
    }

    /// Edges leaving `node_id`.
    pub fn edges_from(&self, node_id: Uuid) -> impl Iterator<Item = &ChallengeEdge> {
        self.edges.iter().filter(move |edge| edge.node_id == node_id)
    }

    /// Edges that completing `challenge` unlocks: those gated by it plus the
    /// ungated edges leaving its node.
    pub fn outgoing_edges<'a>(
        &'a self,
        challenge: &'a Challenge,
    ) -> impl Iterator<Item = &'a ChallengeEdge> {
        self.edges_from(challenge.node_id)
            .filter(move |edge| edge.challenge_id.is_none_or(|id| id == challenge.id))
    }

    /// Whether completing `challenge` ends its path through the graph.
    #[must_use]
    pub fn is_terminal(&self, challenge: &Challenge) -> bool {
        self.outgoing_edges(challenge).next().is_none()
    }

    /// Nodes without an incoming edge, in `order_index` order.
    #[must_use]
    pub fn roots(&self) -> Vec<&Node> {
        let targets: HashSet<Uuid> = self.edges.iter().map(|edge| edge.next_node_id).collect();
        self.nodes_in_order()
            .into_iter()
            .filter(|node| !targets.contains(&node.id))
            .collect()
    }

    /// The root node, or `None` when every node has an incoming edge.
    #[must_use]
    pub fn root_node(&self) -> Option<&Node> {
        self.roots().into_iter().next()
    }

    /// Checks the structural invariants: every node and challenge belongs to
    /// this quest, every challenge sits on a member node, every edge connects
    /// member nodes through a known challenge, and exactly one node is a root.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        let quest_id = self.quest.id;
        let node_ids: HashSet<Uuid> = self.nodes.iter().map(|node| node.id).collect();
        let challenge_ids: HashSet<Uuid> = self.challenges.iter().map(|c| c.id).collect();

        if let Some(node) = self.nodes.iter().find(|node| node.quest_id != quest_id) {
            return Err(DomainError::Validation(format!(
                "node {} belongs to quest {}, not {quest_id}",
                node.id, node.quest_id
            )));
        }

        for challenge in &self.challenges {
            if challenge.quest_id != quest_id {
                return Err(DomainError::Validation(format!(
                    "challenge {} belongs to quest {}, not {quest_id}",
                    challenge.id, challenge.quest_id
                )));
            }
            if !node_ids.contains(&challenge.node_id) {
                return Err(DomainError::Validation(format!(
                    "challenge {} references unknown node {}",
                    challenge.id, challenge.node_id
                )));
            }
        }

        for edge in &self.edges {
            if !node_ids.contains(&edge.node_id) || !node_ids.contains(&edge.next_node_id) {
                return Err(DomainError::Validation(format!(
                    "edge {} connects nodes outside quest {quest_id}",
                    edge.id
                )));
            }
            if let Some(challenge_id) = edge.challenge_id {
                if !challenge_ids.contains(&challenge_id) {
                    return Err(DomainError::Validation(format!(
                        "edge {} is gated by unknown challenge {challenge_id}",
                        edge.id
                    )));
                }
            }
        }

        match self.roots().len() {
            1 => Ok(()),
            count => Err(DomainError::Validation(format!(
                "quest {quest_id} must have exactly one root node, found {count}"
            ))),
        }
    }
}
