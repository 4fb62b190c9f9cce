//! Quest graph fixtures.

use questline_quest::domain::graph::{
    Challenge, ChallengeEdge, Node, Quest, QuestGraph, QuestItemReward, SubmissionType,
};
use questline_quest::domain::location::PointOfInterest;
use uuid::Uuid;

use crate::clock::fixed_now;

/// Builds a quest graph node by node. Every id is a fresh random UUID; the
/// methods return the id of what they added.
#[derive(Debug)]
pub struct QuestGraphBuilder {
    graph: QuestGraph,
}

impl QuestGraphBuilder {
    /// An empty, unscheduled quest named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let now = fixed_now();
        Self {
            graph: QuestGraph {
                quest: Quest {
                    id: Uuid::new_v4(),
                    name: name.to_owned(),
                    description: format!("{name} description"),
                    acceptance_dialogue: vec!["Are you ready?".to_owned()],
                    image_url: format!("https://images.example/{}.png", name.to_lowercase()),
                    zone_id: None,
                    quest_archetype_id: None,
                    quest_giver_character_id: None,
                    gold: 0,
                    item_rewards: Vec::new(),
                    schedule: None,
                    recurring_group_id: None,
                    created_at: now,
                    updated_at: now,
                },
                nodes: Vec::new(),
                challenges: Vec::new(),
                edges: Vec::new(),
            },
        }
    }

    /// The quest record, for setting zone, schedule, gold and the like.
    pub fn quest_mut(&mut self) -> &mut Quest {
        &mut self.graph.quest
    }

    /// Adds a node bound to a new, unseeded point of interest.
    pub fn node(&mut self, order_index: i32) -> Uuid {
        self.node_at(order_index, Uuid::new_v4())
    }

    /// Adds a node bound to `point_of_interest_id`.
    pub fn node_at(&mut self, order_index: i32, point_of_interest_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.graph.nodes.push(Node {
            id,
            quest_id: self.graph.quest.id,
            order_index,
            point_of_interest_id,
            submission_type: SubmissionType::Photo,
        });
        id
    }

    /// Adds a challenge with no specific item reward.
    pub fn challenge(&mut self, node_id: Uuid, tier: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.graph.challenges.push(Challenge {
            id,
            quest_id: self.graph.quest.id,
            node_id,
            tier,
            question: format!("Tier {tier} task"),
            reward: tier * 10,
            inventory_item_id: None,
            difficulty: tier,
            stat_tags: vec!["perception".to_owned()],
            proficiency: None,
        });
        id
    }

    /// Adds a challenge that grants `inventory_item_id` on capture.
    pub fn challenge_with_item(&mut self, node_id: Uuid, tier: i32, inventory_item_id: i32) -> Uuid {
        let id = self.challenge(node_id, tier);
        if let Some(challenge) = self.graph.challenges.last_mut() {
            challenge.inventory_item_id = Some(inventory_item_id);
        }
        id
    }

    /// Adds an edge from `from` to `to`, gated by `gate` if given.
    pub fn edge(&mut self, from: Uuid, gate: Option<Uuid>, to: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.graph.edges.push(ChallengeEdge {
            id,
            node_id: from,
            challenge_id: gate,
            next_node_id: to,
        });
        id
    }

    /// Adds a turn-in item reward.
    pub fn reward(&mut self, inventory_item_id: Option<i32>, quantity: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.graph.quest.item_rewards.push(QuestItemReward {
            id,
            inventory_item_id,
            quantity,
        });
        id
    }

    /// Finishes the graph.
    #[must_use]
    pub fn build(self) -> QuestGraph {
        self.graph
    }
}

/// A point of interest at the origin carrying `tags`.
#[must_use]
pub fn point_of_interest(tags: &[&str]) -> PointOfInterest {
    point_of_interest_at(0.0, 0.0, tags)
}

/// A point of interest at the given coordinates carrying `tags`.
#[must_use]
pub fn point_of_interest_at(lat: f64, lng: f64, tags: &[&str]) -> PointOfInterest {
    let id = Uuid::new_v4();
    PointOfInterest {
        id,
        name: format!("Point {}", &id.to_string()[..8]),
        description: String::new(),
        image_url: String::new(),
        lat,
        lng,
        tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
    }
}
