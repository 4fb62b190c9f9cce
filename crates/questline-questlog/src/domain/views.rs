//! Read-only quest log views, serialized in camelCase for clients.

use std::collections::BTreeMap;

use questline_quest::domain::graph::Challenge;
use questline_quest::domain::location::PointOfInterest;
use questline_quest::domain::submission::Submission;
use serde::Serialize;
use uuid::Uuid;

/// One challenge as seen by the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveView {
    /// The challenge.
    pub challenge: Challenge,
    /// Whether any of the player's submissions for it was judged correct.
    pub is_completed: bool,
    /// The player's submissions for it, oldest first.
    pub submissions: Vec<Submission>,
}

/// One node of the tree, with its children keyed by gating challenge id
/// (target node id for ungated edges).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestNodeView {
    pub point_of_interest: PointOfInterest,
    pub objectives: Vec<ObjectiveView>,
    pub children: BTreeMap<Uuid, QuestNodeView>,
}

impl QuestNodeView {
    /// Whether every objective in this subtree is completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.objectives.iter().all(|objective| objective.is_completed)
            && self.children.values().all(QuestNodeView::is_completed)
    }
}

/// A quest with its tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestView {
    pub id: Uuid,
    pub is_completed: bool,
    pub root_node: QuestNodeView,
    pub image_url: String,
    pub name: String,
    pub description: String,
}

/// The player's quest log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLog {
    pub quests: Vec<QuestView>,
    /// Node id to the challenges still open on that node.
    pub pending_tasks: BTreeMap<Uuid, Vec<Challenge>>,
    /// Node id to the challenges already completed on that node.
    pub completed_tasks: BTreeMap<Uuid, Vec<Challenge>>,
}
