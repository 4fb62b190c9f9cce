//! Builds the nested node tree of one quest.

use std::collections::{BTreeMap, HashMap, HashSet};

use questline_quest::domain::graph::{Challenge, Node, QuestGraph};
use questline_quest::domain::location::PointOfInterest;
use questline_quest::domain::submission::Submission;
use uuid::Uuid;

use super::views::{ObjectiveView, QuestNodeView, QuestView};

/// Per-node task lists collected while building a tree.
#[derive(Debug, Default)]
pub struct TaskIndex {
    /// Node id to open challenges.
    pub pending: BTreeMap<Uuid, Vec<Challenge>>,
    /// Node id to completed challenges.
    pub completed: BTreeMap<Uuid, Vec<Challenge>>,
    seen: HashSet<Uuid>,
}

impl TaskIndex {
    fn record(&mut self, node_id: Uuid, objectives: &[ObjectiveView]) {
        if !self.seen.insert(node_id) {
            return;
        }
        for objective in objectives {
            let bucket = if objective.is_completed {
                &mut self.completed
            } else {
                &mut self.pending
            };
            bucket
                .entry(node_id)
                .or_default()
                .push(objective.challenge.clone());
        }
    }
}

/// Assembles a quest's tree from its graph, the points of interest its
/// nodes are bound to, and the player's submissions grouped by challenge.
pub struct TreeBuilder<'a> {
    graph: &'a QuestGraph,
    points_of_interest: &'a HashMap<Uuid, PointOfInterest>,
    submissions: &'a HashMap<Uuid, Vec<Submission>>,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a builder over one quest.
    #[must_use]
    pub fn new(
        graph: &'a QuestGraph,
        points_of_interest: &'a HashMap<Uuid, PointOfInterest>,
        submissions: &'a HashMap<Uuid, Vec<Submission>>,
    ) -> Self {
        Self {
            graph,
            points_of_interest,
            submissions,
        }
    }

    /// Builds the quest view rooted at the quest's root node.
    ///
    /// Returns `None` when the quest has no root or its root's point of
    /// interest is unknown. Children whose point of interest is unknown are
    /// left out, as are edges that lead back onto the current path.
    pub fn build(&self, tasks: &mut TaskIndex) -> Option<QuestView> {
        let root = self.graph.root_node()?;
        let mut path = HashSet::new();
        let root_node = self.build_node(root, &mut path, tasks)?;
        let quest = &self.graph.quest;
        Some(QuestView {
            id: quest.id,
            is_completed: root_node.is_completed(),
            root_node,
            image_url: quest.image_url.clone(),
            name: quest.name.clone(),
            description: quest.description.clone(),
        })
    }

    fn build_node(
        &self,
        node: &Node,
        path: &mut HashSet<Uuid>,
        tasks: &mut TaskIndex,
    ) -> Option<QuestNodeView> {
        let point_of_interest = self.points_of_interest.get(&node.point_of_interest_id)?;
        path.insert(node.id);

        let objectives: Vec<ObjectiveView> = self
            .graph
            .challenges_on(node.id)
            .filter(|challenge| challenge.quest_id == self.graph.quest.id)
            .map(|challenge| self.objective(challenge))
            .collect();
        tasks.record(node.id, &objectives);

        let mut children = BTreeMap::new();
        for edge in self.graph.edges_from(node.id) {
            if path.contains(&edge.next_node_id) {
                continue;
            }
            let Some(next) = self.graph.node(edge.next_node_id) else {
                continue;
            };
            if let Some(child) = self.build_node(next, path, tasks) {
                children.insert(edge.challenge_id.unwrap_or(next.id), child);
            }
        }

        path.remove(&node.id);
        Some(QuestNodeView {
            point_of_interest: point_of_interest.clone(),
            objectives,
            children,
        })
    }

    fn objective(&self, challenge: &Challenge) -> ObjectiveView {
        let submissions = self
            .submissions
            .get(&challenge.id)
            .cloned()
            .unwrap_or_default();
        ObjectiveView {
            challenge: challenge.clone(),
            is_completed: submissions.iter().any(|submission| submission.is_correct),
            submissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_quest::domain::submission::Submitter;
    use questline_test_support::{QuestGraphBuilder, fixed_now, point_of_interest};

    struct Fixture {
        graph: QuestGraph,
        points: HashMap<Uuid, PointOfInterest>,
        nodes: Vec<Uuid>,
        challenges: Vec<Uuid>,
    }

    /// root(c0) --c0--> a(c1) --c1--> b(c2)
    ///    \--ungated--> d(c3)
    fn branching() -> Fixture {
        let mut builder = QuestGraphBuilder::new("Branching");
        let mut points = HashMap::new();
        let mut nodes = Vec::new();
        let mut challenges = Vec::new();
        for order in 0..4 {
            let point = point_of_interest(&[]);
            let node = builder.node_at(order, point.id);
            challenges.push(builder.challenge(node, order + 1));
            nodes.push(node);
            points.insert(point.id, point);
        }
        builder.edge(nodes[0], Some(challenges[0]), nodes[1]);
        builder.edge(nodes[1], Some(challenges[1]), nodes[2]);
        builder.edge(nodes[0], None, nodes[3]);
        Fixture {
            graph: builder.build(),
            points,
            nodes,
            challenges,
        }
    }

    fn submission(challenge_id: Uuid, is_correct: bool) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            challenge_id,
            submitter: Submitter::UserId(Uuid::new_v4()),
            image_url: None,
            text: Some("answer".to_owned()),
            is_correct,
            reason: String::new(),
            created_at: fixed_now(),
        }
    }

    #[test]
    fn test_children_are_keyed_by_gate_or_target_node() {
        // Arrange
        let fixture = branching();
        let submissions = HashMap::new();
        let mut tasks = TaskIndex::default();

        // Act
        let view = TreeBuilder::new(&fixture.graph, &fixture.points, &submissions)
            .build(&mut tasks)
            .unwrap();

        // Assert
        let root = &view.root_node;
        assert_eq!(root.children.len(), 2);
        assert!(root.children.contains_key(&fixture.challenges[0]));
        assert!(root.children.contains_key(&fixture.nodes[3]));
        let a = &root.children[&fixture.challenges[0]];
        assert!(a.children.contains_key(&fixture.challenges[1]));
    }

    #[test]
    fn test_quest_completed_only_when_every_objective_is() {
        let fixture = branching();
        let mut submissions: HashMap<Uuid, Vec<Submission>> = fixture
            .challenges
            .iter()
            .map(|id| (*id, vec![submission(*id, true)]))
            .collect();

        let complete = TreeBuilder::new(&fixture.graph, &fixture.points, &submissions)
            .build(&mut TaskIndex::default())
            .unwrap();
        assert!(complete.is_completed);

        submissions.insert(fixture.challenges[2], vec![submission(fixture.challenges[2], false)]);
        let partial = TreeBuilder::new(&fixture.graph, &fixture.points, &submissions)
            .build(&mut TaskIndex::default())
            .unwrap();
        assert!(!partial.is_completed);
    }

    #[test]
    fn test_objective_lists_submissions_and_completion() {
        // Arrange
        let fixture = branching();
        let root_challenge = fixture.challenges[0];
        let submissions = HashMap::from([(
            root_challenge,
            vec![submission(root_challenge, false), submission(root_challenge, true)],
        )]);

        // Act
        let view = TreeBuilder::new(&fixture.graph, &fixture.points, &submissions)
            .build(&mut TaskIndex::default())
            .unwrap();

        // Assert
        let objective = &view.root_node.objectives[0];
        assert!(objective.is_completed);
        assert_eq!(objective.submissions.len(), 2);
    }

    #[test]
    fn test_task_index_splits_pending_and_completed_per_node() {
        let fixture = branching();
        let done = fixture.challenges[1];
        let submissions = HashMap::from([(done, vec![submission(done, true)])]);
        let mut tasks = TaskIndex::default();

        TreeBuilder::new(&fixture.graph, &fixture.points, &submissions).build(&mut tasks);

        assert_eq!(tasks.completed.len(), 1);
        assert_eq!(tasks.completed[&fixture.nodes[1]][0].id, done);
        assert_eq!(tasks.pending.len(), 3);
        assert!(!tasks.pending.contains_key(&fixture.nodes[1]));
    }

    #[test]
    fn test_back_edge_is_cut_at_first_revisit() {
        // Arrange
        let mut fixture = branching();
        let back = questline_quest::domain::graph::ChallengeEdge {
            id: Uuid::new_v4(),
            node_id: fixture.nodes[2],
            challenge_id: Some(fixture.challenges[2]),
            next_node_id: fixture.nodes[1],
        };
        fixture.graph.edges.push(back);
        let submissions = HashMap::new();

        // Act
        let view = TreeBuilder::new(&fixture.graph, &fixture.points, &submissions)
            .build(&mut TaskIndex::default())
            .unwrap();

        // Assert
        let b = &view.root_node.children[&fixture.challenges[0]].children[&fixture.challenges[1]];
        assert!(b.children.is_empty());
    }

    #[test]
    fn test_challenges_of_other_quests_are_not_objectives() {
        let mut fixture = branching();
        fixture.graph.challenges[0].quest_id = Uuid::new_v4();
        let submissions = HashMap::new();

        let view = TreeBuilder::new(&fixture.graph, &fixture.points, &submissions)
            .build(&mut TaskIndex::default())
            .unwrap();

        assert!(view.root_node.objectives.is_empty());
    }

    #[test]
    fn test_quest_without_root_builds_nothing() {
        let mut fixture = branching();
        let back = questline_quest::domain::graph::ChallengeEdge {
            id: Uuid::new_v4(),
            node_id: fixture.nodes[3],
            challenge_id: None,
            next_node_id: fixture.nodes[0],
        };
        fixture.graph.edges.push(back);
        let submissions = HashMap::new();

        let view = TreeBuilder::new(&fixture.graph, &fixture.points, &submissions)
            .build(&mut TaskIndex::default());

        assert!(view.is_none());
    }
}
