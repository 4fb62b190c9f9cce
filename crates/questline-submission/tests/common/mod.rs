//! Shared setup for submission integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use questline_core::rng::DeterministicRng;
use questline_quest::domain::location::PointOfInterest;
use questline_store::memory::InMemoryQuestStore;
use questline_submission::application::command_handlers::SubmissionServices;
use questline_submission::collaborators::{ChallengeJudge, RewardAllocator};
use questline_submission::domain::commands::SubmitChallenge;
use questline_test_support::{
    FixedClock, QuestGraphBuilder, RecordingAllocator, RecordingStatPool, ScriptedJudge,
    SeededRng, fixed_now, point_of_interest,
};
use uuid::Uuid;

/// A two-node quest seeded into a store.
///
/// `root` carries `gate` (tier 1), which unlocks the edge to `leaf`.
/// `leaf` carries `finale` (tier 2, item 42), the terminal challenge.
pub struct Campaign {
    pub quest_id: Uuid,
    pub zone_id: Uuid,
    pub root_point: PointOfInterest,
    pub leaf_point: PointOfInterest,
    pub gate: Uuid,
    pub finale: Uuid,
}

pub fn seed_campaign(store: &InMemoryQuestStore) -> Campaign {
    let zone_id = Uuid::new_v4();
    let root_point = point_of_interest(&["harbour"]);
    let leaf_point = point_of_interest(&["lighthouse"]);

    let mut builder = QuestGraphBuilder::new("Harbour Lights");
    let root = builder.node_at(0, root_point.id);
    let leaf = builder.node_at(1, leaf_point.id);
    let gate = builder.challenge(root, 1);
    let finale = builder.challenge_with_item(leaf, 2, 42);
    builder.edge(root, Some(gate), leaf);
    let graph = builder.build();
    let quest_id = graph.quest.id;

    store.seed_point_of_interest(root_point.clone(), Some(zone_id));
    store.seed_point_of_interest(leaf_point.clone(), Some(zone_id));
    store.seed_quest_graph(graph);

    Campaign {
        quest_id,
        zone_id,
        root_point,
        leaf_point,
        gate,
        finale,
    }
}

pub fn user_submits(challenge_id: Uuid, user_id: Uuid) -> SubmitChallenge {
    SubmitChallenge {
        correlation_id: Uuid::new_v4(),
        challenge_id,
        user_id: Some(user_id),
        team_id: None,
        image_url: Some("https://images.example/capture.jpg".to_owned()),
        text: None,
    }
}

pub fn team_submits(challenge_id: Uuid, team_id: Uuid) -> SubmitChallenge {
    SubmitChallenge {
        correlation_id: Uuid::new_v4(),
        challenge_id,
        user_id: None,
        team_id: Some(team_id),
        image_url: None,
        text: Some("the red lighthouse".to_owned()),
    }
}

/// Everything a submission needs, backed by an in-memory store and
/// recording collaborators.
pub struct Harness<J = ScriptedJudge, A = RecordingAllocator, R = SeededRng> {
    pub store: InMemoryQuestStore,
    pub clock: FixedClock,
    pub rng: Mutex<R>,
    pub judge: J,
    pub allocator: A,
    pub stat_pool: RecordingStatPool,
}

impl Harness {
    pub fn accepting() -> Self {
        Self::with(ScriptedJudge::accepting(), RecordingAllocator::new())
    }
}

impl<J: ChallengeJudge, A: RewardAllocator> Harness<J, A> {
    pub fn with(judge: J, allocator: A) -> Self {
        Self {
            store: InMemoryQuestStore::new(),
            clock: FixedClock(fixed_now()),
            rng: Mutex::new(SeededRng::new(42)),
            judge,
            allocator,
            stat_pool: RecordingStatPool::new(),
        }
    }

    pub fn with_rng<R: DeterministicRng + Send + 'static>(self, rng: R) -> Harness<J, A, R> {
        Harness {
            store: self.store,
            clock: self.clock,
            rng: Mutex::new(rng),
            judge: self.judge,
            allocator: self.allocator,
            stat_pool: self.stat_pool,
        }
    }
}

impl<J: ChallengeJudge, A: RewardAllocator, R: DeterministicRng + Send + 'static> Harness<J, A, R> {
    pub fn services(&self) -> SubmissionServices<'_> {
        SubmissionServices {
            clock: &self.clock,
            rng: &self.rng,
            store: &self.store,
            judge: &self.judge,
            allocator: &self.allocator,
            stat_pool: &self.stat_pool,
        }
    }
}
