//! Shared test doubles and fixtures for the Questline quest engine.

mod clock;
mod collaborators;
mod fixtures;
mod rng;
mod store;

pub use clock::{FixedClock, fixed_now};
pub use collaborators::{
    Allocation, FailingAllocator, FailingJudge, FailingStatPool, RecordingAllocator,
    RecordingStatPool, ScriptedJudge,
};
pub use fixtures::{QuestGraphBuilder, point_of_interest, point_of_interest_at};
pub use rng::{SeededRng, SequenceRng};
pub use store::FailingQuestStore;
