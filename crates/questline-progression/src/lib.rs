//! Questline: Progression Ledger.
//!
//! Pure counters and leveling curves for player experience and per-zone
//! reputation. Nothing here touches storage; callers load a counter, feed
//! points through a curve, and persist the result.

pub mod domain;

pub use domain::counter::ProgressionCounter;
pub use domain::curve::{LevelCurve, LevelingCurve, ReputationCurve};
pub use domain::rank::ReputationRank;
