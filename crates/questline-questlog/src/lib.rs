//! Questline: Quest Log context.
//!
//! Read-only assembly of the quests around a player (and the ones they have
//! already started) into nested trees annotated with completion state.

pub mod application;
pub mod domain;
