//! Questline: Recurrence context.
//!
//! Regenerates scheduled quests by deep-cloning their graph under fresh
//! identifiers, keeps quest givers pointing at the live instance, and
//! dispatches background job payloads.

pub mod application;
pub mod collaborators;
pub mod domain;
