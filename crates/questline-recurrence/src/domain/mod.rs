//! Domain layer for the Recurrence context.

pub mod clone;
pub mod commands;
pub mod frequency;
pub mod jobs;
pub mod report;
