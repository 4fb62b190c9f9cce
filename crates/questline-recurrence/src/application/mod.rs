//! Application layer for the Recurrence context.

pub mod command_handlers;
pub mod quest_giver;
