//! Application layer for the Submission Processing context.

pub mod command_handlers;
