//! Domain layer for the Submission Processing context.

pub mod commands;
pub mod feed;
pub mod results;
pub mod settings;
