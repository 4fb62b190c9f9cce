//! Domain layer for the Quest Graph context.

pub mod audit;
pub mod character;
pub mod graph;
pub mod location;
pub mod submission;
