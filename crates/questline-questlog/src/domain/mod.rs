//! Domain layer for the Quest Log context.

pub mod filter;
pub mod tree;
pub mod views;
