//! Questline Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that every quest
//! context depends on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod rng;
