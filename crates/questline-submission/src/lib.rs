//! Questline: Submission Processing context.
//!
//! Judges answers to challenges, detects quest completion, and awards items,
//! experience and zone reputation for correct answers.

pub mod application;
pub mod collaborators;
pub mod domain;
