//! Questline Quest: the quest graph model and the store contracts the
//! engine runs against.

pub mod domain;
pub mod repository;
