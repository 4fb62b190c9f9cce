//! Questline quest stores.
//!
//! [`memory::InMemoryQuestStore`] keeps everything in process and is used
//! for development and tests. [`pg::PgQuestStore`] persists to PostgreSQL
//! using the schema in the workspace `migrations/` directory.

pub mod geo;
pub mod memory;
pub mod pg;
