//! Application layer for the Quest Log context.

pub mod query_handlers;
