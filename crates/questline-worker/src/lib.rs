//! Questline worker.
//!
//! Runs recurring quest batches on a fixed interval and executes JSON job
//! payloads read one per line from standard input.

pub mod config;
pub mod error;
pub mod runner;
pub mod state;
