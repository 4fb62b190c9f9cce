//! Domain layer for the Progression Ledger.

pub mod counter;
pub mod curve;
pub mod rank;
