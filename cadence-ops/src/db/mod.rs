//! Database queries for cadence-ops

pub mod reviews;
pub mod sequences;
pub mod sessions;
