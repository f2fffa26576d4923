//! # Cadence Operations Service (cadence-ops)
//!
//! Backend service for the sales-operations dashboard core: the follow-up
//! sequence engine and the spaced-repetition trainer scheduler.
//!
//! **Purpose:** Drive warm leads through a time-gated 5-step outreach
//! cadence, track per-skill mastery with an SM-2 variant, and rank which
//! skills are due for review, behind an HTTP/JSON control interface.
//!
//! **Architecture:** Stateless request handlers over a shared SQLite store.
//! All time-based transitions are evaluated lazily at read time against an
//! injected clock; there is no background scheduler.

pub mod api;
pub mod db;
pub mod error;
pub mod followup;
pub mod trainer;

pub use error::{Error, Result};
