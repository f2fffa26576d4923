//! # Cadence Common Library
//!
//! Shared code for the Cadence sales-operations services including:
//! - Database schema initialization and connection setup
//! - Domain models (follow-up sequences, review records, training sessions)
//! - Configuration loading and root folder resolution
//! - Clock abstraction for deterministic time handling
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
pub use time::{Clock, SystemClock};
