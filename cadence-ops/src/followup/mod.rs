//! Follow-up sequence operations
//!
//! Orchestrates the engine transitions against the database: each operation
//! is read -> pure transition -> one version-checked write. The listing
//! operation is also where lazy time-based transitions are applied and
//! persisted, so stored state converges to wall-clock reality as callers
//! poll.

pub mod engine;

use crate::db::sequences;
use crate::error::{Error, Result};
use cadence_common::db::models::{FollowUpSequence, SequenceStatus};
use cadence_common::time::Clock;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Create a follow-up sequence for a warm call
///
/// Rejects a second sequence for the same call; the relationship is
/// one-to-one.
pub async fn create_sequence(
    pool: &SqlitePool,
    clock: &dyn Clock,
    call_analysis_guid: Uuid,
    contact_name: String,
) -> Result<FollowUpSequence> {
    if contact_name.trim().is_empty() {
        return Err(Error::Validation("contact_name is required".to_string()));
    }
    if sequences::get_by_call(pool, call_analysis_guid).await?.is_some() {
        return Err(Error::InvalidState(format!(
            "sequence already exists for call {}",
            call_analysis_guid
        )));
    }

    let seq = engine::new_sequence(call_analysis_guid, contact_name, clock.now());
    sequences::insert_sequence(pool, &seq).await?;
    info!(
        "Created follow-up sequence {} for call {} (cooldown ends {})",
        seq.guid, call_analysis_guid, seq.cooldown_end_date
    );
    Ok(seq)
}

/// List all sequences in display order, applying lazy transitions first
///
/// Any sequence changed by a lazy transition is persisted before the sorted
/// list is returned, so repeated listings without intervening writes are
/// stable.
pub async fn list_sequences(pool: &SqlitePool, clock: &dyn Clock) -> Result<Vec<FollowUpSequence>> {
    let now = clock.now();
    let mut seqs = sequences::list_all(pool).await?;

    for seq in seqs.iter_mut() {
        if engine::apply_lazy_transitions(seq, now) {
            info!(
                "Lazy transition on sequence {}: status={}, cycle={}",
                seq.guid,
                seq.status.to_db_string(),
                seq.current_cycle
            );
            sequences::update_sequence(pool, seq, now).await?;
        }
    }

    engine::sort_for_listing(&mut seqs);
    Ok(seqs)
}

/// Mark a step done
///
/// Applies any pending lazy transition first, so advancing a sequence whose
/// cooldown just expired works without an intervening listing call.
pub async fn advance_step(
    pool: &SqlitePool,
    clock: &dyn Clock,
    id: Uuid,
    step: u8,
    content: Option<String>,
) -> Result<FollowUpSequence> {
    let now = clock.now();
    let mut seq = sequences::get_sequence(pool, id).await?;

    engine::apply_lazy_transitions(&mut seq, now);
    engine::complete_step(&mut seq, step, content, now)?;
    sequences::update_sequence(pool, &mut seq, now).await?;

    info!(
        "Sequence {}: step {} done (cycle {}, status {})",
        seq.guid,
        step,
        seq.current_cycle,
        seq.status.to_db_string()
    );
    Ok(seq)
}

/// Undo a step
pub async fn undo_step(
    pool: &SqlitePool,
    clock: &dyn Clock,
    id: Uuid,
    step: u8,
) -> Result<FollowUpSequence> {
    let now = clock.now();
    let mut seq = sequences::get_sequence(pool, id).await?;

    engine::undo_step(&mut seq, step)?;
    sequences::update_sequence(pool, &mut seq, now).await?;

    info!("Sequence {}: step {} undone", seq.guid, step);
    Ok(seq)
}

/// Set the sequence status directly (e.g. mark the lead won)
pub async fn set_status(
    pool: &SqlitePool,
    clock: &dyn Clock,
    id: Uuid,
    status: SequenceStatus,
) -> Result<FollowUpSequence> {
    let now = clock.now();
    let mut seq = sequences::get_sequence(pool, id).await?;

    engine::set_status(&mut seq, status)?;
    sequences::update_sequence(pool, &mut seq, now).await?;

    info!(
        "Sequence {}: status set to {}",
        seq.guid,
        status.to_db_string()
    );
    Ok(seq)
}

/// Delete a sequence (the rep abandoned the lead)
///
/// Clearing the originating call's outcome is the call-record owner's
/// responsibility; this only removes the sequence row.
pub async fn delete_sequence(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sequences::delete_sequence(pool, id).await?;
    info!("Deleted follow-up sequence {}", id);
    Ok(())
}
