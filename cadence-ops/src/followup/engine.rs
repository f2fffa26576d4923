//! Follow-up sequence state transitions
//!
//! Pure functions over `FollowUpSequence`; the current instant is always an
//! explicit parameter so transitions are deterministic and testable. The
//! database layer persists whatever these functions produce as a single
//! write per operation.
//!
//! State machine: `cooling` -> `active` -> back to `cooling` on cycle
//! completion, with `won` terminal and reachable from anywhere. Time-based
//! edges (cooldown expiry, all-steps-done reset) fire lazily when a listing
//! observes them, never from a background timer.

use crate::error::{Error, Result};
use cadence_common::db::models::{FollowUpSequence, SequenceStatus};
use chrono::{DateTime, Duration, Months, Utc};
use uuid::Uuid;

/// Number of steps in one outreach cycle
pub const STEP_COUNT: u8 = 5;

/// Quiet period between cycles, in months
pub const COOLDOWN_MONTHS: u32 = 3;

/// Days between completing step `n` and step `n+1` falling due
///
/// Step 1 -> 2 is one day; every later gap is two days.
pub fn step_gap_days(step: u8) -> i64 {
    match step {
        1 => 1,
        _ => 2,
    }
}

fn cooldown_end_from(now: DateTime<Utc>) -> DateTime<Utc> {
    // Saturates at the chrono range limit
    now.checked_add_months(Months::new(COOLDOWN_MONTHS))
        .unwrap_or(now)
}

/// Create a sequence for a call whose outcome was just marked warm
///
/// Starts in `cooling` with the first cycle's step 1 due when the cooldown
/// expires.
pub fn new_sequence(
    call_analysis_guid: Uuid,
    contact_name: String,
    now: DateTime<Utc>,
) -> FollowUpSequence {
    let cooldown_end = cooldown_end_from(now);
    FollowUpSequence {
        guid: Uuid::new_v4(),
        call_analysis_guid,
        contact_name,
        contact_email: None,
        contact_phone: None,
        status: SequenceStatus::Cooling,
        current_cycle: 1,
        cooldown_end_date: cooldown_end,
        step1_done: false,
        step2_done: false,
        step3_done: false,
        step4_done: false,
        step5_done: false,
        step1_due: Some(cooldown_end),
        step2_due: None,
        step3_due: None,
        step4_due: None,
        step5_due: None,
        step1_content: None,
        step4_notes: None,
        notes: None,
        created_at: now,
        updated_at: now,
        version: 0,
    }
}

/// Apply the lazy time-based transitions; returns true if anything changed
///
/// Run on every listing before the result is sorted or returned. A won
/// sequence is frozen and never touched. Calling this repeatedly without an
/// intervening mutation converges: a second pass observes no trigger and
/// changes nothing.
pub fn apply_lazy_transitions(seq: &mut FollowUpSequence, now: DateTime<Utc>) -> bool {
    if seq.status == SequenceStatus::Won {
        return false;
    }

    let mut changed = false;

    // Cooldown expiry: cooling -> active once the quiet period has passed
    if seq.status == SequenceStatus::Cooling && seq.cooldown_end_date <= now {
        seq.status = SequenceStatus::Active;
        if seq.step1_due.is_none() {
            seq.step1_due = Some(now);
        }
        changed = true;
    }

    // A client may have flagged step 5 done without calling the completion
    // action; converge to the same post-cycle state either way.
    if seq.status == SequenceStatus::Active && seq.all_steps_done() {
        reset_cycle(seq, now);
        changed = true;
    }

    changed
}

/// Close out the current cycle and return to cooling
///
/// Advances the cycle counter, clears all step state and per-cycle content,
/// and schedules the next cycle's step 1 for when the new cooldown expires.
pub fn reset_cycle(seq: &mut FollowUpSequence, now: DateTime<Utc>) {
    let next_cooldown_end = cooldown_end_from(now);
    seq.current_cycle += 1;
    seq.status = SequenceStatus::Cooling;
    seq.cooldown_end_date = next_cooldown_end;
    for step in 1..=STEP_COUNT {
        seq.set_step_done(step, false);
        seq.set_step_due(step, None);
    }
    seq.step1_due = Some(next_cooldown_end);
    seq.step1_content = None;
    seq.step4_notes = None;
}

/// Mark step `step` done, scheduling the next step or closing the cycle
///
/// Steps complete in strict order 1->5. Step 1 stores the drafted email
/// body, step 4 stores call notes; both come in through `content`.
/// Completing step 5 performs the atomic cycle reset.
pub fn complete_step(
    seq: &mut FollowUpSequence,
    step: u8,
    content: Option<String>,
    now: DateTime<Utc>,
) -> Result<()> {
    validate_step(step)?;
    if seq.status == SequenceStatus::Won {
        return Err(Error::InvalidState(format!(
            "sequence {} is won; no further steps",
            seq.guid
        )));
    }
    if seq.status == SequenceStatus::Cooling {
        return Err(Error::InvalidState(format!(
            "sequence {} is cooling until {}",
            seq.guid, seq.cooldown_end_date
        )));
    }
    if seq.step_done(step) {
        return Err(Error::InvalidState(format!(
            "step {} already done on sequence {}",
            step, seq.guid
        )));
    }
    if step > 1 && !seq.step_done(step - 1) {
        return Err(Error::InvalidState(format!(
            "step {} cannot complete before step {} on sequence {}",
            step,
            step - 1,
            seq.guid
        )));
    }

    seq.set_step_done(step, true);
    match step {
        1 => {
            if content.is_some() {
                seq.step1_content = content;
            }
        }
        4 => {
            if content.is_some() {
                seq.step4_notes = content;
            }
        }
        _ => {}
    }

    if step < STEP_COUNT {
        seq.set_step_due(step + 1, Some(now + Duration::days(step_gap_days(step))));
    } else {
        reset_cycle(seq, now);
    }

    Ok(())
}

/// Undo step `step`: clear its flag and the next step's due date
///
/// Deliberately permissive: undoing a middle step does not cascade to
/// re-open later steps, and the cycle counter / cooldown are never rolled
/// back.
pub fn undo_step(seq: &mut FollowUpSequence, step: u8) -> Result<()> {
    validate_step(step)?;
    if seq.status == SequenceStatus::Won {
        return Err(Error::InvalidState(format!(
            "sequence {} is won; steps are frozen",
            seq.guid
        )));
    }

    seq.set_step_done(step, false);
    if step < STEP_COUNT {
        seq.set_step_due(step + 1, None);
    }
    Ok(())
}

/// Directly set the sequence status
///
/// `won` is terminal: once set, no status change (or any other transition)
/// is accepted.
pub fn set_status(seq: &mut FollowUpSequence, status: SequenceStatus) -> Result<()> {
    if seq.status == SequenceStatus::Won {
        return Err(Error::InvalidState(format!(
            "sequence {} is won; status is frozen",
            seq.guid
        )));
    }
    seq.status = status;
    Ok(())
}

/// Order sequences for listing: active first, then cooling, won last;
/// within equal status, soonest-due first
///
/// Must run after `apply_lazy_transitions`, since a transition can change
/// both the status and the effective due instant.
pub fn sort_for_listing(seqs: &mut [FollowUpSequence]) {
    seqs.sort_by_key(listing_key);
}

fn listing_key(seq: &FollowUpSequence) -> (u8, DateTime<Utc>) {
    let rank = match seq.status {
        SequenceStatus::Active => 0,
        SequenceStatus::Cooling => 1,
        SequenceStatus::Won => 2,
    };
    // Soonest of the next step-1 due date and the cooldown end
    let due = match seq.step1_due {
        Some(d) => d.min(seq.cooldown_end_date),
        None => seq.cooldown_end_date,
    };
    (rank, due)
}

fn validate_step(step: u8) -> Result<()> {
    if (1..=STEP_COUNT).contains(&step) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "step must be 1-{}, got {}",
            STEP_COUNT, step
        )))
    }
}
