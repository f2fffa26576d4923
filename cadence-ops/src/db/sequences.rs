//! Follow-up sequence database queries
//!
//! Every mutation is a single UPDATE guarded by the version column, so a
//! concurrent writer surfaces as a conflict instead of a silent lost
//! update. No partial state is ever visible: a failed write leaves the row
//! untouched.

use crate::error::{Error, Result};
use cadence_common::db::models::{FollowUpSequence, SequenceStatus};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    guid, call_analysis_guid, contact_name, contact_email, contact_phone,
    status, current_cycle, cooldown_end_date,
    step1_done, step2_done, step3_done, step4_done, step5_done,
    step1_due, step2_due, step3_due, step4_due, step5_due,
    step1_content, step4_notes, notes, created_at, updated_at, version
"#;

/// Insert a freshly created sequence
pub async fn insert_sequence(pool: &SqlitePool, seq: &FollowUpSequence) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO follow_up_sequences (
            guid, call_analysis_guid, contact_name, contact_email, contact_phone,
            status, current_cycle, cooldown_end_date,
            step1_done, step2_done, step3_done, step4_done, step5_done,
            step1_due, step2_due, step3_due, step4_due, step5_due,
            step1_content, step4_notes, notes, created_at, updated_at, version
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(seq.guid.to_string())
    .bind(seq.call_analysis_guid.to_string())
    .bind(&seq.contact_name)
    .bind(&seq.contact_email)
    .bind(&seq.contact_phone)
    .bind(seq.status.to_db_string())
    .bind(seq.current_cycle)
    .bind(seq.cooldown_end_date)
    .bind(seq.step1_done)
    .bind(seq.step2_done)
    .bind(seq.step3_done)
    .bind(seq.step4_done)
    .bind(seq.step5_done)
    .bind(seq.step1_due)
    .bind(seq.step2_due)
    .bind(seq.step3_due)
    .bind(seq.step4_due)
    .bind(seq.step5_due)
    .bind(&seq.step1_content)
    .bind(&seq.step4_notes)
    .bind(&seq.notes)
    .bind(seq.created_at)
    .bind(seq.updated_at)
    .bind(seq.version)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a sequence by ID
pub async fn get_sequence(pool: &SqlitePool, guid: Uuid) -> Result<FollowUpSequence> {
    let sql = format!(
        "SELECT {} FROM follow_up_sequences WHERE guid = ?",
        SELECT_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("sequence {}", guid)))?;

    row_to_sequence(&row)
}

/// Get the sequence created for a given call, if any
pub async fn get_by_call(
    pool: &SqlitePool,
    call_analysis_guid: Uuid,
) -> Result<Option<FollowUpSequence>> {
    let sql = format!(
        "SELECT {} FROM follow_up_sequences WHERE call_analysis_guid = ?",
        SELECT_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(call_analysis_guid.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_sequence(&r)).transpose()
}

/// Fetch all sequences (listing applies ordering in memory after lazy
/// transitions)
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<FollowUpSequence>> {
    let sql = format!("SELECT {} FROM follow_up_sequences", SELECT_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter().map(row_to_sequence).collect()
}

/// Persist a mutated sequence as one atomic, version-checked write
///
/// On success the in-memory copy's version and updated_at are advanced to
/// match the stored row.
pub async fn update_sequence(
    pool: &SqlitePool,
    seq: &mut FollowUpSequence,
    now: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE follow_up_sequences SET
            contact_name = ?, contact_email = ?, contact_phone = ?,
            status = ?, current_cycle = ?, cooldown_end_date = ?,
            step1_done = ?, step2_done = ?, step3_done = ?, step4_done = ?, step5_done = ?,
            step1_due = ?, step2_due = ?, step3_due = ?, step4_due = ?, step5_due = ?,
            step1_content = ?, step4_notes = ?, notes = ?,
            updated_at = ?, version = version + 1
        WHERE guid = ? AND version = ?
        "#,
    )
    .bind(&seq.contact_name)
    .bind(&seq.contact_email)
    .bind(&seq.contact_phone)
    .bind(seq.status.to_db_string())
    .bind(seq.current_cycle)
    .bind(seq.cooldown_end_date)
    .bind(seq.step1_done)
    .bind(seq.step2_done)
    .bind(seq.step3_done)
    .bind(seq.step4_done)
    .bind(seq.step5_done)
    .bind(seq.step1_due)
    .bind(seq.step2_due)
    .bind(seq.step3_due)
    .bind(seq.step4_due)
    .bind(seq.step5_due)
    .bind(&seq.step1_content)
    .bind(&seq.step4_notes)
    .bind(&seq.notes)
    .bind(now)
    .bind(seq.guid.to_string())
    .bind(seq.version)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        // Either the row is gone or another writer got there first
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follow_up_sequences WHERE guid = ?)",
        )
        .bind(seq.guid.to_string())
        .fetch_one(pool)
        .await?;

        return if exists {
            Err(Error::Conflict(format!(
                "sequence {} was modified concurrently",
                seq.guid
            )))
        } else {
            Err(Error::NotFound(format!("sequence {}", seq.guid)))
        };
    }

    seq.version += 1;
    seq.updated_at = now;
    Ok(())
}

/// Delete a sequence by ID
pub async fn delete_sequence(pool: &SqlitePool, guid: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM follow_up_sequences WHERE guid = ?")
        .bind(guid.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("sequence {}", guid)));
    }
    Ok(())
}

fn row_to_sequence(row: &sqlx::sqlite::SqliteRow) -> Result<FollowUpSequence> {
    let guid = parse_uuid(row.get("guid"))?;
    let call_analysis_guid = parse_uuid(row.get("call_analysis_guid"))?;
    let status_str: String = row.get("status");
    let status = SequenceStatus::from_str(&status_str)
        .ok_or_else(|| Error::Internal(format!("invalid status '{}' for sequence {}", status_str, guid)))?;

    Ok(FollowUpSequence {
        guid,
        call_analysis_guid,
        contact_name: row.get("contact_name"),
        contact_email: row.get("contact_email"),
        contact_phone: row.get("contact_phone"),
        status,
        current_cycle: row.get("current_cycle"),
        cooldown_end_date: row.get("cooldown_end_date"),
        step1_done: row.get("step1_done"),
        step2_done: row.get("step2_done"),
        step3_done: row.get("step3_done"),
        step4_done: row.get("step4_done"),
        step5_done: row.get("step5_done"),
        step1_due: row.get("step1_due"),
        step2_due: row.get("step2_due"),
        step3_due: row.get("step3_due"),
        step4_due: row.get("step4_due"),
        step5_due: row.get("step5_due"),
        step1_content: row.get("step1_content"),
        step4_notes: row.get("step4_notes"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    })
}

pub(crate) fn parse_uuid(s: String) -> Result<Uuid> {
    Uuid::parse_str(&s).map_err(|e| Error::Internal(format!("invalid UUID '{}': {}", s, e)))
}
