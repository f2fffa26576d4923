//! Review record database queries
//!
//! One row per (trainee, question type, level), enforced by a unique
//! constraint. Updates are guarded by the version column like the sequence
//! table.

use crate::error::{Error, Result};
use cadence_common::db::models::{QuestionType, ReviewRecord};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    guid, trainee_guid, question_type, level,
    ease_factor, interval_days, repetitions,
    last_reviewed_at, next_review_at,
    total_attempts, correct_attempts, version
"#;

/// Get the record for one (trainee, type, level), if it exists
pub async fn get_record(
    pool: &SqlitePool,
    trainee_guid: Uuid,
    question_type: QuestionType,
    level: i64,
) -> Result<Option<ReviewRecord>> {
    let sql = format!(
        "SELECT {} FROM review_records WHERE trainee_guid = ? AND question_type = ? AND level = ?",
        SELECT_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(trainee_guid.to_string())
        .bind(question_type.to_db_string())
        .bind(level)
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_record(&r)).transpose()
}

/// Fetch a trainee's records, optionally restricted to one level
pub async fn list_records(
    pool: &SqlitePool,
    trainee_guid: Uuid,
    level: Option<i64>,
) -> Result<Vec<ReviewRecord>> {
    let rows = match level {
        Some(level) => {
            let sql = format!(
                "SELECT {} FROM review_records WHERE trainee_guid = ? AND level = ?",
                SELECT_COLUMNS
            );
            sqlx::query(&sql)
                .bind(trainee_guid.to_string())
                .bind(level)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM review_records WHERE trainee_guid = ?",
                SELECT_COLUMNS
            );
            sqlx::query(&sql)
                .bind(trainee_guid.to_string())
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(row_to_record).collect()
}

/// Insert a record created by the first answer for its (type, level) pair
pub async fn insert_record(pool: &SqlitePool, record: &ReviewRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO review_records (
            guid, trainee_guid, question_type, level,
            ease_factor, interval_days, repetitions,
            last_reviewed_at, next_review_at,
            total_attempts, correct_attempts, version
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.guid.to_string())
    .bind(record.trainee_guid.to_string())
    .bind(record.question_type.to_db_string())
    .bind(record.level)
    .bind(record.ease_factor)
    .bind(record.interval_days)
    .bind(record.repetitions)
    .bind(record.last_reviewed_at)
    .bind(record.next_review_at)
    .bind(record.total_attempts)
    .bind(record.correct_attempts)
    .bind(record.version)
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist a mutated record as one atomic, version-checked write
pub async fn update_record(pool: &SqlitePool, record: &mut ReviewRecord) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE review_records SET
            ease_factor = ?, interval_days = ?, repetitions = ?,
            last_reviewed_at = ?, next_review_at = ?,
            total_attempts = ?, correct_attempts = ?,
            version = version + 1
        WHERE guid = ? AND version = ?
        "#,
    )
    .bind(record.ease_factor)
    .bind(record.interval_days)
    .bind(record.repetitions)
    .bind(record.last_reviewed_at)
    .bind(record.next_review_at)
    .bind(record.total_attempts)
    .bind(record.correct_attempts)
    .bind(record.guid.to_string())
    .bind(record.version)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM review_records WHERE guid = ?)")
                .bind(record.guid.to_string())
                .fetch_one(pool)
                .await?;
        if exists {
            return Err(Error::Conflict(format!(
                "review record {} was modified concurrently",
                record.guid
            )));
        }
        return Err(Error::NotFound(format!("review record {}", record.guid)));
    }

    record.version += 1;
    Ok(())
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<ReviewRecord> {
    let type_str: String = row.get("question_type");
    let question_type = QuestionType::from_str(&type_str)
        .ok_or_else(|| Error::Internal(format!("invalid question_type: {}", type_str)))?;

    Ok(ReviewRecord {
        guid: super::sequences::parse_uuid(row.get("guid"))?,
        trainee_guid: super::sequences::parse_uuid(row.get("trainee_guid"))?,
        question_type,
        level: row.get("level"),
        ease_factor: row.get("ease_factor"),
        interval_days: row.get("interval_days"),
        repetitions: row.get("repetitions"),
        last_reviewed_at: row.get::<DateTime<Utc>, _>("last_reviewed_at"),
        next_review_at: row.get::<DateTime<Utc>, _>("next_review_at"),
        total_attempts: row.get("total_attempts"),
        correct_attempts: row.get("correct_attempts"),
        version: row.get("version"),
    })
}
