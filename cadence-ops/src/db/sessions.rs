//! Training session database queries
//!
//! Sessions are single-writer (the trainee's own client), so updates are
//! plain full-row writes rather than version-checked ones.

use crate::error::{Error, Result};
use cadence_common::db::models::{LetterGrade, SessionMode, TrainingSession};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    guid, trainee_guid, mode, level, vertical, timer_seconds,
    questions_answered, questions_correct,
    sum_type_accuracy, sum_quality, sum_naturalness,
    completed, avg_type_accuracy, avg_quality, avg_naturalness,
    overall_score, overall_grade, xp_earned,
    started_at, completed_at
"#;

/// Insert a newly started session
pub async fn insert_session(pool: &SqlitePool, session: &TrainingSession) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO training_sessions (
            guid, trainee_guid, mode, level, vertical, timer_seconds,
            questions_answered, questions_correct,
            sum_type_accuracy, sum_quality, sum_naturalness,
            completed, avg_type_accuracy, avg_quality, avg_naturalness,
            overall_score, overall_grade, xp_earned,
            started_at, completed_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.guid.to_string())
    .bind(session.trainee_guid.to_string())
    .bind(session.mode.to_db_string())
    .bind(session.level)
    .bind(&session.vertical)
    .bind(session.timer_seconds)
    .bind(session.questions_answered)
    .bind(session.questions_correct)
    .bind(session.sum_type_accuracy)
    .bind(session.sum_quality)
    .bind(session.sum_naturalness)
    .bind(session.completed)
    .bind(session.avg_type_accuracy)
    .bind(session.avg_quality)
    .bind(session.avg_naturalness)
    .bind(session.overall_score)
    .bind(session.overall_grade.map(|g| g.to_db_string()))
    .bind(session.xp_earned)
    .bind(session.started_at)
    .bind(session.completed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a session by ID
pub async fn get_session(pool: &SqlitePool, guid: Uuid) -> Result<TrainingSession> {
    let sql = format!(
        "SELECT {} FROM training_sessions WHERE guid = ?",
        SELECT_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("session {}", guid)))?;

    row_to_session(&row)
}

/// Persist session counters and final aggregates
pub async fn update_session(pool: &SqlitePool, session: &TrainingSession) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE training_sessions SET
            questions_answered = ?, questions_correct = ?,
            sum_type_accuracy = ?, sum_quality = ?, sum_naturalness = ?,
            completed = ?, avg_type_accuracy = ?, avg_quality = ?, avg_naturalness = ?,
            overall_score = ?, overall_grade = ?, xp_earned = ?,
            completed_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(session.questions_answered)
    .bind(session.questions_correct)
    .bind(session.sum_type_accuracy)
    .bind(session.sum_quality)
    .bind(session.sum_naturalness)
    .bind(session.completed)
    .bind(session.avg_type_accuracy)
    .bind(session.avg_quality)
    .bind(session.avg_naturalness)
    .bind(session.overall_score)
    .bind(session.overall_grade.map(|g| g.to_db_string()))
    .bind(session.xp_earned)
    .bind(session.completed_at)
    .bind(session.guid.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("session {}", session.guid)));
    }
    Ok(())
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<TrainingSession> {
    let mode_str: String = row.get("mode");
    let mode = SessionMode::from_str(&mode_str)
        .ok_or_else(|| Error::Internal(format!("invalid session mode: {}", mode_str)))?;

    let grade_str: Option<String> = row.get("overall_grade");
    let overall_grade = match grade_str {
        Some(s) => Some(
            LetterGrade::from_str(&s)
                .ok_or_else(|| Error::Internal(format!("invalid grade: {}", s)))?,
        ),
        None => None,
    };

    Ok(TrainingSession {
        guid: super::sequences::parse_uuid(row.get("guid"))?,
        trainee_guid: super::sequences::parse_uuid(row.get("trainee_guid"))?,
        mode,
        level: row.get("level"),
        vertical: row.get("vertical"),
        timer_seconds: row.get("timer_seconds"),
        questions_answered: row.get("questions_answered"),
        questions_correct: row.get("questions_correct"),
        sum_type_accuracy: row.get("sum_type_accuracy"),
        sum_quality: row.get("sum_quality"),
        sum_naturalness: row.get("sum_naturalness"),
        completed: row.get("completed"),
        avg_type_accuracy: row.get("avg_type_accuracy"),
        avg_quality: row.get("avg_quality"),
        avg_naturalness: row.get("avg_naturalness"),
        overall_score: row.get("overall_score"),
        overall_grade,
        xp_earned: row.get("xp_earned"),
        started_at: row.get::<DateTime<Utc>, _>("started_at"),
        completed_at: row.get::<Option<DateTime<Utc>>, _>("completed_at"),
    })
}
