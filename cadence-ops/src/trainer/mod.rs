//! Trainer operations
//!
//! Spaced-repetition mastery updates, due-item ranking, and the practice
//! session lifecycle. Each operation follows the same shape as the
//! follow-up side: read, pure transition, one write.

pub mod grading;
pub mod scheduler;
pub mod session;
pub mod sm2;

use crate::db::{reviews, sessions};
use crate::error::{Error, Result};
use cadence_common::db::models::{
    LetterGrade, QuestionType, ReviewRecord, SessionMode, TrainingSession,
};
use cadence_common::time::Clock;
use chrono::Duration;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

pub use scheduler::DueReviews;
pub use session::ResponseScores;

/// Fold one graded answer into the trainee's mastery record
///
/// Creates the (type, level) record on first contact. `grade` is None when
/// the trainee gave no gradable answer, which maps to quality 0 and resets
/// the progression like any failure. `type_correct` feeds the accuracy
/// counters independently of the grade.
pub async fn record_answer(
    pool: &SqlitePool,
    clock: &dyn Clock,
    trainee_guid: Uuid,
    question_type: QuestionType,
    level: i64,
    grade: Option<LetterGrade>,
    type_correct: bool,
) -> Result<ReviewRecord> {
    validate_level(level)?;
    let now = clock.now();
    let quality = grade.map(|g| g.quality()).unwrap_or(0);

    let existing = reviews::get_record(pool, trainee_guid, question_type, level).await?;
    let is_new = existing.is_none();
    let mut record = match existing {
        Some(record) => record,
        None => ReviewRecord {
            guid: Uuid::new_v4(),
            trainee_guid,
            question_type,
            level,
            ease_factor: sm2::INITIAL_EASE_FACTOR,
            interval_days: 1,
            repetitions: 0,
            last_reviewed_at: now,
            next_review_at: now,
            total_attempts: 0,
            correct_attempts: 0,
            version: 0,
        },
    };

    let next = sm2::review(
        sm2::Sm2State {
            ease_factor: record.ease_factor,
            interval_days: record.interval_days,
            repetitions: record.repetitions,
        },
        quality,
    );

    record.ease_factor = next.ease_factor;
    record.interval_days = next.interval_days;
    record.repetitions = next.repetitions;
    record.last_reviewed_at = now;
    record.next_review_at = now + Duration::days(next.interval_days);
    record.total_attempts += 1;
    if type_correct {
        record.correct_attempts += 1;
    }

    if is_new {
        reviews::insert_record(pool, &record).await?;
    } else {
        reviews::update_record(pool, &mut record).await?;
    }

    info!(
        "Review {}/{}@{} for trainee {}: quality={}, next in {} day(s)",
        question_type.to_db_string(),
        level,
        record.repetitions,
        trainee_guid,
        quality,
        record.interval_days
    );
    Ok(record)
}

/// Ranked list of what the trainee should review next
pub async fn due_reviews(
    pool: &SqlitePool,
    clock: &dyn Clock,
    trainee_guid: Uuid,
    level: Option<i64>,
) -> Result<DueReviews> {
    if let Some(level) = level {
        validate_level(level)?;
    }
    let records = reviews::list_records(pool, trainee_guid, level).await?;
    Ok(scheduler::rank_reviews(&records, level, clock.now()))
}

fn validate_level(level: i64) -> Result<()> {
    if (1..=5).contains(&level) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "level must be 1-5, got {}",
            level
        )))
    }
}

/// Start a practice session
pub async fn start_session(
    pool: &SqlitePool,
    clock: &dyn Clock,
    trainee_guid: Uuid,
    mode: SessionMode,
    level: i64,
    vertical: Option<String>,
    timer_seconds: Option<i64>,
) -> Result<TrainingSession> {
    let new = session::new_session(trainee_guid, mode, level, vertical, timer_seconds, clock.now())?;
    sessions::insert_session(pool, &new).await?;
    info!(
        "Started {} session {} for trainee {} (level {})",
        mode.to_db_string(),
        new.guid,
        trainee_guid,
        level
    );
    Ok(new)
}

/// Record one response in an open session
///
/// Only the session counters move here; the mastery record for the answered
/// (type, level) pair is updated by the caller through `record_answer`, so
/// out-of-session drills use the same path.
pub async fn record_session_response(
    pool: &SqlitePool,
    session_guid: Uuid,
    scores: ResponseScores,
) -> Result<TrainingSession> {
    let mut current = sessions::get_session(pool, session_guid).await?;

    session::record_response(&mut current, &scores)?;
    sessions::update_session(pool, &current).await?;

    Ok(current)
}

/// Complete a session: compute the aggregates and freeze it
pub async fn complete_session(
    pool: &SqlitePool,
    clock: &dyn Clock,
    session_guid: Uuid,
) -> Result<TrainingSession> {
    let mut current = sessions::get_session(pool, session_guid).await?;

    session::finalize(&mut current, clock.now())?;
    sessions::update_session(pool, &current).await?;

    info!(
        "Completed session {}: {}/{} correct, score {:.1}, grade {}, xp {}",
        current.guid,
        current.questions_correct,
        current.questions_answered,
        current.overall_score.unwrap_or(0.0),
        current
            .overall_grade
            .map(|g| g.to_db_string())
            .unwrap_or("-"),
        current.xp_earned.unwrap_or(0)
    );
    Ok(current)
}

/// Get a session by ID
pub async fn get_session(pool: &SqlitePool, session_guid: Uuid) -> Result<TrainingSession> {
    sessions::get_session(pool, session_guid).await
}
