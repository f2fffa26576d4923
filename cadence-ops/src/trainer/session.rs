//! Training session lifecycle
//!
//! Pure mutations over `TrainingSession`: start, per-response accumulation,
//! and explicit finalization. Aggregates are computed once at completion;
//! after that the session is immutable.

use crate::error::{Error, Result};
use crate::trainer::grading;
use cadence_common::db::models::{SessionMode, TrainingSession};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// XP per correct answer
const XP_PER_CORRECT: i64 = 10;

/// XP per answered question, scaled by difficulty level
const XP_PER_ANSWER_LEVEL: i64 = 2;

/// Component scores for one submitted response (0-100 each)
#[derive(Debug, Clone, Copy)]
pub struct ResponseScores {
    pub type_accuracy: f64,
    pub quality: f64,
    pub naturalness: f64,
    pub type_correct: bool,
}

/// Start a new practice session
pub fn new_session(
    trainee_guid: Uuid,
    mode: SessionMode,
    level: i64,
    vertical: Option<String>,
    timer_seconds: Option<i64>,
    now: DateTime<Utc>,
) -> Result<TrainingSession> {
    if !(1..=5).contains(&level) {
        return Err(Error::Validation(format!(
            "level must be 1-5, got {}",
            level
        )));
    }

    Ok(TrainingSession {
        guid: Uuid::new_v4(),
        trainee_guid,
        mode,
        level,
        vertical,
        timer_seconds,
        questions_answered: 0,
        questions_correct: 0,
        sum_type_accuracy: 0.0,
        sum_quality: 0.0,
        sum_naturalness: 0.0,
        completed: false,
        avg_type_accuracy: None,
        avg_quality: None,
        avg_naturalness: None,
        overall_score: None,
        overall_grade: None,
        xp_earned: None,
        started_at: now,
        completed_at: None,
    })
}

/// Fold one submitted response into the running counters
pub fn record_response(session: &mut TrainingSession, scores: &ResponseScores) -> Result<()> {
    if session.completed {
        return Err(Error::InvalidState(format!(
            "session {} is already completed",
            session.guid
        )));
    }

    session.questions_answered += 1;
    if scores.type_correct {
        session.questions_correct += 1;
    }
    session.sum_type_accuracy += scores.type_accuracy;
    session.sum_quality += scores.quality;
    session.sum_naturalness += scores.naturalness;
    Ok(())
}

/// Compute the final aggregates and freeze the session
pub fn finalize(session: &mut TrainingSession, now: DateTime<Utc>) -> Result<()> {
    if session.completed {
        return Err(Error::InvalidState(format!(
            "session {} is already completed",
            session.guid
        )));
    }

    let answered = session.questions_answered;
    let (avg_type_accuracy, avg_quality, avg_naturalness) = if answered > 0 {
        let n = answered as f64;
        (
            session.sum_type_accuracy / n,
            session.sum_quality / n,
            session.sum_naturalness / n,
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    let overall = grading::composite_score(avg_type_accuracy, avg_quality, avg_naturalness);

    session.avg_type_accuracy = Some(avg_type_accuracy);
    session.avg_quality = Some(avg_quality);
    session.avg_naturalness = Some(avg_naturalness);
    session.overall_score = Some(overall);
    session.overall_grade = Some(grading::letter_for_score(overall));
    session.xp_earned = Some(xp_earned(
        session.questions_correct,
        answered,
        session.level,
    ));
    session.completed = true;
    session.completed_at = Some(now);
    Ok(())
}

fn xp_earned(correct: i64, answered: i64, level: i64) -> i64 {
    XP_PER_CORRECT * correct + XP_PER_ANSWER_LEVEL * level * answered
}
