//! Trainer scenario tests
//!
//! Drives mastery updates, due ranking, and the session lifecycle through
//! the orchestration layer against an in-memory database.

use cadence_common::db::init::create_schema;
use cadence_common::db::models::{LetterGrade, QuestionType, SessionMode};
use cadence_common::time::{Clock, FixedClock};
use cadence_ops::trainer::{self, ResponseScores};
use cadence_ops::Error;
use chrono::{Duration, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_schema(&pool).await.unwrap();
    pool
}

#[tokio::test]
async fn test_successive_answers_follow_interval_tiers() {
    let pool = test_pool().await;
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let clock = FixedClock::new(t0);
    let trainee = Uuid::new_v4();

    // Grade A maps to quality 4, which leaves the ease factor at 2.5
    let r1 = trainer::record_answer(
        &pool,
        &clock,
        trainee,
        QuestionType::Problem,
        1,
        Some(LetterGrade::A),
        true,
    )
    .await
    .unwrap();
    assert_eq!(r1.repetitions, 1);
    assert_eq!(r1.interval_days, 1);
    assert_eq!(r1.next_review_at, t0 + Duration::days(1));
    assert_eq!(r1.total_attempts, 1);
    assert_eq!(r1.correct_attempts, 1);

    clock.advance(Duration::days(1));
    let r2 = trainer::record_answer(
        &pool,
        &clock,
        trainee,
        QuestionType::Problem,
        1,
        Some(LetterGrade::A),
        true,
    )
    .await
    .unwrap();
    assert_eq!(r2.repetitions, 2);
    assert_eq!(r2.interval_days, 6);

    clock.advance(Duration::days(6));
    let r3 = trainer::record_answer(
        &pool,
        &clock,
        trainee,
        QuestionType::Problem,
        1,
        Some(LetterGrade::A),
        true,
    )
    .await
    .unwrap();
    assert_eq!(r3.repetitions, 3);
    assert_eq!(r3.interval_days, 15);
    assert_eq!(r3.next_review_at, clock.now() + Duration::days(15));
    assert_eq!(r3.total_attempts, 3);
}

#[tokio::test]
async fn test_failed_answer_resets_progression() {
    let pool = test_pool().await;
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    let trainee = Uuid::new_v4();

    for _ in 0..2 {
        trainer::record_answer(
            &pool,
            &clock,
            trainee,
            QuestionType::Situation,
            2,
            Some(LetterGrade::S),
            true,
        )
        .await
        .unwrap();
        clock.advance(Duration::days(1));
    }

    // No gradable answer at all maps to quality 0
    let failed = trainer::record_answer(
        &pool,
        &clock,
        trainee,
        QuestionType::Situation,
        2,
        None,
        false,
    )
    .await
    .unwrap();
    assert_eq!(failed.repetitions, 0);
    assert_eq!(failed.interval_days, 1);
    assert_eq!(failed.total_attempts, 3);
    assert_eq!(failed.correct_attempts, 2);
}

#[tokio::test]
async fn test_due_ranking_prefers_untouched_pairs() {
    let pool = test_pool().await;
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let clock = FixedClock::new(t0);
    let trainee = Uuid::new_v4();

    trainer::record_answer(
        &pool,
        &clock,
        trainee,
        QuestionType::Problem,
        1,
        Some(LetterGrade::B),
        true,
    )
    .await
    .unwrap();

    // Five days later the answered pair is 4 days overdue (priority 40);
    // the three untouched pairs rank above it at 100
    clock.advance(Duration::days(5));
    let due = trainer::due_reviews(&pool, &clock, trainee, Some(1)).await.unwrap();

    assert_eq!(due.total_due, 4);
    assert!(due.items[0].is_new);
    assert!(due.items[1].is_new);
    assert!(due.items[2].is_new);
    let problem = &due.items[3];
    assert_eq!(problem.question_type, QuestionType::Problem);
    assert_eq!(problem.priority, 40);
    assert_eq!(problem.days_overdue, 4);
    assert_eq!(due.breakdown.p, 1);
    assert_eq!(due.breakdown.s + due.breakdown.i + due.breakdown.n, 3);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let pool = test_pool().await;
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let clock = FixedClock::new(t0);
    let trainee = Uuid::new_v4();

    let session = trainer::start_session(
        &pool,
        &clock,
        trainee,
        SessionMode::Practice,
        3,
        Some("manufacturing".to_string()),
        Some(600),
    )
    .await
    .unwrap();
    assert!(!session.completed);
    assert_eq!(session.started_at, t0);

    trainer::record_session_response(
        &pool,
        session.guid,
        ResponseScores {
            type_accuracy: 100.0,
            quality: 90.0,
            naturalness: 80.0,
            type_correct: true,
        },
    )
    .await
    .unwrap();
    trainer::record_session_response(
        &pool,
        session.guid,
        ResponseScores {
            type_accuracy: 80.0,
            quality: 70.0,
            naturalness: 60.0,
            type_correct: true,
        },
    )
    .await
    .unwrap();

    clock.advance(Duration::minutes(9));
    let done = trainer::complete_session(&pool, &clock, session.guid).await.unwrap();

    assert!(done.completed);
    assert_eq!(done.completed_at, Some(clock.now()));
    assert_eq!(done.questions_answered, 2);
    assert_eq!(done.questions_correct, 2);
    assert_eq!(done.overall_score, Some(82.0));
    assert_eq!(done.overall_grade, Some(LetterGrade::A));
    // 10 * 2 correct + 2 * level 3 * 2 answered
    assert_eq!(done.xp_earned, Some(32));

    // Frozen after completion
    let err = trainer::record_session_response(
        &pool,
        session.guid,
        ResponseScores {
            type_accuracy: 0.0,
            quality: 0.0,
            naturalness: 0.0,
            type_correct: false,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    let stored = trainer::get_session(&pool, session.guid).await.unwrap();
    assert!(stored.completed);
    assert_eq!(stored.overall_grade, Some(LetterGrade::A));
}

#[tokio::test]
async fn test_out_of_range_answer_level_rejected() {
    let pool = test_pool().await;
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    let trainee = Uuid::new_v4();

    // Bad levels must fail validation before any write is attempted, not
    // bounce off the schema as a persistence error
    for level in [0, -3, 6] {
        let err = trainer::record_answer(
            &pool,
            &clock,
            trainee,
            QuestionType::Situation,
            level,
            Some(LetterGrade::A),
            true,
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, Error::Validation(_)),
            "level {} must be Validation, got {:?}",
            level,
            err
        );
    }

    let due = trainer::due_reviews(&pool, &clock, trainee, None).await.unwrap();
    assert!(due.items.is_empty());
}

#[tokio::test]
async fn test_due_reviews_level_filter_validated() {
    let pool = test_pool().await;
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    let trainee = Uuid::new_v4();

    // A level that can never exist must not yield fabricated new pairs
    let err = trainer::due_reviews(&pool, &clock, trainee, Some(-5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = trainer::due_reviews(&pool, &clock, trainee, Some(0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // In-range filters still work
    let due = trainer::due_reviews(&pool, &clock, trainee, Some(1)).await.unwrap();
    assert_eq!(due.items.len(), 4);
}

#[tokio::test]
async fn test_invalid_session_level_rejected() {
    let pool = test_pool().await;
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());

    let err = trainer::start_session(
        &pool,
        &clock,
        Uuid::new_v4(),
        SessionMode::Learn,
        0,
        None,
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
