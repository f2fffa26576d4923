//! Full-cycle follow-up scenario tests
//!
//! Exercises the orchestration layer end to end against an in-memory
//! database with a pinned clock: create a sequence, wait out the cooldown,
//! walk all five steps, and observe the cycle reset.

use cadence_common::db::init::create_schema;
use cadence_common::db::models::SequenceStatus;
use cadence_common::time::{Clock, FixedClock};
use cadence_ops::followup;
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
async fn test_full_cycle_resets_into_next_cooldown() {
    let pool = test_pool().await;
    let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
    let clock = FixedClock::new(t0);

    let seq = followup::create_sequence(&pool, &clock, Uuid::new_v4(), "Dana Reeve".to_string())
        .await
        .unwrap();
    assert_eq!(seq.status, SequenceStatus::Cooling);
    assert_eq!(seq.current_cycle, 1);
    let first_cooldown_end = seq.cooldown_end_date;
    assert_eq!(first_cooldown_end, Utc.with_ymd_and_hms(2024, 4, 15, 9, 0, 0).unwrap());
    assert_eq!(seq.step1_due, Some(first_cooldown_end));

    // Still cooling the day before the cooldown ends
    clock.set(first_cooldown_end - Duration::days(1));
    let listed = followup::list_sequences(&pool, &clock).await.unwrap();
    assert_eq!(listed[0].status, SequenceStatus::Cooling);

    // Listing after expiry activates and persists
    clock.set(first_cooldown_end + Duration::hours(1));
    let listed = followup::list_sequences(&pool, &clock).await.unwrap();
    assert_eq!(listed[0].status, SequenceStatus::Active);
    assert_eq!(listed[0].step1_due, Some(first_cooldown_end));

    // Walk the cadence: completing each step schedules the next
    let id = seq.guid;
    let s = followup::advance_step(&pool, &clock, id, 1, Some("intro draft".to_string()))
        .await
        .unwrap();
    assert!(s.step1_done);
    assert_eq!(s.step1_content.as_deref(), Some("intro draft"));
    assert_eq!(s.step2_due, Some(clock.now() + Duration::days(1)));

    clock.advance(Duration::days(1));
    let s = followup::advance_step(&pool, &clock, id, 2, None).await.unwrap();
    assert_eq!(s.step3_due, Some(clock.now() + Duration::days(2)));

    clock.advance(Duration::days(2));
    followup::advance_step(&pool, &clock, id, 3, None).await.unwrap();

    clock.advance(Duration::days(2));
    let s = followup::advance_step(&pool, &clock, id, 4, Some("asked about Q3 budget".to_string()))
        .await
        .unwrap();
    assert_eq!(s.step4_notes.as_deref(), Some("asked about Q3 budget"));

    // Step 5 closes the cycle atomically
    clock.advance(Duration::days(2));
    let reset_at = clock.now();
    let s = followup::advance_step(&pool, &clock, id, 5, None).await.unwrap();
    assert_eq!(s.current_cycle, 2);
    assert_eq!(s.status, SequenceStatus::Cooling);
    assert_eq!(s.cooldown_end_date, reset_at + chrono::Months::new(3));
    assert!(!s.step1_done && !s.step2_done && !s.step3_done && !s.step4_done && !s.step5_done);
    assert_eq!(s.step1_due, Some(s.cooldown_end_date));
    assert!(s.step1_content.is_none());
    assert!(s.step4_notes.is_none());

    // The stored row matches what the operation returned
    let listed = followup::list_sequences(&pool, &clock).await.unwrap();
    assert_eq!(listed[0].current_cycle, 2);
    assert_eq!(listed[0].status, SequenceStatus::Cooling);
}

#[tokio::test]
async fn test_listing_is_idempotent_after_lazy_transition() {
    let pool = test_pool().await;
    let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
    let clock = FixedClock::new(t0);

    followup::create_sequence(&pool, &clock, Uuid::new_v4(), "Sam Ortiz".to_string())
        .await
        .unwrap();

    clock.advance(Duration::days(120));
    let first = followup::list_sequences(&pool, &clock).await.unwrap();
    let second = followup::list_sequences(&pool, &clock).await.unwrap();

    assert_eq!(first[0].status, SequenceStatus::Active);
    assert_eq!(second[0].status, SequenceStatus::Active);
    assert_eq!(first[0].version, second[0].version);
    assert_eq!(first[0].step1_due, second[0].step1_due);
}

#[tokio::test]
async fn test_won_sequence_is_frozen() {
    let pool = test_pool().await;
    let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
    let clock = FixedClock::new(t0);

    let seq = followup::create_sequence(&pool, &clock, Uuid::new_v4(), "Lee Chen".to_string())
        .await
        .unwrap();
    let won = followup::set_status(&pool, &clock, seq.guid, SequenceStatus::Won)
        .await
        .unwrap();
    assert_eq!(won.status, SequenceStatus::Won);

    // Years later it is still won: no lazy activation, no step work
    clock.advance(Duration::days(1000));
    let listed = followup::list_sequences(&pool, &clock).await.unwrap();
    assert_eq!(listed[0].status, SequenceStatus::Won);

    let err = followup::advance_step(&pool, &clock, seq.guid, 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    let err = followup::set_status(&pool, &clock, seq.guid, SequenceStatus::Active)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_duplicate_call_rejected() {
    let pool = test_pool().await;
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
    let call = Uuid::new_v4();

    followup::create_sequence(&pool, &clock, call, "First".to_string())
        .await
        .unwrap();
    let err = followup::create_sequence(&pool, &clock, call, "Second".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_listing_order_across_states() {
    let pool = test_pool().await;
    let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
    let clock = FixedClock::new(t0);

    let cooling_late = followup::create_sequence(&pool, &clock, Uuid::new_v4(), "Cool Late".to_string())
        .await
        .unwrap();

    clock.set(t0 - Duration::days(30));
    let cooling_early = followup::create_sequence(&pool, &clock, Uuid::new_v4(), "Cool Early".to_string())
        .await
        .unwrap();

    clock.set(t0 - Duration::days(200));
    let active = followup::create_sequence(&pool, &clock, Uuid::new_v4(), "Active".to_string())
        .await
        .unwrap();
    let won = followup::create_sequence(&pool, &clock, Uuid::new_v4(), "Won".to_string())
        .await
        .unwrap();
    followup::set_status(&pool, &clock, won.guid, SequenceStatus::Won)
        .await
        .unwrap();

    // At t0 the 200-day-old sequence has left its cooldown
    clock.set(t0);
    let listed = followup::list_sequences(&pool, &clock).await.unwrap();
    let order: Vec<Uuid> = listed.iter().map(|s| s.guid).collect();
    assert_eq!(
        order,
        vec![active.guid, cooling_early.guid, cooling_late.guid, won.guid]
    );
}

#[tokio::test]
async fn test_delete_removes_sequence() {
    let pool = test_pool().await;
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());

    let seq = followup::create_sequence(&pool, &clock, Uuid::new_v4(), "Gone Soon".to_string())
        .await
        .unwrap();
    followup::delete_sequence(&pool, seq.guid).await.unwrap();

    assert!(followup::list_sequences(&pool, &clock).await.unwrap().is_empty());
    let err = followup::delete_sequence(&pool, seq.guid).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
