//! Database initialization
//!
//! Creates the database on first run and brings the schema up to date.
//! All statements are idempotent (CREATE TABLE IF NOT EXISTS), so calling
//! this on every startup is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    info!("Database initialization complete");
    Ok(pool)
}

/// Create all Cadence tables (idempotent - safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_follow_up_sequences_table(pool).await?;
    create_review_records_table(pool).await?;
    create_training_sessions_table(pool).await?;
    Ok(())
}

/// Create the follow_up_sequences table
///
/// One row per warm lead being nurtured. Step flags and due dates drive the
/// 5-step cadence; the version column backs optimistic concurrency checks.
pub async fn create_follow_up_sequences_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS follow_up_sequences (
            guid TEXT PRIMARY KEY,
            call_analysis_guid TEXT NOT NULL UNIQUE,
            contact_name TEXT NOT NULL,
            contact_email TEXT,
            contact_phone TEXT,
            status TEXT NOT NULL DEFAULT 'cooling' CHECK (status IN ('cooling', 'active', 'won')),
            current_cycle INTEGER NOT NULL DEFAULT 1 CHECK (current_cycle >= 1),
            cooldown_end_date TIMESTAMP NOT NULL,
            step1_done INTEGER NOT NULL DEFAULT 0,
            step2_done INTEGER NOT NULL DEFAULT 0,
            step3_done INTEGER NOT NULL DEFAULT 0,
            step4_done INTEGER NOT NULL DEFAULT 0,
            step5_done INTEGER NOT NULL DEFAULT 0,
            step1_due TIMESTAMP,
            step2_due TIMESTAMP,
            step3_due TIMESTAMP,
            step4_due TIMESTAMP,
            step5_due TIMESTAMP,
            step1_content TEXT,
            step4_notes TEXT,
            notes TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL,
            version INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sequences_status ON follow_up_sequences(status)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sequences_cooldown ON follow_up_sequences(cooldown_end_date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the review_records table
///
/// Spaced-repetition mastery state, one row per (trainee, question type,
/// level). Rows are never deleted.
pub async fn create_review_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review_records (
            guid TEXT PRIMARY KEY,
            trainee_guid TEXT NOT NULL,
            question_type TEXT NOT NULL CHECK (question_type IN ('S', 'P', 'I', 'N')),
            level INTEGER NOT NULL CHECK (level >= 1),
            ease_factor REAL NOT NULL DEFAULT 2.5 CHECK (ease_factor >= 1.3),
            interval_days INTEGER NOT NULL DEFAULT 1 CHECK (interval_days >= 1),
            repetitions INTEGER NOT NULL DEFAULT 0 CHECK (repetitions >= 0),
            last_reviewed_at TIMESTAMP NOT NULL,
            next_review_at TIMESTAMP NOT NULL,
            total_attempts INTEGER NOT NULL DEFAULT 0,
            correct_attempts INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL DEFAULT 0,
            UNIQUE (trainee_guid, question_type, level)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_trainee ON review_records(trainee_guid, level)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_next_review ON review_records(next_review_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the training_sessions table
pub async fn create_training_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS training_sessions (
            guid TEXT PRIMARY KEY,
            trainee_guid TEXT NOT NULL,
            mode TEXT NOT NULL CHECK (mode IN ('learn', 'practice', 'live_sim')),
            level INTEGER NOT NULL CHECK (level >= 1 AND level <= 5),
            vertical TEXT,
            timer_seconds INTEGER,
            questions_answered INTEGER NOT NULL DEFAULT 0,
            questions_correct INTEGER NOT NULL DEFAULT 0,
            sum_type_accuracy REAL NOT NULL DEFAULT 0,
            sum_quality REAL NOT NULL DEFAULT 0,
            sum_naturalness REAL NOT NULL DEFAULT 0,
            completed INTEGER NOT NULL DEFAULT 0,
            avg_type_accuracy REAL,
            avg_quality REAL,
            avg_naturalness REAL,
            overall_score REAL,
            overall_grade TEXT CHECK (overall_grade IS NULL OR overall_grade IN ('S', 'A', 'B', 'C', 'F')),
            xp_earned INTEGER,
            started_at TIMESTAMP NOT NULL,
            completed_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sessions_trainee ON training_sessions(trainee_guid)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_schema() {
        let pool = memory_pool().await;
        create_schema(&pool).await.unwrap();

        for table in ["follow_up_sequences", "review_records", "training_sessions"] {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert!(exists, "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_create_schema_idempotent() {
        let pool = memory_pool().await;
        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_init_database_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cadence.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        // Reopening an existing database also succeeds
        drop(pool);
        init_database(&db_path).await.unwrap();
    }

    #[tokio::test]
    async fn test_review_record_natural_key_unique() {
        let pool = memory_pool().await;
        create_schema(&pool).await.unwrap();

        let insert = r#"
            INSERT INTO review_records
                (guid, trainee_guid, question_type, level, last_reviewed_at, next_review_at)
            VALUES (?, 'trainee-1', 'S', 1, '2024-01-01T00:00:00Z', '2024-01-02T00:00:00Z')
        "#;
        sqlx::query(insert).bind("a").execute(&pool).await.unwrap();
        let dup = sqlx::query(insert).bind("b").execute(&pool).await;
        assert!(dup.is_err());
    }
}
