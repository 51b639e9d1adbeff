//! Database module for SQLite persistence.
//!
//! SQLite is the document store for concession records, the daily statistics
//! ledger, and sent notifications. The history log lives in the blob store.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // "from" and "to" are SQL keywords; the columns are from_location/to_location.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS concession_details (
            student_id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            middle_name TEXT,
            last_name TEXT NOT NULL,
            gender TEXT NOT NULL,
            dob TEXT NOT NULL,
            address TEXT NOT NULL,
            phone_num INTEGER NOT NULL,
            from_location TEXT NOT NULL,
            to_location TEXT NOT NULL,
            branch TEXT NOT NULL,
            grad_year TEXT NOT NULL,
            class TEXT NOT NULL,
            duration TEXT NOT NULL,
            travel_lane TEXT NOT NULL,
            certificate_number TEXT,
            last_pass_issued TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            status_message TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS concession_requests (
            student_id TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'pending',
            status_message TEXT,
            pass_collected TEXT,
            pass_num TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS daily_stats (
            date TEXT PRIMARY KEY,
            issued_pass INTEGER NOT NULL DEFAULT 0,
            updated_pass INTEGER NOT NULL DEFAULT 0,
            cancelled_pass INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            topic TEXT NOT NULL,
            attachments TEXT,
            sender_name TEXT NOT NULL,
            sent_by TEXT NOT NULL,
            notification_time TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for the field-equality queries used by certificate correction
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_details_certificate ON concession_details(certificate_number);
        CREATE INDEX IF NOT EXISTS idx_requests_pass_num ON concession_requests(pass_num);
        CREATE INDEX IF NOT EXISTS idx_notifications_time ON notifications(notification_time);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
