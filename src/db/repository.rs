//! Database repository for the concession document collections.
//!
//! Uses prepared statements; the stats ledger increment is a single atomic
//! upsert so concurrent writers cannot lose updates.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    date_key, status, ConcessionDetails, ConcessionRequest, DailyStats, Notification,
    PassCollected, PassCounter, StatsEntry, UpdatePassRequest,
};

/// Repository for all document-store operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== CONCESSION RECORDS ====================

    /// Insert a new concession record pair (student application).
    pub async fn create_pass_record(
        &self,
        details: &ConcessionDetails,
        request: &ConcessionRequest,
    ) -> Result<(), AppError> {
        let pass_collected_json = request
            .pass_collected
            .as_ref()
            .map(|p| serde_json::to_string(p).unwrap_or_default());

        sqlx::query(
            r#"INSERT INTO concession_details (
                student_id, first_name, middle_name, last_name, gender, dob, address,
                phone_num, from_location, to_location, branch, grad_year, class,
                duration, travel_lane, certificate_number, last_pass_issued,
                status, status_message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&details.student_id)
        .bind(&details.first_name)
        .bind(&details.middle_name)
        .bind(&details.last_name)
        .bind(&details.gender)
        .bind(&details.dob)
        .bind(&details.address)
        .bind(details.phone_num)
        .bind(&details.from)
        .bind(&details.to)
        .bind(&details.branch)
        .bind(&details.grad_year)
        .bind(&details.class)
        .bind(&details.duration)
        .bind(&details.travel_lane)
        .bind(&details.certificate_number)
        .bind(details.last_pass_issued.map(|d| d.to_rfc3339()))
        .bind(&details.status)
        .bind(&details.status_message)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"INSERT INTO concession_requests (
                student_id, status, status_message, pass_collected, pass_num
            ) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&request.student_id)
        .bind(&request.status)
        .bind(&request.status_message)
        .bind(&pass_collected_json)
        .bind(&request.pass_num)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a concession record by student id.
    pub async fn get_concession_details(
        &self,
        student_id: &str,
    ) -> Result<Option<ConcessionDetails>, AppError> {
        let row = sqlx::query(
            r#"SELECT student_id, first_name, middle_name, last_name, gender, dob, address,
                      phone_num, from_location, to_location, branch, grad_year, class,
                      duration, travel_lane, certificate_number, last_pass_issued,
                      status, status_message
               FROM concession_details WHERE student_id = ?"#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(details_from_row))
    }

    /// Get a concession request by student id.
    pub async fn get_concession_request(
        &self,
        student_id: &str,
    ) -> Result<Option<ConcessionRequest>, AppError> {
        let row = sqlx::query(
            "SELECT student_id, status, status_message, pass_collected, pass_num
             FROM concession_requests WHERE student_id = ?",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(request_from_row))
    }

    /// Apply an edit to a concession record. The caller has already validated
    /// the form and coerced the phone number; the edit's date-of-issue lands
    /// in `last_pass_issued`.
    pub async fn apply_pass_edit(
        &self,
        student_id: &str,
        edit: &UpdatePassRequest,
        phone_num: i64,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE concession_details SET
                first_name = ?, middle_name = ?, last_name = ?, gender = ?, dob = ?,
                address = ?, phone_num = ?, from_location = ?, to_location = ?,
                branch = ?, grad_year = ?, class = ?, duration = ?, travel_lane = ?,
                last_pass_issued = ?
            WHERE student_id = ?"#,
        )
        .bind(&edit.first_name)
        .bind(&edit.middle_name)
        .bind(&edit.last_name)
        .bind(&edit.gender)
        .bind(&edit.dob)
        .bind(&edit.address)
        .bind(phone_num)
        .bind(&edit.from)
        .bind(&edit.to)
        .bind(&edit.branch)
        .bind(&edit.grad_year)
        .bind(&edit.class)
        .bind(&edit.duration)
        .bind(&edit.travel_lane)
        .bind(edit.date_of_issue.map(|d| d.to_rfc3339()))
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Concession record {} not found",
                student_id
            )));
        }
        Ok(())
    }

    /// Mark a student's pass as collected.
    pub async fn mark_pass_collected(
        &self,
        student_id: &str,
        collected: &PassCollected,
    ) -> Result<(), AppError> {
        let json = serde_json::to_string(collected)?;
        let result = sqlx::query("UPDATE concession_requests SET pass_collected = ? WHERE student_id = ?")
            .bind(&json)
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Concession request {} not found",
                student_id
            )));
        }
        Ok(())
    }

    /// Reject both documents of a pass record and clear the collection marker.
    pub async fn cancel_pass(&self, student_id: &str, message: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE concession_details SET status = ?, status_message = ? WHERE student_id = ?",
        )
        .bind(status::REJECTED)
        .bind(message)
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Concession record {} not found",
                student_id
            )));
        }

        sqlx::query(
            "UPDATE concession_requests SET status = ?, status_message = ?, pass_collected = NULL
             WHERE student_id = ?",
        )
        .bind(status::REJECTED)
        .bind(message)
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Issue a pass: record the certificate number and issue date, approve the request.
    pub async fn issue_pass(
        &self,
        student_id: &str,
        certificate_number: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE concession_details SET
                certificate_number = ?, last_pass_issued = ?, status = ?, status_message = NULL
            WHERE student_id = ?"#,
        )
        .bind(certificate_number)
        .bind(issued_at.to_rfc3339())
        .bind(status::APPROVED)
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Concession record {} not found",
                student_id
            )));
        }

        sqlx::query(
            "UPDATE concession_requests SET status = ?, status_message = NULL, pass_num = ?
             WHERE student_id = ?",
        )
        .bind(status::APPROVED)
        .bind(certificate_number)
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Rewrite a certificate number across both collections, matching by field
    /// equality rather than primary key. Returns the number of touched rows
    /// per collection.
    pub async fn update_certificate_number(
        &self,
        old_number: &str,
        new_number: &str,
    ) -> Result<(u64, u64), AppError> {
        let requests = sqlx::query("UPDATE concession_requests SET pass_num = ? WHERE pass_num = ?")
            .bind(new_number)
            .bind(old_number)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let details = sqlx::query(
            "UPDATE concession_details SET certificate_number = ? WHERE certificate_number = ?",
        )
        .bind(new_number)
        .bind(old_number)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok((details, requests))
    }

    // ==================== STATS LEDGER ====================

    /// Record one pass event in the daily statistics ledger.
    ///
    /// The increment is a single atomic upsert keyed by the `DD/MM/YY` date
    /// string, so concurrent callers on the same day cannot lose updates.
    pub async fn record_pass_event(
        &self,
        counter: PassCounter,
        when: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let date = date_key(when);
        let sql = match counter {
            PassCounter::IssuedPass => {
                "INSERT INTO daily_stats (date, issued_pass) VALUES (?, 1)
                 ON CONFLICT(date) DO UPDATE SET issued_pass = issued_pass + 1"
            }
            PassCounter::UpdatedPass => {
                "INSERT INTO daily_stats (date, updated_pass) VALUES (?, 1)
                 ON CONFLICT(date) DO UPDATE SET updated_pass = updated_pass + 1"
            }
            PassCounter::CancelledPass => {
                "INSERT INTO daily_stats (date, cancelled_pass) VALUES (?, 1)
                 ON CONFLICT(date) DO UPDATE SET cancelled_pass = cancelled_pass + 1"
            }
        };

        sqlx::query(sql).bind(&date).execute(&self.pool).await?;
        tracing::debug!(counter = counter.as_str(), date = %date, "Recorded pass event");
        Ok(())
    }

    /// Read the ledger in its original singleton-document shape. Entries keep
    /// first-write order; zero counters are omitted.
    pub async fn get_daily_stats(&self) -> Result<DailyStats, AppError> {
        let rows = sqlx::query(
            "SELECT date, issued_pass, updated_pass, cancelled_pass FROM daily_stats ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let stats = rows
            .into_iter()
            .map(|row| {
                let issued: i64 = row.get("issued_pass");
                let updated: i64 = row.get("updated_pass");
                let cancelled: i64 = row.get("cancelled_pass");
                StatsEntry {
                    date: row.get("date"),
                    issued_pass: (issued > 0).then_some(issued),
                    updated_pass: (updated > 0).then_some(updated),
                    cancelled_pass: (cancelled > 0).then_some(cancelled),
                }
            })
            .collect();

        Ok(DailyStats { stats })
    }

    // ==================== NOTIFICATIONS ====================

    /// Insert a notification. Notifications are immutable once created.
    pub async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        let attachments_json = notification
            .attachments
            .as_ref()
            .map(|a| serde_json::to_string(a).unwrap_or_default());

        sqlx::query(
            r#"INSERT INTO notifications (
                id, title, message, topic, attachments, sender_name, sent_by, notification_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&notification.id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.topic)
        .bind(&attachments_json)
        .bind(&notification.sender_name)
        .bind(&notification.sent_by)
        .bind(notification.notification_time.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List sent notifications, newest first.
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, message, topic, attachments, sender_name, sent_by, notification_time
             FROM notifications ORDER BY notification_time DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(notification_from_row).collect())
    }
}

// Helper functions for row conversion

fn details_from_row(row: &sqlx::sqlite::SqliteRow) -> ConcessionDetails {
    let last_pass_issued: Option<String> = row.get("last_pass_issued");
    ConcessionDetails {
        student_id: row.get("student_id"),
        first_name: row.get("first_name"),
        middle_name: row.get("middle_name"),
        last_name: row.get("last_name"),
        gender: row.get("gender"),
        dob: row.get("dob"),
        address: row.get("address"),
        phone_num: row.get("phone_num"),
        from: row.get("from_location"),
        to: row.get("to_location"),
        branch: row.get("branch"),
        grad_year: row.get("grad_year"),
        class: row.get("class"),
        duration: row.get("duration"),
        travel_lane: row.get("travel_lane"),
        certificate_number: row.get("certificate_number"),
        last_pass_issued: last_pass_issued.and_then(|s| parse_timestamp(&s)),
        status: row.get("status"),
        status_message: row.get("status_message"),
    }
}

fn request_from_row(row: &sqlx::sqlite::SqliteRow) -> ConcessionRequest {
    let pass_collected_str: Option<String> = row.get("pass_collected");
    ConcessionRequest {
        student_id: row.get("student_id"),
        status: row.get("status"),
        status_message: row.get("status_message"),
        pass_collected: pass_collected_str.and_then(|s| serde_json::from_str(&s).ok()),
        pass_num: row.get("pass_num"),
    }
}

fn notification_from_row(row: &sqlx::sqlite::SqliteRow) -> Notification {
    let attachments_str: Option<String> = row.get("attachments");
    let notification_time: String = row.get("notification_time");
    Notification {
        id: row.get("id"),
        title: row.get("title"),
        message: row.get("message"),
        topic: row.get("topic"),
        attachments: attachments_str.and_then(|s| serde_json::from_str(&s).ok()),
        sender_name: row.get("sender_name"),
        sent_by: row.get("sent_by"),
        notification_time: parse_timestamp(&notification_time).unwrap_or_else(Utc::now),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
