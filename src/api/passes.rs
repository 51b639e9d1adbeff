//! Pass record workflow endpoints: fetch, edit, cancel, issue.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::history::MutateOutcome;
use crate::models::{
    missing_required_fields, pass_status, CancelPassRequest, ConcessionDetails,
    CreateApplicationRequest, HistoryRecord, IssuePassRequest, PassCollected, PassCounter,
    PassRecord, UpdatePassRequest, DEFAULT_CANCEL_MESSAGE, PASS_FORM_SCHEMA,
};
use crate::AppState;

/// POST /api/passes - Register a new concession application.
pub async fn create_pass(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> ApiResult<PassRecord> {
    if request.student_id.trim().is_empty() {
        return Err(AppError::Validation("Student id is required".to_string()));
    }

    let (details, req) = request.into_records();
    state.repo.create_pass_record(&details, &req).await?;

    success(PassRecord {
        details,
        request: req,
    })
}

/// GET /api/passes/:studentId - Fetch a pass record with its request state.
pub async fn get_pass(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<PassRecord> {
    let details = state
        .repo
        .get_concession_details(&student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Concession record {} not found", student_id)))?;
    let request = state
        .repo
        .get_concession_request(&student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Concession request {} not found", student_id)))?;

    success(PassRecord { details, request })
}

/// PUT /api/passes/:studentId - Submit an edit to a pass record.
///
/// Validation failures reject the request before any write: every
/// schema-required field must be non-empty and the phone number must be
/// exactly ten digits. On success the edit lands in the details document, the
/// pass is marked collected today, and the ledger records an updated pass.
pub async fn update_pass(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(request): Json<UpdatePassRequest>,
) -> ApiResult<PassRecord> {
    let mut missing = missing_required_fields(PASS_FORM_SCHEMA, &request);
    if request.date_of_issue.is_none() {
        missing.push("dateOfIssue");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Please fill out all required fields ({})",
            missing.join(", ")
        )));
    }

    let phone = request.phone_num.as_deref().unwrap_or_default();
    if !is_valid_phone(phone) {
        return Err(AppError::Validation("Phone number is not valid".to_string()));
    }
    let phone_num: i64 = phone
        .parse()
        .map_err(|_| AppError::Validation("Phone number is not valid".to_string()))?;

    let now = Utc::now();
    state
        .repo
        .apply_pass_edit(&student_id, &request, phone_num)
        .await?;
    state
        .repo
        .mark_pass_collected(
            &student_id,
            &PassCollected {
                collected: "1".to_string(),
                date: now,
            },
        )
        .await?;
    state
        .repo
        .record_pass_event(PassCounter::UpdatedPass, now)
        .await?;

    tracing::info!(student_id = %student_id, "Pass record updated");
    fetch_record(&state, &student_id).await
}

/// POST /api/passes/:studentId/cancel - Cancel a pass.
///
/// Rejects both documents with the given reason (or a default message),
/// clears the collection marker, marks the latest history entry cancelled,
/// and records a cancelled pass in the ledger. A certificate number missing
/// from the history log is logged and does not abort the cancellation.
pub async fn cancel_pass(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(request): Json<CancelPassRequest>,
) -> ApiResult<PassRecord> {
    let details = state
        .repo
        .get_concession_details(&student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Concession record {} not found", student_id)))?;

    let message = match request.reason.as_deref() {
        Some(reason) if !reason.trim().is_empty() => reason.to_string(),
        _ => DEFAULT_CANCEL_MESSAGE.to_string(),
    };

    state.repo.cancel_pass(&student_id, &message).await?;

    match &details.certificate_number {
        Some(cert_no) => {
            let outcome = state
                .history
                .mutate_latest(cert_no, |record| {
                    record.status = pass_status::CANCELLED.to_string();
                })
                .await?;
            if outcome == MutateOutcome::NotFound {
                tracing::warn!(
                    certificate_number = %cert_no,
                    "Pass number not found in history"
                );
            }
        }
        None => {
            tracing::warn!(student_id = %student_id, "Cancelled a pass with no certificate number");
        }
    }

    state
        .repo
        .record_pass_event(PassCounter::CancelledPass, Utc::now())
        .await?;

    tracing::info!(student_id = %student_id, "Pass cancelled");
    fetch_record(&state, &student_id).await
}

/// POST /api/passes/:studentId/issue - Issue a pass with a certificate number.
pub async fn issue_pass(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(request): Json<IssuePassRequest>,
) -> ApiResult<PassRecord> {
    if request.certificate_number.trim().is_empty() {
        return Err(AppError::Validation(
            "Certificate number is required".to_string(),
        ));
    }

    let details = state
        .repo
        .get_concession_details(&student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Concession record {} not found", student_id)))?;

    let now = Utc::now();
    state
        .repo
        .issue_pass(&student_id, &request.certificate_number, now)
        .await?;

    state
        .history
        .append(history_entry(&details, &request.certificate_number, now))
        .await?;

    state
        .repo
        .record_pass_event(PassCounter::IssuedPass, now)
        .await?;

    tracing::info!(
        student_id = %student_id,
        certificate_number = %request.certificate_number,
        "Pass issued"
    );
    fetch_record(&state, &student_id).await
}

async fn fetch_record(state: &AppState, student_id: &str) -> ApiResult<PassRecord> {
    let details = state
        .repo
        .get_concession_details(student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Concession record {} not found", student_id)))?;
    let request = state
        .repo
        .get_concession_request(student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Concession request {} not found", student_id)))?;
    success(PassRecord { details, request })
}

fn history_entry(
    details: &ConcessionDetails,
    certificate_number: &str,
    issued_at: chrono::DateTime<Utc>,
) -> HistoryRecord {
    HistoryRecord {
        certificate_number: certificate_number.to_string(),
        pass_num: Some(certificate_number.to_string()),
        status: pass_status::ACTIVE.to_string(),
        first_name: Some(details.first_name.clone()),
        middle_name: details.middle_name.clone(),
        last_name: Some(details.last_name.clone()),
        from: Some(details.from.clone()),
        last_pass_issued: Some(issued_at.to_rfc3339()),
        extra: serde_json::Map::new(),
    }
}

/// A valid phone number is exactly ten ASCII digits.
fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("1234567890"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("12345678901"));
        assert!(!is_valid_phone("12345abcde"));
        assert!(!is_valid_phone(""));
    }
}
