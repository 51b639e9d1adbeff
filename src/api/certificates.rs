//! Certificate number correction endpoints.
//!
//! A correction first locates the latest history record for the old number,
//! then rewrites every matching history entry and every document matching by
//! field equality. A failure partway through leaves the earlier writes in
//! place; there is no rollback across stores.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{HistoryRecord, PassCounter, UpdateCertificateRequest};
use crate::AppState;

/// Summary of a certificate number correction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateUpdateResult {
    pub certificate_number: String,
    pub history_entries_rewritten: usize,
    pub details_updated: u64,
    pub requests_updated: u64,
}

/// GET /api/certificates/:number - Find the latest history record for a
/// certificate number.
pub async fn search_certificate(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<HistoryRecord> {
    match state.history.find_latest(&number).await? {
        Some(record) => success(record),
        None => Err(AppError::NotFound(
            "No matching certificate number found".to_string(),
        )),
    }
}

/// PUT /api/certificates/:number - Rewrite a certificate number everywhere.
///
/// Every matching history entry is rewritten (not just the latest), then every
/// concession request and details document matching the old number by field
/// equality. The ledger records an updated pass even when the new number
/// equals the old one; that is deliberate, documented source behavior.
pub async fn update_certificate(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(request): Json<UpdateCertificateRequest>,
) -> ApiResult<CertificateUpdateResult> {
    let new_number = request.new_certificate_number.trim();
    if new_number.is_empty() {
        return Err(AppError::Validation(
            "New certificate number is required".to_string(),
        ));
    }

    if state.history.find_latest(&number).await?.is_none() {
        return Err(AppError::NotFound(
            "No matching certificate number found".to_string(),
        ));
    }

    let history_entries_rewritten = state.history.rewrite_certificate(&number, new_number).await?;
    let (details_updated, requests_updated) = state
        .repo
        .update_certificate_number(&number, new_number)
        .await?;

    state
        .repo
        .record_pass_event(PassCounter::UpdatedPass, Utc::now())
        .await?;

    tracing::info!(
        old_number = %number,
        new_number = %new_number,
        history_entries_rewritten,
        "Certificate number updated"
    );

    success(CertificateUpdateResult {
        certificate_number: new_number.to_string(),
        history_entries_rewritten,
        details_updated,
        requests_updated,
    })
}
