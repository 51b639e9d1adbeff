//! Daily statistics ledger read endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::DailyStats;
use crate::AppState;

/// GET /api/stats - Read the daily statistics ledger.
///
/// Returned in the original singleton-document shape: an ordered array of
/// per-day entries with zero counters omitted.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<DailyStats> {
    let stats = state.repo.get_daily_stats().await?;
    success(stats)
}
