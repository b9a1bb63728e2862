//! Waitlist HTTP handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};

use crate::waitlist::{
    CreatedEntry, Entry, PositionInfo, StatsSnapshot, WaitlistError, SOCIAL_SHARE_POINTS,
};

use super::types::{
    ApiResponse, AppState, CreateEntryRequest, EmailQuery, RefQuery, ShareRequest, ShareResponse,
};

/// Join the waitlist. `?ref=CODE` credits the referrer.
pub async fn create_entry(
    State(service): State<AppState>,
    Query(query): Query<RefQuery>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedEntry>>), WaitlistError> {
    let created = service.create_entry(&req.name, &req.email, query.referred_by.as_deref())?;
    Ok((StatusCode::CREATED, ApiResponse::success(created)))
}

/// Current position for an email address.
pub async fn get_position(
    State(service): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<ApiResponse<PositionInfo>>, WaitlistError> {
    let info = service.get_position(&query.email)?;
    Ok(ApiResponse::success(info))
}

/// Admin: all entries, newest first.
pub async fn list_entries(
    State(service): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Entry>>>, WaitlistError> {
    let entries = service.list_entries()?;
    Ok(ApiResponse::success(entries))
}

/// Credit a social share to an existing entry.
pub async fn record_share(
    State(service): State<AppState>,
    Json(req): Json<ShareRequest>,
) -> Result<Json<ApiResponse<ShareResponse>>, WaitlistError> {
    let entry = service.entry_by_email(&req.email)?;
    service.record_social_share(entry.id)?;
    Ok(ApiResponse::success(ShareResponse {
        points_awarded: SOCIAL_SHARE_POINTS,
    }))
}

/// Admin: aggregate statistics.
pub async fn stats(
    State(service): State<AppState>,
) -> Result<Json<ApiResponse<StatsSnapshot>>, WaitlistError> {
    let snapshot = service.stats()?;
    Ok(ApiResponse::success(snapshot))
}
