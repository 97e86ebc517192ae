//! # Access Log API Handlers
//!
//! Door controllers report grant/deny events here. Listing a guest with no
//! events returns an empty page, not 404.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::handlers::types::{ApiResponse, PageParams, json_body, reject_blank};
use crate::models::access_log::{AccessLogResponse, AccessStatus};
use crate::repositories::AccessLogRepository;
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AccessGrantedRequest {
    #[schema(example = "04A1B2C3")]
    pub rfid_uid: String,
    pub guest_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AccessDeniedRequest {
    #[schema(example = "04A1B2C3")]
    pub rfid_uid: String,
}

/// Record a granted door access
#[utoipa::path(
    post,
    path = "/api/access-logs/granted",
    request_body = AccessGrantedRequest,
    responses(
        (status = 201, description = "Event recorded", body = ApiResponse<AccessLogResponse>),
        (status = 400, description = "Missing fields", body = ApiError)
    ),
    tag = "access-logs"
)]
pub async fn log_access_granted(
    State(state): State<AppState>,
    payload: Result<Json<AccessGrantedRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AccessLogResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("rfid_uid", request.rfid_uid.as_str())])?;

    let entry = AccessLogRepository::new(&state.db)
        .record(
            request.rfid_uid.trim(),
            Some(request.guest_id),
            AccessStatus::Granted,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Access granted saved successfully", entry.into()),
    ))
}

/// Record a denied door access
#[utoipa::path(
    post,
    path = "/api/access-logs/denied",
    request_body = AccessDeniedRequest,
    responses(
        (status = 201, description = "Event recorded", body = ApiResponse<AccessLogResponse>),
        (status = 400, description = "Missing fields", body = ApiError)
    ),
    tag = "access-logs"
)]
pub async fn log_access_denied(
    State(state): State<AppState>,
    payload: Result<Json<AccessDeniedRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AccessLogResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("rfid_uid", request.rfid_uid.as_str())])?;

    let entry = AccessLogRepository::new(&state.db)
        .record(request.rfid_uid.trim(), None, AccessStatus::Denied)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Access denied saved successfully", entry.into()),
    ))
}

/// A guest's access events, newest first
#[utoipa::path(
    get,
    path = "/api/access-logs/{guest_id}",
    params(("guest_id" = i32, Path, description = "Guest id"), PageParams),
    responses(
        (status = 200, description = "Access events, possibly empty", body = ApiResponse<Vec<AccessLogResponse>>)
    ),
    tag = "access-logs"
)]
pub async fn list_guest_access_logs(
    State(state): State<AppState>,
    Path(guest_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> Result<Json<ApiResponse<Vec<AccessLogResponse>>>, ApiError> {
    let entries = AccessLogRepository::new(&state.db)
        .list_by_guest(guest_id, page.limit(), page.offset())
        .await?;

    let message = if entries.is_empty() {
        "No access logs found for this guest"
    } else {
        "Access logs fetched successfully"
    };
    Ok(ApiResponse::ok(
        message,
        entries.into_iter().map(Into::into).collect(),
    ))
}
