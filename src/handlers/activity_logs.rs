//! # Activity Log API Handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{ApiError, not_found};
use crate::handlers::types::{ApiResponse, PageParams, json_body, reject_blank};
use crate::models::activity_log::ActivityLogResponse;
use crate::repositories::activity_log::NewActivityLog;
use crate::repositories::{ActivityLogRepository, ServiceRequestRepository};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateActivityLogRequest {
    pub request_id: i32,
    pub admin_id: Option<i32>,
    pub guest_id: Option<i32>,
    #[schema(example = "note")]
    pub log_type: String,
    #[schema(example = "Called the guest to confirm")]
    pub log_message: String,
}

/// Append an entry to a service request's activity log
#[utoipa::path(
    post,
    path = "/api/activity-logs",
    request_body = CreateActivityLogRequest,
    responses(
        (status = 201, description = "Entry recorded", body = ApiResponse<ActivityLogResponse>),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 404, description = "Service request not found", body = ApiError)
    ),
    tag = "activity-logs"
)]
pub async fn create_activity_log(
    State(state): State<AppState>,
    payload: Result<Json<CreateActivityLogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ActivityLogResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("log_type", request.log_type.as_str()),
        ("log_message", request.log_message.as_str()),
    ])?;

    ServiceRequestRepository::new(&state.db)
        .find_by_id(request.request_id)
        .await?
        .ok_or_else(|| not_found("Service request not found"))?;

    let entry = ActivityLogRepository::new(&state.db)
        .create(NewActivityLog {
            request_id: request.request_id,
            admin_id: request.admin_id,
            guest_id: request.guest_id,
            log_type: request.log_type.trim().to_string(),
            log_message: request.log_message.trim().to_string(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Service request log saved successfully", entry.into()),
    ))
}

/// A service request's activity, newest first
#[utoipa::path(
    get,
    path = "/api/activity-logs/{request_id}",
    params(("request_id" = i32, Path, description = "Service request id"), PageParams),
    responses(
        (status = 200, description = "Activity entries, possibly empty", body = ApiResponse<Vec<ActivityLogResponse>>)
    ),
    tag = "activity-logs"
)]
pub async fn list_request_activity_logs(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> Result<Json<ApiResponse<Vec<ActivityLogResponse>>>, ApiError> {
    let entries = ActivityLogRepository::new(&state.db)
        .list_by_request(request_id, page.limit(), page.offset())
        .await?;

    let message = if entries.is_empty() {
        "No logs found for this service request"
    } else {
        "Service request logs fetched successfully"
    };
    Ok(ApiResponse::ok(
        message,
        entries.into_iter().map(Into::into).collect(),
    ))
}
