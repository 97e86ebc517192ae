//! # Service Request API Handlers
//!
//! Guests submit requests; staff move them through their status. Each step
//! leaves an activity log entry and notifies the other side. Those side
//! effects are best-effort: a failed log or notification is reported at
//! `warn` and never fails the request itself.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{ApiError, not_found};
use crate::handlers::types::{ApiResponse, PageParams, json_body, reject_blank};
use crate::models::activity_log::{LOG_REQUEST_CREATED, LOG_STATUS_CHANGE};
use crate::models::notification::{Recipient, kinds};
use crate::models::service_request::{ServiceRequestResponse, ServiceRequestStatus};
use crate::repositories::activity_log::NewActivityLog;
use crate::repositories::service_request::NewServiceRequest;
use crate::repositories::{
    ActivityLogRepository, GuestRepository, NotificationDraft, NotificationRepository,
    ServiceRequestRepository,
};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitServiceRequest {
    pub guest_id: i32,
    #[schema(example = "Ana Lima")]
    pub guest_name: String,
    #[schema(example = "housekeeping")]
    pub service_type: String,
    #[schema(example = "Extra towels please")]
    pub description: String,
    #[schema(value_type = String, example = "2026-01-01T15:00:00Z")]
    pub preferred_time: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateServiceRequestStatus {
    pub status: ServiceRequestStatus,
}

/// Submit a service request
#[utoipa::path(
    post,
    path = "/api/service-requests/submit",
    request_body = SubmitServiceRequest,
    responses(
        (status = 201, description = "Request submitted", body = ApiResponse<ServiceRequestResponse>),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "service-requests"
)]
pub async fn submit_service_request(
    State(state): State<AppState>,
    payload: Result<Json<SubmitServiceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ServiceRequestResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("guest_name", request.guest_name.as_str()),
        ("service_type", request.service_type.as_str()),
        ("description", request.description.as_str()),
    ])?;

    GuestRepository::new(&state.db)
        .find_by_id(request.guest_id)
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    let service_type = request.service_type.trim().to_string();
    let created = ServiceRequestRepository::new(&state.db)
        .create(NewServiceRequest {
            guest_id: request.guest_id,
            guest_name: request.guest_name.trim().to_string(),
            service_type: service_type.clone(),
            description: request.description.trim().to_string(),
            preferred_time: request.preferred_time,
        })
        .await?;

    info!(
        request_id = created.id,
        guest_id = created.guest_id,
        service_type = %service_type,
        "Service request submitted"
    );

    if let Err(error) = ActivityLogRepository::new(&state.db)
        .create(NewActivityLog {
            request_id: created.id,
            admin_id: None,
            guest_id: Some(created.guest_id),
            log_type: LOG_REQUEST_CREATED.to_string(),
            log_message: format!(
                "Guest #{} created a {} request.",
                created.guest_id, service_type
            ),
        })
        .await
    {
        warn!(request_id = created.id, error = %error, "Failed to record request_created log");
    }

    let draft = NotificationDraft::new(
        "New Service Request",
        format!(
            "Guest #{} submitted a {} request.",
            created.guest_id, service_type
        ),
    )
    .with_type(kinds::SERVICE_REQUEST);
    if let Err(error) = NotificationRepository::new(&state.db)
        .broadcast_to_admins(&draft)
        .await
    {
        warn!(request_id = created.id, error = %error, "Failed to notify admins of new request");
    }

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Service request submitted successfully", created.into()),
    ))
}

/// Move a service request to a new status
#[utoipa::path(
    put,
    path = "/api/service-requests/{request_id}/status",
    params(("request_id" = i32, Path, description = "Service request id")),
    request_body = UpdateServiceRequestStatus,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ServiceRequestResponse>),
        (status = 400, description = "Unknown status", body = ApiError),
        (status = 404, description = "Service request not found", body = ApiError)
    ),
    tag = "service-requests"
)]
pub async fn update_service_request_status(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
    payload: Result<Json<UpdateServiceRequestStatus>, JsonRejection>,
) -> Result<Json<ApiResponse<ServiceRequestResponse>>, ApiError> {
    let request = json_body(payload)?;

    let updated = ServiceRequestRepository::new(&state.db)
        .update_status(request_id, request.status)
        .await?
        .ok_or_else(|| not_found("Service request not found"))?;

    let label = updated.status.label();
    info!(request_id, status = label, "Service request status updated");

    if let Err(error) = ActivityLogRepository::new(&state.db)
        .create(NewActivityLog {
            request_id: updated.id,
            admin_id: None,
            guest_id: Some(updated.guest_id),
            log_type: LOG_STATUS_CHANGE.to_string(),
            log_message: format!("Status changed to {label}."),
        })
        .await
    {
        warn!(request_id, error = %error, "Failed to record status_change log");
    }

    let draft = NotificationDraft::new(
        "Service Request Updated",
        format!("Your {} request is now {label}.", updated.service_type),
    )
    .with_type(kinds::STATUS_UPDATE);
    if let Err(error) = NotificationRepository::new(&state.db)
        .create(Recipient::Guest(updated.guest_id), draft)
        .await
    {
        warn!(request_id, error = %error, "Failed to notify guest of status change");
    }

    Ok(ApiResponse::ok(
        format!("Service request #{request_id} status updated to {label}"),
        updated.into(),
    ))
}

/// A guest's service requests, newest preferred time first
#[utoipa::path(
    get,
    path = "/api/service-requests/guest/{guest_id}",
    params(("guest_id" = i32, Path, description = "Guest id"), PageParams),
    responses(
        (status = 200, description = "Service requests", body = ApiResponse<Vec<ServiceRequestResponse>>),
        (status = 404, description = "No service requests for this guest", body = ApiError)
    ),
    tag = "service-requests"
)]
pub async fn list_guest_service_requests(
    State(state): State<AppState>,
    Path(guest_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> Result<Json<ApiResponse<Vec<ServiceRequestResponse>>>, ApiError> {
    let requests = ServiceRequestRepository::new(&state.db)
        .list_by_guest(guest_id, page.limit(), page.offset())
        .await?;

    if requests.is_empty() {
        return Err(not_found("No service requests found for this guest"));
    }

    Ok(ApiResponse::ok(
        "Service requests fetched successfully",
        requests.into_iter().map(Into::into).collect(),
    ))
}
