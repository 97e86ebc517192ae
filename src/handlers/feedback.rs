//! # Feedback API Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ApiError, not_found};
use crate::handlers::types::{ApiResponse, json_body, reject_blank};
use crate::models::feedback::FeedbackResponse;
use crate::repositories::{FeedbackRepository, GuestRepository};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitFeedbackRequest {
    pub guest_id: i32,
    #[schema(example = "complaint")]
    pub feedback_type: String,
    #[schema(example = "The shower was cold")]
    pub description: String,
}

/// Submit feedback or a complaint
#[utoipa::path(
    post,
    path = "/api/feedback/submit",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback submitted", body = ApiResponse<FeedbackResponse>),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "feedback"
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<SubmitFeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("feedback_type", request.feedback_type.as_str()),
        ("description", request.description.as_str()),
    ])?;

    GuestRepository::new(&state.db)
        .find_by_id(request.guest_id)
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    let feedback = FeedbackRepository::new(&state.db)
        .create(
            request.guest_id,
            request.feedback_type.trim().to_string(),
            request.description.trim().to_string(),
        )
        .await?;

    info!(feedback_id = feedback.id, guest_id = feedback.guest_id, "Feedback submitted");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Feedback submitted successfully", feedback.into()),
    ))
}

/// A guest's feedback, newest first
#[utoipa::path(
    get,
    path = "/api/feedback/guest/{guest_id}",
    params(("guest_id" = i32, Path, description = "Guest id")),
    responses(
        (status = 200, description = "Feedback entries", body = ApiResponse<Vec<FeedbackResponse>>),
        (status = 404, description = "No feedback for this guest", body = ApiError)
    ),
    tag = "feedback"
)]
pub async fn list_guest_feedback(
    State(state): State<AppState>,
    Path(guest_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<FeedbackResponse>>>, ApiError> {
    let entries = FeedbackRepository::new(&state.db)
        .list_by_guest(guest_id)
        .await?;

    if entries.is_empty() {
        return Err(not_found("No feedback found for this guest"));
    }

    Ok(ApiResponse::ok(
        "Feedback retrieved successfully",
        entries.into_iter().map(Into::into).collect(),
    ))
}
