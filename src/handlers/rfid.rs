//! # RFID API Handlers
//!
//! Tag registration, lifecycle transitions and door verification.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::AdminAuth;
use crate::error::{ApiError, not_found};
use crate::handlers::types::{ApiResponse, json_body, reject_blank};
use crate::models::guest::GuestResponse;
use crate::models::rfid_tag::{RfidStatus, RfidTagResponse};
use crate::models::room::RoomResponse;
use crate::repositories::{GuestRepository, RfidTagRepository};
use crate::server::AppState;
use crate::stay::StayService;
use crate::stay::transitions::RfidTransition;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RfidRef {
    #[schema(example = "04A1B2C3")]
    pub rfid_uid: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRfidRequest {
    pub guest_id: i32,
    #[serde(alias = "rfid_tag")]
    #[schema(example = "04A1B2C3")]
    pub rfid_uid: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRfidRequest {
    #[schema(example = "04A1B2C3")]
    pub rfid_uid: String,
    /// Required only when the guest holds more than one room
    #[schema(example = "101")]
    pub room_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyRfidResponse {
    pub rfid: RfidTagResponse,
    pub guest: GuestResponse,
    pub room: RoomResponse,
}

/// Register a new tag in the `available` pool
#[utoipa::path(
    post,
    path = "/api/rfid",
    security(("bearer_auth" = [])),
    request_body = RfidRef,
    responses(
        (status = 201, description = "Tag registered", body = ApiResponse<RfidTagResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "Tag already registered", body = ApiError)
    ),
    tag = "rfid"
)]
pub async fn register_rfid(
    State(state): State<AppState>,
    _admin: AdminAuth,
    payload: Result<Json<RfidRef>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RfidTagResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("rfid_uid", request.rfid_uid.as_str())])?;

    let tag = RfidTagRepository::new(&state.db)
        .create(request.rfid_uid.trim())
        .await?;

    info!(rfid_uid = %tag.rfid_uid, "RFID tag registered");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("RFID tag registered successfully", tag.into()),
    ))
}

/// List every tag
#[utoipa::path(
    get,
    path = "/api/rfid/all",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All tags", body = ApiResponse<Vec<RfidTagResponse>>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "rfid"
)]
pub async fn list_rfid_tags(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<ApiResponse<Vec<RfidTagResponse>>>, ApiError> {
    let tags = RfidTagRepository::new(&state.db).list_all().await?;
    Ok(ApiResponse::ok(
        "All RFID tags fetched successfully",
        tags.into_iter().map(Into::into).collect(),
    ))
}

/// List tags that can be handed out
#[utoipa::path(
    get,
    path = "/api/rfid/available",
    responses(
        (status = 200, description = "Available tags", body = ApiResponse<Vec<RfidTagResponse>>)
    ),
    tag = "rfid"
)]
pub async fn list_available_rfid_tags(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RfidTagResponse>>>, ApiError> {
    let tags = RfidTagRepository::new(&state.db)
        .list_by_status(RfidStatus::Available)
        .await?;
    Ok(ApiResponse::ok(
        "Available RFID tags fetched successfully",
        tags.into_iter().map(Into::into).collect(),
    ))
}

/// Hand an available tag to a guest
#[utoipa::path(
    post,
    path = "/api/rfid/assign",
    request_body = AssignRfidRequest,
    responses(
        (status = 201, description = "Tag assigned", body = ApiResponse<RfidTagResponse>),
        (status = 400, description = "Tag unknown or not available", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "rfid"
)]
pub async fn assign_rfid(
    State(state): State<AppState>,
    payload: Result<Json<AssignRfidRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RfidTagResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("rfid_uid", request.rfid_uid.as_str())])?;

    GuestRepository::new(&state.db)
        .find_by_id(request.guest_id)
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    let tag = apply_transition(
        &state,
        request.rfid_uid.trim(),
        RfidTransition::Assign,
        Some(request.guest_id),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("RFID assigned to guest successfully", tag),
    ))
}

/// assigned -> active
#[utoipa::path(
    post,
    path = "/api/rfid/activate",
    request_body = RfidRef,
    responses(
        (status = 200, description = "Tag activated", body = ApiResponse<RfidTagResponse>),
        (status = 400, description = "Tag unknown or not assigned", body = ApiError)
    ),
    tag = "rfid"
)]
pub async fn activate_rfid(
    State(state): State<AppState>,
    payload: Result<Json<RfidRef>, JsonRejection>,
) -> Result<Json<ApiResponse<RfidTagResponse>>, ApiError> {
    let request = json_body(payload)?;
    transition_handler(&state, request, RfidTransition::Activate, "RFID activated successfully").await
}

/// Mark a tag lost; lost tags never open doors again
#[utoipa::path(
    post,
    path = "/api/rfid/lost",
    request_body = RfidRef,
    responses(
        (status = 200, description = "Tag marked lost", body = ApiResponse<RfidTagResponse>),
        (status = 400, description = "Tag unknown or already lost", body = ApiError)
    ),
    tag = "rfid"
)]
pub async fn mark_rfid_lost(
    State(state): State<AppState>,
    payload: Result<Json<RfidRef>, JsonRejection>,
) -> Result<Json<ApiResponse<RfidTagResponse>>, ApiError> {
    let request = json_body(payload)?;
    transition_handler(&state, request, RfidTransition::MarkLost, "RFID status changed to lost").await
}

/// Return a tag to the available pool
#[utoipa::path(
    post,
    path = "/api/rfid/unassign",
    request_body = RfidRef,
    responses(
        (status = 200, description = "Tag unassigned", body = ApiResponse<RfidTagResponse>),
        (status = 400, description = "Tag unknown or not assigned", body = ApiError)
    ),
    tag = "rfid"
)]
pub async fn unassign_rfid(
    State(state): State<AppState>,
    payload: Result<Json<RfidRef>, JsonRejection>,
) -> Result<Json<ApiResponse<RfidTagResponse>>, ApiError> {
    let request = json_body(payload)?;
    transition_handler(&state, request, RfidTransition::Unassign, "RFID unassigned successfully").await
}

/// Door verification
///
/// Grants access when the tag belongs to the guest holding the room. The
/// first grant on a reserved room checks the guest in; a grant attempt on
/// an expired stay checks the guest out and is refused.
#[utoipa::path(
    post,
    path = "/api/rfid/verify",
    request_body = VerifyRfidRequest,
    responses(
        (status = 200, description = "Access granted", body = ApiResponse<VerifyRfidResponse>),
        (status = 400, description = "Several rooms held; room_number required", body = ApiError),
        (status = 403, description = "Access denied, tag not usable or stay ended", body = ApiError),
        (status = 404, description = "Tag or guest not found", body = ApiError),
        (status = 409, description = "Room or tag changed concurrently", body = ApiError)
    ),
    tag = "rfid"
)]
pub async fn verify_rfid(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRfidRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<VerifyRfidResponse>>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("rfid_uid", request.rfid_uid.as_str())])?;

    let outcome = StayService::from_config(&state.db, &state.config.scheduler)
        .verify(request.rfid_uid.trim(), request.room_number.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        "Access granted",
        VerifyRfidResponse {
            rfid: outcome.rfid.into(),
            guest: outcome.guest.into(),
            room: outcome.room.into(),
        },
    ))
}

async fn transition_handler(
    state: &AppState,
    request: RfidRef,
    transition: RfidTransition,
    message: &str,
) -> Result<Json<ApiResponse<RfidTagResponse>>, ApiError> {
    reject_blank(&[("rfid_uid", request.rfid_uid.as_str())])?;
    let tag = apply_transition(state, request.rfid_uid.trim(), transition, None).await?;
    Ok(ApiResponse::ok(message, tag))
}

/// Runs a conditional tag transition; a miss means the tag is unknown or in
/// the wrong state.
async fn apply_transition(
    state: &AppState,
    rfid_uid: &str,
    transition: RfidTransition,
    guest_id: Option<i32>,
) -> Result<RfidTagResponse, ApiError> {
    let tag = RfidTagRepository::new(&state.db)
        .apply(rfid_uid, transition, guest_id)
        .await?
        .ok_or_else(|| {
            counter!("rfid_transitions_rejected_total", "transition" => transition.name())
                .increment(1);
            let allowed: Vec<&str> = transition
                .from_states()
                .iter()
                .map(RfidStatus::as_str)
                .collect();
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_TRANSITION",
                format!(
                    "RFID {rfid_uid} not found or not in a state that allows {}",
                    transition.name()
                ),
            )
            .with_details(serde_json::json!({ "allowed_from": allowed }))
        })?;

    counter!("rfid_transitions_total", "transition" => transition.name()).increment(1);
    info!(
        rfid_uid,
        transition = transition.name(),
        status = tag.status.as_str(),
        "RFID transition applied"
    );
    Ok(tag.into())
}
