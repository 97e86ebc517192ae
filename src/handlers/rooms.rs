//! # Rooms API Handlers
//!
//! Room inventory, reservations and the staff check-in/check-out
//! endpoints. Occupancy changes go through [`StayService`] so they share
//! the door-verify code path.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::AdminAuth;
use crate::error::{ApiError, conflict, not_found, validation_error};
use crate::handlers::types::{
    ApiResponse, MessageResponse, json_body, non_blank, optional_json_body, reject_blank,
};
use crate::models::room::{RoomResponse, RoomStatus};
use crate::repositories::room::{NewRoom, Reservation};
use crate::repositories::{GuestRepository, RoomRepository};
use crate::server::AppState;
use crate::stay::StayService;
use crate::stay::transitions::{MAX_HOURS_STAY, RoomTransition};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    #[schema(example = "101")]
    pub room_number: String,
    /// With `hours_stay`, creates the room already reserved
    pub guest_id: Option<i32>,
    #[schema(example = 2.0)]
    pub hours_stay: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRoomRequest {
    #[schema(example = "101")]
    pub room_number: String,
    pub guest_id: i32,
    #[schema(example = 2.0)]
    pub hours_stay: f64,
}

/// Editable room fields. `status` only toggles between `available` and
/// `maintenance`; occupancy changes use the dedicated endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomRequest {
    pub room_number: Option<String>,
    pub hours_stay: Option<f64>,
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckInRequest {
    /// Defaults to now
    #[schema(value_type = Option<String>, example = "2026-01-01T12:00:00Z")]
    pub check_in: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckOutResponse {
    pub room: RoomResponse,
    /// Tags returned to the available pool
    pub tags_reset: u64,
}

fn validate_hours_stay(hours_stay: f64) -> Result<f64, ApiError> {
    if hours_stay.is_finite() && hours_stay > 0.0 && hours_stay <= MAX_HOURS_STAY {
        Ok(hours_stay)
    } else {
        Err(validation_error(
            "Invalid hours_stay",
            serde_json::json!({
                "hours_stay": format!("Must be a positive number of hours, at most {MAX_HOURS_STAY}")
            }),
        ))
    }
}

async fn ensure_guest_exists(state: &AppState, guest_id: i32) -> Result<(), ApiError> {
    GuestRepository::new(&state.db)
        .find_by_id(guest_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| not_found("Guest not found"))
}

/// Add a room, optionally reserving it straight away
#[utoipa::path(
    post,
    path = "/api/rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = ApiResponse<RoomResponse>),
        (status = 400, description = "Invalid fields", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError),
        (status = 409, description = "Room number already exists", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn create_room(
    State(state): State<AppState>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RoomResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("room_number", request.room_number.as_str())])?;

    let reservation = match (request.guest_id, request.hours_stay) {
        (Some(guest_id), Some(hours_stay)) => {
            let hours_stay = validate_hours_stay(hours_stay)?;
            ensure_guest_exists(&state, guest_id).await?;
            Some(Reservation {
                guest_id,
                hours_stay,
            })
        }
        (None, None) => None,
        _ => {
            return Err(validation_error(
                "guest_id and hours_stay must be given together",
                serde_json::json!({
                    "guest_id": "Required with hours_stay",
                    "hours_stay": "Required with guest_id"
                }),
            ));
        }
    };

    let room = RoomRepository::new(&state.db)
        .create(NewRoom {
            room_number: request.room_number.trim().to_string(),
            reservation,
        })
        .await?;

    info!(room = %room.room_number, status = room.status.as_str(), "Room created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(format!("Room created successfully (status={})", room.status), room.into()),
    ))
}

/// List every room
#[utoipa::path(
    get,
    path = "/api/rooms",
    responses(
        (status = 200, description = "All rooms", body = ApiResponse<Vec<RoomResponse>>)
    ),
    tag = "rooms"
)]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoomResponse>>>, ApiError> {
    let rooms = RoomRepository::new(&state.db).list_all().await?;
    Ok(ApiResponse::ok(
        "Rooms fetched successfully",
        rooms.into_iter().map(Into::into).collect(),
    ))
}

/// Fetch a room
#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    params(("id" = i32, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room", body = ApiResponse<RoomResponse>),
        (status = 404, description = "Room not found", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RoomResponse>>, ApiError> {
    let room = RoomRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Room not found"))?;

    Ok(ApiResponse::ok("Room fetched successfully", room.into()))
}

/// Reserve an available room for a guest
#[utoipa::path(
    put,
    path = "/api/rooms/assign",
    request_body = AssignRoomRequest,
    responses(
        (status = 200, description = "Room reserved", body = ApiResponse<RoomResponse>),
        (status = 400, description = "No available room with that number", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn assign_room(
    State(state): State<AppState>,
    payload: Result<Json<AssignRoomRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RoomResponse>>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("room_number", request.room_number.as_str())])?;
    let hours_stay = validate_hours_stay(request.hours_stay)?;
    ensure_guest_exists(&state, request.guest_id).await?;

    let room_number = request.room_number.trim();
    let room = RoomRepository::new(&state.db)
        .reserve(
            room_number,
            Reservation {
                guest_id: request.guest_id,
                hours_stay,
            },
        )
        .await?
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "ROOM_NOT_AVAILABLE",
                format!("No available room found with room_number = {room_number}"),
            )
        })?;

    info!(room = %room.room_number, guest_id = request.guest_id, hours_stay, "Room reserved");
    Ok(ApiResponse::ok("Room reserved successfully", room.into()))
}

/// Edit room number, stay length or maintenance state
#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    params(("id" = i32, Path, description = "Room id")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = ApiResponse<RoomResponse>),
        (status = 400, description = "Invalid fields", body = ApiError),
        (status = 404, description = "Room not found", body = ApiError),
        (status = 409, description = "Status change not allowed from the current state", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateRoomRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RoomResponse>>, ApiError> {
    let request = json_body(payload)?;
    let room_number = non_blank(request.room_number);
    let hours_stay = request.hours_stay.map(validate_hours_stay).transpose()?;
    if room_number.is_none() && hours_stay.is_none() && request.status.is_none() {
        return Err(validation_error(
            "No update fields provided",
            serde_json::json!({ "fields": ["room_number", "hours_stay", "status"] }),
        ));
    }

    let repo = RoomRepository::new(&state.db);
    let current = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Room not found"))?;

    let transition = match request.status {
        None => None,
        Some(target) if target == current.status => None,
        Some(RoomStatus::Maintenance) => Some(RoomTransition::EnterMaintenance),
        Some(RoomStatus::Available) if current.status == RoomStatus::Maintenance => {
            Some(RoomTransition::ExitMaintenance)
        }
        Some(target) => {
            return Err(conflict(&format!(
                "Room {} cannot move from {} to {} here; use assign, checkin or checkout",
                current.room_number, current.status, target
            )));
        }
    };

    let mut room = current;
    if room_number.is_some() || hours_stay.is_some() {
        room = repo
            .update_details(id, room_number, hours_stay)
            .await?
            .ok_or_else(|| not_found("Room not found"))?;
    }
    if let Some(transition) = transition {
        room = repo.set_maintenance(id, transition).await?.ok_or_else(|| {
            conflict(&format!(
                "Room {} is {} and cannot {}",
                room.room_number,
                room.status,
                transition.name()
            ))
        })?;
    }

    Ok(ApiResponse::ok("Room updated successfully", room.into()))
}

/// Delete a room that holds no stay
#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Room not found", body = ApiError),
        (status = 409, description = "Room is reserved or occupied", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn delete_room(
    State(state): State<AppState>,
    auth: AdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = RoomRepository::new(&state.db);
    let room = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Room not found"))?;

    if room.status.is_held() {
        return Err(conflict(&format!(
            "Room {} is {}; check it out before deleting",
            room.room_number, room.status
        )));
    }

    if !repo.delete(id).await? {
        return Err(not_found("Room not found"));
    }

    info!(room = %room.room_number, admin_id = auth.admin_id(), "Room deleted");
    Ok(MessageResponse::ok("Room deleted successfully"))
}

/// Staff check-in of a reserved room
#[utoipa::path(
    post,
    path = "/api/rooms/{id}/checkin",
    params(("id" = i32, Path, description = "Room id")),
    request_body(content = CheckInRequest, description = "Optional check-in time"),
    responses(
        (status = 200, description = "Checked in", body = ApiResponse<RoomResponse>),
        (status = 404, description = "Room not found", body = ApiError),
        (status = 409, description = "Room is not reserved", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn check_in_room(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<CheckInRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RoomResponse>>, ApiError> {
    let request = optional_json_body(payload)?;
    let room = StayService::from_config(&state.db, &state.config.scheduler)
        .check_in(id, request.check_in)
        .await?;

    Ok(ApiResponse::ok("Check-in successful", room.into()))
}

/// Staff checkout: frees the room and the guest's tags
#[utoipa::path(
    post,
    path = "/api/rooms/{id}/checkout",
    params(("id" = i32, Path, description = "Room id")),
    responses(
        (status = 200, description = "Checked out", body = ApiResponse<CheckOutResponse>),
        (status = 404, description = "Room not found", body = ApiError),
        (status = 409, description = "Room holds no stay", body = ApiError)
    ),
    tag = "rooms"
)]
pub async fn check_out_room(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CheckOutResponse>>, ApiError> {
    let outcome = StayService::from_config(&state.db, &state.config.scheduler)
        .check_out(id)
        .await?;

    Ok(ApiResponse::ok(
        "Check-out successful",
        CheckOutResponse {
            room: outcome.room.into(),
            tags_reset: outcome.tags_reset,
        },
    ))
}
