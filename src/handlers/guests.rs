//! # Guests API Handlers
//!
//! Registration, login and profile management for guests, plus the admin
//! listing and search endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::auth::{AdminAuth, hash_password_async, verify_password_async};
use crate::error::{ApiError, missing_fields, not_found, unauthorized};
use crate::handlers::auth::LoginRequest;
use crate::handlers::types::{ApiResponse, MessageResponse, json_body, non_blank, reject_blank};
use crate::models::guest::GuestResponse;
use crate::repositories::GuestRepository;
use crate::repositories::guest::{GuestProfileUpdate, NewGuest};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterGuestRequest {
    #[schema(example = "Ana Lima")]
    pub name: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "555-0100")]
    pub phone: String,
    pub password: String,
    /// Defaults to `Regular`
    pub membership_level: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGuestProfileRequest {
    pub guest_id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub guest_id: i32,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAvatarRequest {
    pub guest_id: i32,
    #[schema(example = "https://cdn.example.com/avatars/ana.png")]
    pub avatar_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GuestRef {
    pub guest_id: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive match against name, email or phone
    pub query: Option<String>,
}

/// Register a new guest
#[utoipa::path(
    post,
    path = "/api/guests/register",
    request_body = RegisterGuestRequest,
    responses(
        (status = 201, description = "Guest registered", body = ApiResponse<GuestResponse>),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn register_guest(
    State(state): State<AppState>,
    payload: Result<Json<RegisterGuestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<GuestResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("name", request.name.as_str()),
        ("email", request.email.as_str()),
        ("phone", request.phone.as_str()),
        ("password", request.password.as_str()),
    ])?;

    let password_hash = hash_password_async(&request.password).await?;
    let guest = GuestRepository::new(&state.db)
        .create(NewGuest {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            password_hash,
            membership_level: non_blank(request.membership_level),
        })
        .await?;

    info!(guest_id = guest.id, "Guest registered");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Guest registered successfully", guest.into()),
    ))
}

/// Guest login by email or phone
///
/// Phone numbers are not unique; the first guest whose password matches wins.
#[utoipa::path(
    post,
    path = "/api/guests/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<GuestResponse>),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn login_guest(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GuestResponse>>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("identifier", request.identifier.as_str()),
        ("password", request.password.as_str()),
    ])?;

    let repo = GuestRepository::new(&state.db);
    let identifier = request.identifier.trim();
    let candidates = if identifier.contains('@') {
        repo.find_by_email(identifier).await?.into_iter().collect()
    } else {
        repo.find_by_phone(identifier).await?
    };

    if candidates.is_empty() {
        return Err(not_found("Guest not found"));
    }

    // Phone numbers may be shared; the first matching password wins
    let mut matched = None;
    for guest in candidates {
        if verify_password_async(&request.password, &guest.password_hash).await? {
            matched = Some(guest);
            break;
        }
    }
    let guest = matched.ok_or_else(|| unauthorized(Some("Invalid credentials")))?;

    info!(guest_id = guest.id, "Guest logged in");
    Ok(ApiResponse::ok("Guest logged in successfully", guest.into()))
}

/// List every guest
#[utoipa::path(
    get,
    path = "/api/guests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All guests", body = ApiResponse<Vec<GuestResponse>>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn list_guests(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<ApiResponse<Vec<GuestResponse>>>, ApiError> {
    let guests = GuestRepository::new(&state.db).list_all().await?;
    Ok(ApiResponse::ok(
        "Guests fetched successfully",
        guests.into_iter().map(Into::into).collect(),
    ))
}

/// Search guests by name, email or phone
#[utoipa::path(
    get,
    path = "/api/guests/search",
    security(("bearer_auth" = [])),
    params(SearchParams),
    responses(
        (status = 200, description = "Matching guests", body = ApiResponse<Vec<GuestResponse>>),
        (status = 400, description = "Query string is required", body = ApiError),
        (status = 404, description = "No matching guest", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn search_guests(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<Vec<GuestResponse>>>, ApiError> {
    let query = non_blank(params.query).ok_or_else(|| missing_fields(&["query"]))?;

    let guests = GuestRepository::new(&state.db).search(&query).await?;
    if guests.is_empty() {
        return Err(not_found("No matching guest found"));
    }

    Ok(ApiResponse::ok(
        "Guests fetched successfully",
        guests.into_iter().map(Into::into).collect(),
    ))
}

/// Fetch a guest profile
#[utoipa::path(
    get,
    path = "/api/guests/{guest_id}",
    params(("guest_id" = i32, Path, description = "Guest id")),
    responses(
        (status = 200, description = "Guest profile", body = ApiResponse<GuestResponse>),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn get_guest(
    State(state): State<AppState>,
    Path(guest_id): Path<i32>,
) -> Result<Json<ApiResponse<GuestResponse>>, ApiError> {
    let guest = GuestRepository::new(&state.db)
        .find_by_id(guest_id)
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    Ok(ApiResponse::ok("Guest fetched successfully", guest.into()))
}

/// Update guest name, email or phone
#[utoipa::path(
    put,
    path = "/api/guests/profile",
    request_body = UpdateGuestProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<GuestResponse>),
        (status = 400, description = "No fields to update", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError),
        (status = 409, description = "Email already in use", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn update_guest_profile(
    State(state): State<AppState>,
    payload: Result<Json<UpdateGuestProfileRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GuestResponse>>, ApiError> {
    let request = json_body(payload)?;
    let update = GuestProfileUpdate {
        name: non_blank(request.name),
        email: non_blank(request.email),
        phone: non_blank(request.phone),
    };
    if update.name.is_none() && update.email.is_none() && update.phone.is_none() {
        return Err(missing_fields(&["name", "email", "phone"]));
    }

    let guest = GuestRepository::new(&state.db)
        .update_profile(request.guest_id, update)
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    Ok(ApiResponse::ok("Guest profile updated successfully", guest.into()))
}

/// Change a guest's password
#[utoipa::path(
    post,
    path = "/api/guests/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Current password is wrong", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn change_guest_password(
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("current_password", request.current_password.as_str()),
        ("new_password", request.new_password.as_str()),
    ])?;

    let repo = GuestRepository::new(&state.db);
    let guest = repo
        .find_by_id(request.guest_id)
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    if !verify_password_async(&request.current_password, &guest.password_hash).await? {
        return Err(unauthorized(Some("Invalid current password")));
    }

    let password_hash = hash_password_async(&request.new_password).await?;
    if !repo.update_password(guest.id, password_hash).await? {
        return Err(not_found("Guest not found"));
    }

    info!(guest_id = guest.id, "Guest password changed");
    Ok(MessageResponse::ok("Guest password changed successfully"))
}

/// Set a guest's avatar URL
#[utoipa::path(
    post,
    path = "/api/guests/avatar",
    request_body = UpdateAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<GuestResponse>),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn upload_guest_avatar(
    State(state): State<AppState>,
    payload: Result<Json<UpdateAvatarRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GuestResponse>>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("avatar_url", request.avatar_url.as_str())])?;

    let guest = GuestRepository::new(&state.db)
        .update_avatar(request.guest_id, request.avatar_url.trim().to_string())
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    Ok(ApiResponse::ok("Guest avatar updated successfully", guest.into()))
}

/// Sign a guest out
#[utoipa::path(
    post,
    path = "/api/guests/sign-out",
    request_body = GuestRef,
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn sign_out_guest(
    State(state): State<AppState>,
    payload: Result<Json<GuestRef>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = json_body(payload)?;
    GuestRepository::new(&state.db)
        .find_by_id(request.guest_id)
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    Ok(MessageResponse::ok("Guest signed out successfully"))
}
