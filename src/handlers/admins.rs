//! # Admins API Handlers
//!
//! Admin account management. Creating the first admin needs no token;
//! every later account is created by a superadmin.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{AdminAuth, hash_password_async, verify_password_async};
use crate::error::{ApiError, forbidden, missing_fields, not_found, unauthorized};
use crate::handlers::types::{ApiResponse, MessageResponse, json_body, non_blank, reject_blank};
use crate::models::admin::{AdminResponse, AdminRole};
use crate::repositories::AdminRepository;
use crate::repositories::admin::{AdminProfileUpdate, NewAdmin};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdminRequest {
    #[schema(example = "frontdesk")]
    pub username: String,
    pub password: String,
    #[schema(example = "frontdesk@example.com")]
    pub email: String,
    /// Defaults to `admin`
    pub role: Option<AdminRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeAdminPasswordRequest {
    pub admin_id: i32,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditAdminProfileRequest {
    pub admin_id: i32,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<AdminRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadAdminAvatarRequest {
    pub admin_id: i32,
    pub avatar_url: String,
}

/// Create an admin account
#[utoipa::path(
    post,
    path = "/api/admins/create",
    security((), ("bearer_auth" = [])),
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<AdminResponse>),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 401, description = "Token required once an admin exists", body = ApiError),
        (status = 403, description = "Superadmin role required", body = ApiError),
        (status = 409, description = "Username or email taken", body = ApiError)
    ),
    tag = "admins"
)]
pub async fn create_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateAdminRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AdminResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("username", request.username.as_str()),
        ("password", request.password.as_str()),
        ("email", request.email.as_str()),
    ])?;

    let repo = AdminRepository::new(&state.db);
    let bootstrap = repo.list_ids().await?.is_empty();
    if !bootstrap {
        AdminAuth::from_headers(&state.config, &headers)?.require_superadmin()?;
    }

    let password_hash = hash_password_async(&request.password).await?;
    let admin = repo
        .create(NewAdmin {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
            role: request.role.unwrap_or_default(),
        })
        .await?;

    info!(admin_id = admin.id, role = admin.role.as_str(), bootstrap, "Admin created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Admin created successfully", admin.into()),
    ))
}

/// List every admin
#[utoipa::path(
    get,
    path = "/api/admins",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All admins", body = ApiResponse<Vec<AdminResponse>>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "admins"
)]
pub async fn list_admins(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<ApiResponse<Vec<AdminResponse>>>, ApiError> {
    let admins = AdminRepository::new(&state.db).list_all().await?;
    Ok(ApiResponse::ok(
        "Admins fetched successfully",
        admins.into_iter().map(Into::into).collect(),
    ))
}

/// Change an admin's password
#[utoipa::path(
    post,
    path = "/api/admins/change_password",
    security(("bearer_auth" = [])),
    request_body = ChangeAdminPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Current password is wrong", body = ApiError),
        (status = 403, description = "Not your account", body = ApiError),
        (status = 404, description = "Admin not found", body = ApiError)
    ),
    tag = "admins"
)]
pub async fn change_admin_password(
    State(state): State<AppState>,
    auth: AdminAuth,
    payload: Result<Json<ChangeAdminPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("current_password", request.current_password.as_str()),
        ("new_password", request.new_password.as_str()),
    ])?;
    auth.require_self_or_superadmin(request.admin_id)?;

    let repo = AdminRepository::new(&state.db);
    let admin = repo
        .find_by_id(request.admin_id)
        .await?
        .ok_or_else(|| not_found("Admin not found"))?;

    if !verify_password_async(&request.current_password, &admin.password_hash).await? {
        return Err(unauthorized(Some("Incorrect current password")));
    }

    let password_hash = hash_password_async(&request.new_password).await?;
    repo.update_password(admin.id, password_hash).await?;

    info!(admin_id = admin.id, "Admin password changed");
    Ok(MessageResponse::ok("Password updated successfully"))
}

/// Edit an admin's username, email or role
#[utoipa::path(
    post,
    path = "/api/admins/edit_profile",
    security(("bearer_auth" = [])),
    request_body = EditAdminProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<AdminResponse>),
        (status = 400, description = "No fields to update", body = ApiError),
        (status = 403, description = "Not permitted", body = ApiError),
        (status = 404, description = "Admin not found", body = ApiError)
    ),
    tag = "admins"
)]
pub async fn edit_admin_profile(
    State(state): State<AppState>,
    auth: AdminAuth,
    payload: Result<Json<EditAdminProfileRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AdminResponse>>, ApiError> {
    let request = json_body(payload)?;
    let update = AdminProfileUpdate {
        username: non_blank(request.username),
        email: non_blank(request.email),
        role: request.role,
    };
    if update.username.is_none() && update.email.is_none() && update.role.is_none() {
        return Err(missing_fields(&["username", "email", "role"]));
    }

    auth.require_self_or_superadmin(request.admin_id)?;
    if update.role.is_some() && auth.require_superadmin().is_err() {
        return Err(forbidden(Some("Only a superadmin may change roles")));
    }

    let admin = AdminRepository::new(&state.db)
        .update_profile(request.admin_id, update)
        .await?
        .ok_or_else(|| not_found("Admin not found"))?;

    Ok(ApiResponse::ok("Admin profile updated successfully", admin.into()))
}

/// Set an admin's avatar URL
#[utoipa::path(
    post,
    path = "/api/admins/upload_avatar",
    security(("bearer_auth" = [])),
    request_body = UploadAdminAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<AdminResponse>),
        (status = 403, description = "Not your account", body = ApiError),
        (status = 404, description = "Admin not found", body = ApiError)
    ),
    tag = "admins"
)]
pub async fn upload_admin_avatar(
    State(state): State<AppState>,
    auth: AdminAuth,
    payload: Result<Json<UploadAdminAvatarRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AdminResponse>>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("avatar_url", request.avatar_url.as_str())])?;
    auth.require_self_or_superadmin(request.admin_id)?;

    let admin = AdminRepository::new(&state.db)
        .update_avatar(request.admin_id, request.avatar_url.trim().to_string())
        .await?
        .ok_or_else(|| not_found("Admin not found"))?;

    Ok(ApiResponse::ok("Admin avatar updated successfully", admin.into()))
}

/// Sign an admin out
///
/// Tokens are stateless; clients discard theirs.
#[utoipa::path(
    post,
    path = "/api/admins/sign_out",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "admins"
)]
pub async fn sign_out_admin(auth: AdminAuth) -> Json<MessageResponse> {
    info!(admin_id = auth.admin_id(), "Admin signed out");
    MessageResponse::ok("Admin signed out successfully")
}
