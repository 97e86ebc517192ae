//! # Auth API Handlers
//!
//! Admin login issuing signed bearer tokens.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{issue_admin_token, verify_password_async};
use crate::error::{ApiError, unauthorized};
use crate::handlers::types::{ApiResponse, json_body, reject_blank};
use crate::models::admin::AdminResponse;
use crate::repositories::AdminRepository;
use crate::server::AppState;

/// Credentials for admin or guest login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email (admins); email or phone (guests)
    #[schema(example = "frontdesk")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminLoginResponse {
    pub admin: AdminResponse,
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

/// Admin login by username or email
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AdminLoginResponse>),
        (status = 400, description = "Missing credentials", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AdminLoginResponse>>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("identifier", request.identifier.as_str()),
        ("password", request.password.as_str()),
    ])?;

    let admin = AdminRepository::new(&state.db)
        .find_by_identifier(request.identifier.trim())
        .await?
        .ok_or_else(|| unauthorized(Some("Invalid credentials")))?;
    if !verify_password_async(&request.password, &admin.password_hash).await? {
        return Err(unauthorized(Some("Invalid credentials")));
    }

    let token = issue_admin_token(&state.config, &admin)?;
    info!(admin_id = admin.id, role = admin.role.as_str(), "Admin logged in");

    Ok(ApiResponse::ok(
        "Login successful",
        AdminLoginResponse {
            admin: admin.into(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: state.config.jwt_expiry_seconds,
        },
    ))
}
