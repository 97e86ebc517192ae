//! # Notification API Handlers
//!
//! Manual notifications to guests or admins, inbox listing, read marking
//! and admin deletion. System notifications (service requests, stay
//! warnings, checkouts) are written by their own code paths.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::AdminAuth;
use crate::error::{ApiError, not_found};
use crate::handlers::types::{ApiResponse, MessageResponse, json_body, non_blank, reject_blank};
use crate::models::notification::{NotificationResponse, Recipient};
use crate::repositories::{
    AdminRepository, GuestRepository, NotificationDraft, NotificationRepository,
};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGuestNotificationRequest {
    pub recipient_guest_id: i32,
    #[schema(example = "Welcome")]
    pub title: String,
    #[schema(example = "Breakfast is served from 7am")]
    pub message: String,
    pub notification_type: Option<String>,
    pub note_message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdminNotificationRequest {
    pub recipient_admin_id: i32,
    pub title: String,
    pub message: String,
    pub notification_type: Option<String>,
    pub note_message: Option<String>,
}

fn draft_from(
    title: &str,
    message: &str,
    notification_type: Option<String>,
    note_message: Option<String>,
) -> NotificationDraft {
    let mut draft = NotificationDraft::new(title.trim(), message.trim());
    if let Some(kind) = non_blank(notification_type) {
        draft = draft.with_type(&kind);
    }
    if let Some(note) = non_blank(note_message) {
        draft = draft.with_note(note);
    }
    draft
}

/// Send a notification to a guest
#[utoipa::path(
    post,
    path = "/api/notifications",
    request_body = CreateGuestNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = ApiResponse<NotificationResponse>),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 404, description = "Guest not found", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn create_guest_notification(
    State(state): State<AppState>,
    payload: Result<Json<CreateGuestNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<NotificationResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("title", request.title.as_str()),
        ("message", request.message.as_str()),
    ])?;

    GuestRepository::new(&state.db)
        .find_by_id(request.recipient_guest_id)
        .await?
        .ok_or_else(|| not_found("Guest not found"))?;

    let draft = draft_from(
        &request.title,
        &request.message,
        request.notification_type,
        request.note_message,
    );
    let notification = NotificationRepository::new(&state.db)
        .create(Recipient::Guest(request.recipient_guest_id), draft)
        .await?;

    info!(notification_id = notification.id, guest_id = request.recipient_guest_id, "Guest notification created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Notification created successfully", notification.into()),
    ))
}

/// Send a notification to an admin
#[utoipa::path(
    post,
    path = "/api/notifications/admin",
    request_body = CreateAdminNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = ApiResponse<NotificationResponse>),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 404, description = "Admin not found", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn create_admin_notification(
    State(state): State<AppState>,
    payload: Result<Json<CreateAdminNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<NotificationResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("title", request.title.as_str()),
        ("message", request.message.as_str()),
    ])?;

    AdminRepository::new(&state.db)
        .find_by_id(request.recipient_admin_id)
        .await?
        .ok_or_else(|| not_found("Admin not found"))?;

    let draft = draft_from(
        &request.title,
        &request.message,
        request.notification_type,
        request.note_message,
    );
    let notification = NotificationRepository::new(&state.db)
        .create(Recipient::Admin(request.recipient_admin_id), draft)
        .await?;

    info!(notification_id = notification.id, admin_id = request.recipient_admin_id, "Admin notification created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Admin notification created successfully", notification.into()),
    ))
}

/// A guest's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications/guest/{guest_id}",
    params(("guest_id" = i32, Path, description = "Guest id")),
    responses(
        (status = 200, description = "Notifications", body = ApiResponse<Vec<NotificationResponse>>),
        (status = 404, description = "No notifications for this guest", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn list_guest_notifications(
    State(state): State<AppState>,
    Path(guest_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<NotificationResponse>>>, ApiError> {
    list_inbox(&state, Recipient::Guest(guest_id), "No notifications found for this guest").await
}

/// An admin's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications/admin/{admin_id}",
    params(("admin_id" = i32, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Notifications", body = ApiResponse<Vec<NotificationResponse>>),
        (status = 404, description = "No notifications for this admin", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn list_admin_notifications(
    State(state): State<AppState>,
    Path(admin_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<NotificationResponse>>>, ApiError> {
    list_inbox(&state, Recipient::Admin(admin_id), "No notifications found for this admin").await
}

async fn list_inbox(
    state: &AppState,
    recipient: Recipient,
    empty_message: &str,
) -> Result<Json<ApiResponse<Vec<NotificationResponse>>>, ApiError> {
    let notifications = NotificationRepository::new(&state.db)
        .list_for(recipient)
        .await?;

    if notifications.is_empty() {
        return Err(not_found(empty_message));
    }

    Ok(ApiResponse::ok(
        "Notifications retrieved successfully",
        notifications.into_iter().map(Into::into).collect(),
    ))
}

/// Mark a notification read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/mark-read",
    params(("id" = i32, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read", body = ApiResponse<NotificationResponse>),
        (status = 404, description = "Notification not found", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NotificationResponse>>, ApiError> {
    let notification = NotificationRepository::new(&state.db)
        .mark_read(id)
        .await?
        .ok_or_else(|| not_found("Notification not found"))?;

    Ok(ApiResponse::ok("Notification marked as read", notification.into()))
}

/// Delete a notification
#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Notification not found", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !NotificationRepository::new(&state.db).delete(id).await? {
        return Err(not_found("Notification not found"));
    }

    info!(notification_id = id, admin_id = auth.admin_id(), "Notification deleted");
    Ok(MessageResponse::ok("Notification deleted successfully"))
}
