//! # Server Configuration
//!
//! Router, shared state, middleware stack and OpenAPI document for the
//! Innkeeper API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers::{
    self, access_logs, activity_logs, admins, auth, feedback, guests, mac_address, notifications,
    rfid, rooms, service_requests,
};
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .merge(api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // auth
        .route("/api/auth/login", post(auth::admin_login))
        // guests
        .route("/api/guests", get(guests::list_guests))
        .route("/api/guests/register", post(guests::register_guest))
        .route("/api/guests/login", post(guests::login_guest))
        .route("/api/guests/search", get(guests::search_guests))
        .route("/api/guests/profile", put(guests::update_guest_profile))
        .route("/api/guests/change-password", post(guests::change_guest_password))
        .route("/api/guests/avatar", post(guests::upload_guest_avatar))
        .route("/api/guests/sign-out", post(guests::sign_out_guest))
        .route("/api/guests/{guest_id}", get(guests::get_guest))
        // admins
        .route("/api/admins", get(admins::list_admins))
        .route("/api/admins/create", post(admins::create_admin))
        .route("/api/admins/login", post(auth::admin_login))
        .route("/api/admins/change_password", post(admins::change_admin_password))
        .route("/api/admins/edit_profile", post(admins::edit_admin_profile))
        .route("/api/admins/upload_avatar", post(admins::upload_admin_avatar))
        .route("/api/admins/sign_out", post(admins::sign_out_admin))
        // rfid
        .route("/api/rfid", post(rfid::register_rfid))
        .route("/api/rfid/all", get(rfid::list_rfid_tags))
        .route("/api/rfid/available", get(rfid::list_available_rfid_tags))
        .route("/api/rfid/assign", post(rfid::assign_rfid))
        .route("/api/rfid/activate", post(rfid::activate_rfid))
        .route("/api/rfid/lost", post(rfid::mark_rfid_lost))
        .route("/api/rfid/unassign", post(rfid::unassign_rfid))
        .route("/api/rfid/verify", post(rfid::verify_rfid))
        // rooms
        .route("/api/rooms", post(rooms::create_room).get(rooms::list_rooms))
        .route("/api/rooms/assign", put(rooms::assign_room))
        .route(
            "/api/rooms/{id}",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
        .route("/api/rooms/{id}/checkin", post(rooms::check_in_room))
        .route("/api/rooms/{id}/checkout", post(rooms::check_out_room))
        // service requests
        .route(
            "/api/service-requests/submit",
            post(service_requests::submit_service_request),
        )
        .route(
            "/api/service-requests/{request_id}/status",
            put(service_requests::update_service_request_status),
        )
        .route(
            "/api/service-requests/guest/{guest_id}",
            get(service_requests::list_guest_service_requests),
        )
        // feedback
        .route("/api/feedback/submit", post(feedback::submit_feedback))
        .route("/api/feedback/guest/{guest_id}", get(feedback::list_guest_feedback))
        // notifications
        .route("/api/notifications", post(notifications::create_guest_notification))
        .route(
            "/api/notifications/admin",
            post(notifications::create_admin_notification),
        )
        .route(
            "/api/notifications/guest/{guest_id}",
            get(notifications::list_guest_notifications),
        )
        .route(
            "/api/notifications/admin/{admin_id}",
            get(notifications::list_admin_notifications),
        )
        .route(
            "/api/notifications/{id}/mark-read",
            put(notifications::mark_notification_read),
        )
        .route("/api/notifications/{id}", delete(notifications::delete_notification))
        // access logs
        .route("/api/access-logs/granted", post(access_logs::log_access_granted))
        .route("/api/access-logs/denied", post(access_logs::log_access_denied))
        .route("/api/access-logs/{guest_id}", get(access_logs::list_guest_access_logs))
        // activity logs
        .route("/api/activity-logs", post(activity_logs::create_activity_log))
        .route(
            "/api/activity-logs/{request_id}",
            get(activity_logs::list_request_activity_logs),
        )
        // mac addresses
        .route("/api/mac-address/log", post(mac_address::log_mac_address))
        .route(
            "/api/mac-address/whitelisted",
            get(mac_address::list_whitelisted_macs),
        )
        .route(
            "/api/mac-address/update-status",
            post(mac_address::update_mac_status),
        )
}

/// Serves the API until `shutdown` is cancelled, then drains in-flight
/// requests.
pub async fn run_server(
    config: Arc<AppConfig>,
    db: DatabaseConnection,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, profile = %config.profile, "Server listening");

    let app = create_app(AppState { config, db });
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::auth::admin_login,
        crate::handlers::guests::register_guest,
        crate::handlers::guests::login_guest,
        crate::handlers::guests::list_guests,
        crate::handlers::guests::search_guests,
        crate::handlers::guests::get_guest,
        crate::handlers::guests::update_guest_profile,
        crate::handlers::guests::change_guest_password,
        crate::handlers::guests::upload_guest_avatar,
        crate::handlers::guests::sign_out_guest,
        crate::handlers::admins::create_admin,
        crate::handlers::admins::list_admins,
        crate::handlers::admins::change_admin_password,
        crate::handlers::admins::edit_admin_profile,
        crate::handlers::admins::upload_admin_avatar,
        crate::handlers::admins::sign_out_admin,
        crate::handlers::rfid::register_rfid,
        crate::handlers::rfid::list_rfid_tags,
        crate::handlers::rfid::list_available_rfid_tags,
        crate::handlers::rfid::assign_rfid,
        crate::handlers::rfid::activate_rfid,
        crate::handlers::rfid::mark_rfid_lost,
        crate::handlers::rfid::unassign_rfid,
        crate::handlers::rfid::verify_rfid,
        crate::handlers::rooms::create_room,
        crate::handlers::rooms::list_rooms,
        crate::handlers::rooms::get_room,
        crate::handlers::rooms::assign_room,
        crate::handlers::rooms::update_room,
        crate::handlers::rooms::delete_room,
        crate::handlers::rooms::check_in_room,
        crate::handlers::rooms::check_out_room,
        crate::handlers::service_requests::submit_service_request,
        crate::handlers::service_requests::update_service_request_status,
        crate::handlers::service_requests::list_guest_service_requests,
        crate::handlers::feedback::submit_feedback,
        crate::handlers::feedback::list_guest_feedback,
        crate::handlers::notifications::create_guest_notification,
        crate::handlers::notifications::create_admin_notification,
        crate::handlers::notifications::list_guest_notifications,
        crate::handlers::notifications::list_admin_notifications,
        crate::handlers::notifications::mark_notification_read,
        crate::handlers::notifications::delete_notification,
        crate::handlers::access_logs::log_access_granted,
        crate::handlers::access_logs::log_access_denied,
        crate::handlers::access_logs::list_guest_access_logs,
        crate::handlers::activity_logs::create_activity_log,
        crate::handlers::activity_logs::list_request_activity_logs,
        crate::handlers::mac_address::log_mac_address,
        crate::handlers::mac_address::list_whitelisted_macs,
        crate::handlers::mac_address::update_mac_status,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::error::ApiError,
            crate::handlers::types::MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin authentication"),
        (name = "guests", description = "Guest accounts"),
        (name = "admins", description = "Admin accounts"),
        (name = "rfid", description = "RFID tag lifecycle and door verification"),
        (name = "rooms", description = "Rooms, reservations and stays"),
        (name = "service-requests", description = "Guest service requests"),
        (name = "feedback", description = "Guest feedback and complaints"),
        (name = "notifications", description = "Guest and admin notifications"),
        (name = "access-logs", description = "Door access events"),
        (name = "activity-logs", description = "Service request activity"),
        (name = "mac-address", description = "Wi-Fi device whitelist"),
    ),
    info(
        title = "Innkeeper API",
        description = "Hotel and hostel guest management",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
