//! # MAC Address API Handlers
//!
//! Wi-Fi captive portal bookkeeping. A device whose status is `connected`
//! is on the whitelist.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ApiError, not_found};
use crate::handlers::types::{ApiResponse, json_body, non_blank, reject_blank};
use crate::models::mac_address::MacAddressResponse;
use crate::repositories::MacAddressRepository;
use crate::repositories::mac_address::NewMacAddress;
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LogMacAddressRequest {
    #[schema(example = "AA:BB:CC:DD:EE:FF")]
    pub mac: String,
    #[schema(example = "10.0.0.23")]
    pub ip: Option<String>,
    pub guest_id: Option<i32>,
    pub rfid_uid: Option<String>,
    /// Defaults to `pending`
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMacStatusRequest {
    #[schema(example = "AA:BB:CC:DD:EE:FF")]
    pub mac: String,
    #[schema(example = "connected")]
    pub status: String,
}

/// Record a device seen on the network
#[utoipa::path(
    post,
    path = "/api/mac-address/log",
    request_body = LogMacAddressRequest,
    responses(
        (status = 201, description = "Device recorded", body = ApiResponse<MacAddressResponse>),
        (status = 400, description = "MAC is required", body = ApiError)
    ),
    tag = "mac-address"
)]
pub async fn log_mac_address(
    State(state): State<AppState>,
    payload: Result<Json<LogMacAddressRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<MacAddressResponse>>), ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[("mac", request.mac.as_str())])?;

    let entry = MacAddressRepository::new(&state.db)
        .create(NewMacAddress {
            mac: request.mac.trim().to_string(),
            ip: non_blank(request.ip),
            guest_id: request.guest_id,
            rfid_uid: non_blank(request.rfid_uid),
            status: non_blank(request.status),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("MAC address logged successfully", entry.into()),
    ))
}

/// Distinct MACs currently whitelisted
#[utoipa::path(
    get,
    path = "/api/mac-address/whitelisted",
    responses(
        (status = 200, description = "Whitelisted MAC addresses", body = ApiResponse<Vec<String>>)
    ),
    tag = "mac-address"
)]
pub async fn list_whitelisted_macs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let macs = MacAddressRepository::new(&state.db)
        .list_whitelisted()
        .await?;
    Ok(ApiResponse::ok("Whitelisted MAC addresses fetched successfully", macs))
}

/// Set the status of every record for a MAC
#[utoipa::path(
    post,
    path = "/api/mac-address/update-status",
    request_body = UpdateMacStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Vec<MacAddressResponse>>),
        (status = 400, description = "mac and status are required", body = ApiError),
        (status = 404, description = "MAC address not found", body = ApiError)
    ),
    tag = "mac-address"
)]
pub async fn update_mac_status(
    State(state): State<AppState>,
    payload: Result<Json<UpdateMacStatusRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<MacAddressResponse>>>, ApiError> {
    let request = json_body(payload)?;
    reject_blank(&[
        ("mac", request.mac.as_str()),
        ("status", request.status.as_str()),
    ])?;

    let mac = request.mac.trim();
    let status = request.status.trim();
    let rows = MacAddressRepository::new(&state.db)
        .update_status(mac, status)
        .await?;

    if rows.is_empty() {
        return Err(not_found("MAC address not found"));
    }

    info!(mac, status, devices = rows.len(), "MAC status updated");
    Ok(ApiResponse::ok(
        format!("MAC {mac} status updated to {status}"),
        rows.into_iter().map(Into::into).collect(),
    ))
}
