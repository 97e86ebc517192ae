//! MAC address entity model
//!
//! Devices report in as `pending`; the captive portal flips them to
//! `connected`, which is what the whitelist endpoint returns.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONNECTED: &str = "connected";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mac_addresses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub mac: String,
    pub ip: Option<String>,
    pub guest_id: Option<i32>,
    pub rfid_uid: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MacAddressResponse {
    pub id: i32,
    pub mac: String,
    pub ip: Option<String>,
    pub guest_id: Option<i32>,
    pub rfid_uid: Option<String>,
    pub status: String,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for MacAddressResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            mac: model.mac,
            ip: model.ip,
            guest_id: model.guest_id,
            rfid_uid: model.rfid_uid,
            status: model.status,
            created_at: model.created_at,
        }
    }
}
