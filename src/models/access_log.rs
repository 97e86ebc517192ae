//! Access log entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "access_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub rfid_uid: String,
    pub guest_id: Option<i32>,
    pub access_status: AccessStatus,
    pub door_unlocked: bool,
    pub timestamp: DateTimeWithTimeZone,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AccessStatus {
    #[sea_orm(string_value = "granted")]
    #[serde(rename = "granted")]
    Granted,

    #[sea_orm(string_value = "denied")]
    #[serde(rename = "denied")]
    Denied,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessLogResponse {
    pub id: i32,
    pub rfid_uid: String,
    pub guest_id: Option<i32>,
    pub access_status: AccessStatus,
    pub door_unlocked: bool,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub timestamp: DateTimeWithTimeZone,
}

impl From<Model> for AccessLogResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            rfid_uid: model.rfid_uid,
            guest_id: model.guest_id,
            access_status: model.access_status,
            door_unlocked: model.door_unlocked,
            timestamp: model.timestamp,
        }
    }
}
