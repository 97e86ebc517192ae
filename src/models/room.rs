//! Room entity model
//!
//! While `reserved` or `occupied` a room references exactly one guest, and
//! while `occupied` it carries `check_in < check_out`. An `available` room
//! has no guest, no stay length and no timestamps.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub room_number: String,

    pub status: RoomStatus,

    pub guest_id: Option<i32>,

    /// Booked stay length in hours; fractional values are allowed
    pub hours_stay: Option<f64>,

    /// When the reservation was made
    pub registration_time: Option<DateTimeWithTimeZone>,

    pub check_in: Option<DateTimeWithTimeZone>,

    pub check_out: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RoomStatus {
    #[sea_orm(string_value = "available")]
    #[serde(rename = "available")]
    #[default]
    Available,

    #[sea_orm(string_value = "reserved")]
    #[serde(rename = "reserved")]
    Reserved,

    #[sea_orm(string_value = "occupied")]
    #[serde(rename = "occupied")]
    Occupied,

    #[sea_orm(string_value = "maintenance")]
    #[serde(rename = "maintenance")]
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Reserved => "reserved",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
        }
    }

    /// Reserved and occupied rooms are bound to a guest.
    pub fn is_held(&self) -> bool {
        matches!(self, RoomStatus::Reserved | RoomStatus::Occupied)
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::guest::Entity",
        from = "Column::GuestId",
        to = "super::guest::Column::Id"
    )]
    Guest,
}

impl Related<super::guest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    pub id: i32,
    pub room_number: String,
    pub status: RoomStatus,
    pub guest_id: Option<i32>,
    pub hours_stay: Option<f64>,
    #[schema(value_type = Option<String>, example = "2026-01-01T12:00:00Z")]
    pub registration_time: Option<DateTimeWithTimeZone>,
    #[schema(value_type = Option<String>, example = "2026-01-01T12:00:00Z")]
    pub check_in: Option<DateTimeWithTimeZone>,
    #[schema(value_type = Option<String>, example = "2026-01-01T14:00:00Z")]
    pub check_out: Option<DateTimeWithTimeZone>,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for RoomResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            room_number: model.room_number,
            status: model.status,
            guest_id: model.guest_id,
            hours_stay: model.hours_stay,
            registration_time: model.registration_time,
            check_in: model.check_in,
            check_out: model.check_out,
            updated_at: model.updated_at,
        }
    }
}
