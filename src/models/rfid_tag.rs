//! RFID tag entity model
//!
//! A tag is a physical access card. Its `status` only moves forward along
//! `available -> assigned -> active`; `lost` is terminal and unassigning
//! returns an `assigned`/`active` tag to `available`.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rfid_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub rfid_uid: String,

    pub status: RfidStatus,

    /// Owning guest while assigned or active
    pub guest_id: Option<i32>,

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
pub enum RfidStatus {
    #[sea_orm(string_value = "available")]
    #[serde(rename = "available")]
    #[default]
    Available,

    #[sea_orm(string_value = "assigned")]
    #[serde(rename = "assigned")]
    Assigned,

    #[sea_orm(string_value = "active")]
    #[serde(rename = "active")]
    Active,

    #[sea_orm(string_value = "lost")]
    #[serde(rename = "lost")]
    Lost,
}

impl RfidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RfidStatus::Available => "available",
            RfidStatus::Assigned => "assigned",
            RfidStatus::Active => "active",
            RfidStatus::Lost => "lost",
        }
    }

    /// Whether a tag in this state can open a door.
    pub fn grants_access(&self) -> bool {
        matches!(self, RfidStatus::Assigned | RfidStatus::Active)
    }
}

impl std::fmt::Display for RfidStatus {
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
pub struct RfidTagResponse {
    pub id: i32,
    pub rfid_uid: String,
    pub status: RfidStatus,
    pub guest_id: Option<i32>,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for RfidTagResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            rfid_uid: model.rfid_uid,
            status: model.status,
            guest_id: model.guest_id,
            updated_at: model.updated_at,
        }
    }
}
