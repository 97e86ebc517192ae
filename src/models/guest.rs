//! Guest entity model
//!
//! Guests register themselves, sign in with email or phone, and own rooms,
//! RFID tags, service requests and feedback.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Membership level assigned at registration.
pub const DEFAULT_MEMBERSHIP_LEVEL: &str = "Regular";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub phone: String,

    /// Argon2 PHC string; never leaves the service
    pub password_hash: String,

    pub membership_level: String,

    pub membership_start: DateTimeWithTimeZone,

    pub membership_renewals: i32,

    pub avatar_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::room::Entity")]
    Room,
    #[sea_orm(has_many = "super::rfid_tag::Entity")]
    RfidTag,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::rfid_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RfidTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Guest profile as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GuestResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub membership_level: String,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub membership_start: DateTimeWithTimeZone,
    pub membership_renewals: i32,
    pub avatar_url: Option<String>,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for GuestResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            membership_level: model.membership_level,
            membership_start: model.membership_start,
            membership_renewals: model.membership_renewals,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
        }
    }
}
