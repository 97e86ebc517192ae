//! Admin entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    pub password_hash: String,

    pub role: AdminRole,

    pub avatar_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

/// Staff role carried in issued tokens.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AdminRole {
    #[sea_orm(string_value = "superadmin")]
    #[serde(rename = "superadmin")]
    SuperAdmin,

    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    #[default]
    Admin,

    #[sea_orm(string_value = "manager")]
    #[serde(rename = "manager")]
    Manager,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "superadmin",
            AdminRole::Admin => "admin",
            AdminRole::Manager => "manager",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Admin account as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: AdminRole,
    pub avatar_url: Option<String>,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for AdminResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
        }
    }
}
