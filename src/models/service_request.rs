//! Service request entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "service_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guest_id: i32,
    /// Name snapshot taken at submission
    pub guest_name: String,
    pub service_type: String,
    pub description: String,
    pub preferred_time: DateTimeWithTimeZone,
    pub status: ServiceRequestStatus,
    pub created_at: DateTimeWithTimeZone,
}

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
pub enum ServiceRequestStatus {
    #[sea_orm(string_value = "pending")]
    #[serde(rename = "pending")]
    #[default]
    Pending,

    #[sea_orm(string_value = "in_progress")]
    #[serde(rename = "in_progress")]
    InProgress,

    #[sea_orm(string_value = "completed")]
    #[serde(rename = "completed")]
    Completed,

    #[sea_orm(string_value = "canceled")]
    #[serde(rename = "canceled")]
    Canceled,
}

impl ServiceRequestStatus {
    /// Human-readable label used in guest notifications and activity logs.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceRequestStatus::Pending => "Pending",
            ServiceRequestStatus::InProgress => "In Progress",
            ServiceRequestStatus::Completed => "Completed",
            ServiceRequestStatus::Canceled => "Canceled",
        }
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
pub struct ServiceRequestResponse {
    pub id: i32,
    pub guest_id: i32,
    pub guest_name: String,
    pub service_type: String,
    pub description: String,
    #[schema(value_type = String, example = "2026-01-01T18:30:00Z")]
    pub preferred_time: DateTimeWithTimeZone,
    pub status: ServiceRequestStatus,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for ServiceRequestResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            guest_id: model.guest_id,
            guest_name: model.guest_name,
            service_type: model.service_type,
            description: model.description,
            preferred_time: model.preferred_time,
            status: model.status,
            created_at: model.created_at,
        }
    }
}
