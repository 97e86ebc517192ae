//! Activity log entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const LOG_REQUEST_CREATED: &str = "request_created";
pub const LOG_STATUS_CHANGE: &str = "status_change";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub request_id: i32,
    pub admin_id: Option<i32>,
    pub guest_id: Option<i32>,
    pub log_type: String,
    pub log_message: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_request::Entity",
        from = "Column::RequestId",
        to = "super::service_request::Column::Id"
    )]
    ServiceRequest,
}

impl Related<super::service_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityLogResponse {
    pub id: i32,
    pub request_id: i32,
    pub admin_id: Option<i32>,
    pub guest_id: Option<i32>,
    pub log_type: String,
    pub log_message: String,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for ActivityLogResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            request_id: model.request_id,
            admin_id: model.admin_id,
            guest_id: model.guest_id,
            log_type: model.log_type,
            log_message: model.log_message,
            created_at: model.created_at,
        }
    }
}
