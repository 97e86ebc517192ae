//! Feedback / complaint entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_FEEDBACK_STATUS: &str = "pending";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feedback_complaints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guest_id: i32,
    /// Free-form category such as `feedback` or `complaint`
    pub feedback_type: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: i32,
    pub guest_id: i32,
    pub feedback_type: String,
    pub description: String,
    pub status: String,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for FeedbackResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            guest_id: model.guest_id,
            feedback_type: model.feedback_type,
            description: model.description,
            status: model.status,
            created_at: model.created_at,
        }
    }
}
