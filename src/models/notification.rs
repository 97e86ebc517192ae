//! Notification entity model
//!
//! Exactly one of `recipient_guest_id` / `recipient_admin_id` is set.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Notification types emitted by the service itself.
pub mod kinds {
    pub const SERVICE_REQUEST: &str = "service_request";
    pub const STATUS_UPDATE: &str = "status_update";
    pub const STAY_ENDING_SOON: &str = "stay_ending_soon";
    pub const AUTO_CHECKOUT: &str = "auto_checkout";
    pub const CHECKOUT: &str = "checkout";
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub recipient_guest_id: Option<i32>,
    pub recipient_admin_id: Option<i32>,
    pub title: String,
    pub message: String,
    pub note_message: Option<String>,
    pub notification_type: Option<String>,
    pub is_read: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Guest(i32),
    Admin(i32),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub recipient_guest_id: Option<i32>,
    pub recipient_admin_id: Option<i32>,
    pub title: String,
    pub message: String,
    pub note_message: Option<String>,
    pub notification_type: Option<String>,
    pub is_read: bool,
    #[schema(value_type = String, example = "2026-01-01T12:00:00Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for NotificationResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            recipient_guest_id: model.recipient_guest_id,
            recipient_admin_id: model.recipient_admin_id,
            title: model.title,
            message: model.message,
            note_message: model.note_message,
            notification_type: model.notification_type,
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}
