//! # Feedback Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::models::feedback::{self, DEFAULT_FEEDBACK_STATUS, Entity as Feedback, Model as FeedbackModel};

pub struct FeedbackRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> FeedbackRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        guest_id: i32,
        feedback_type: String,
        description: String,
    ) -> Result<FeedbackModel, DbErr> {
        feedback::ActiveModel {
            guest_id: Set(guest_id),
            feedback_type: Set(feedback_type),
            description: Set(description),
            status: Set(DEFAULT_FEEDBACK_STATUS.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Newest first.
    pub async fn list_by_guest(&self, guest_id: i32) -> Result<Vec<FeedbackModel>, DbErr> {
        Feedback::find()
            .filter(feedback::Column::GuestId.eq(guest_id))
            .order_by_desc(feedback::Column::CreatedAt)
            .order_by_desc(feedback::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        Ok(Feedback::delete_many().exec(self.db).await?.rows_affected)
    }
}
