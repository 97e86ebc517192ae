//! # Activity Log Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::models::activity_log::{self, Entity as ActivityLog, Model as ActivityLogModel};

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub request_id: i32,
    pub admin_id: Option<i32>,
    pub guest_id: Option<i32>,
    pub log_type: String,
    pub log_message: String,
}

pub struct ActivityLogRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ActivityLogRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewActivityLog) -> Result<ActivityLogModel, DbErr> {
        activity_log::ActiveModel {
            request_id: Set(new.request_id),
            admin_id: Set(new.admin_id),
            guest_id: Set(new.guest_id),
            log_type: Set(new.log_type),
            log_message: Set(new.log_message),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Oldest first, so the trail reads chronologically.
    pub async fn list_by_request(
        &self,
        request_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ActivityLogModel>, DbErr> {
        ActivityLog::find()
            .filter(activity_log::Column::RequestId.eq(request_id))
            .order_by_asc(activity_log::Column::CreatedAt)
            .order_by_asc(activity_log::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db)
            .await
    }

    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        Ok(ActivityLog::delete_many()
            .exec(self.db)
            .await?
            .rows_affected)
    }
}
