//! # Access Log Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::models::access_log::{self, AccessStatus, Entity as AccessLog, Model as AccessLogModel};

pub struct AccessLogRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AccessLogRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn record(
        &self,
        rfid_uid: &str,
        guest_id: Option<i32>,
        access_status: AccessStatus,
    ) -> Result<AccessLogModel, DbErr> {
        access_log::ActiveModel {
            rfid_uid: Set(rfid_uid.to_string()),
            guest_id: Set(guest_id),
            access_status: Set(access_status),
            door_unlocked: Set(access_status == AccessStatus::Granted),
            timestamp: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Newest first.
    pub async fn list_by_guest(
        &self,
        guest_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<AccessLogModel>, DbErr> {
        AccessLog::find()
            .filter(access_log::Column::GuestId.eq(guest_id))
            .order_by_desc(access_log::Column::Timestamp)
            .order_by_desc(access_log::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db)
            .await
    }

    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        Ok(AccessLog::delete_many().exec(self.db).await?.rows_affected)
    }
}
