//! # Service Request Repository

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::models::service_request::{
    self, Entity as ServiceRequest, Model as ServiceRequestModel, ServiceRequestStatus,
};

#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub guest_id: i32,
    pub guest_name: String,
    pub service_type: String,
    pub description: String,
    pub preferred_time: DateTimeWithTimeZone,
}

pub struct ServiceRequestRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ServiceRequestRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewServiceRequest) -> Result<ServiceRequestModel, DbErr> {
        service_request::ActiveModel {
            guest_id: Set(new.guest_id),
            guest_name: Set(new.guest_name),
            service_type: Set(new.service_type),
            description: Set(new.description),
            preferred_time: Set(new.preferred_time),
            status: Set(ServiceRequestStatus::Pending),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ServiceRequestModel>, DbErr> {
        ServiceRequest::find_by_id(id).one(self.db).await
    }

    pub async fn update_status(
        &self,
        id: i32,
        status: ServiceRequestStatus,
    ) -> Result<Option<ServiceRequestModel>, DbErr> {
        let result = ServiceRequest::update_many()
            .set(service_request::ActiveModel {
                status: Set(status),
                ..Default::default()
            })
            .filter(service_request::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Newest preferred time first.
    pub async fn list_by_guest(
        &self,
        guest_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ServiceRequestModel>, DbErr> {
        ServiceRequest::find()
            .filter(service_request::Column::GuestId.eq(guest_id))
            .order_by_desc(service_request::Column::PreferredTime)
            .order_by_desc(service_request::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db)
            .await
    }

    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        Ok(ServiceRequest::delete_many()
            .exec(self.db)
            .await?
            .rows_affected)
    }
}
