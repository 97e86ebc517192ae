//! # Notification Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::models::notification::{
    self, Entity as Notification, Model as NotificationModel, Recipient,
};
use crate::repositories::AdminRepository;

/// Notification content independent of its recipient.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub note_message: Option<String>,
    pub notification_type: Option<String>,
}

impl NotificationDraft {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            note_message: None,
            notification_type: None,
        }
    }

    pub fn with_type(mut self, notification_type: &str) -> Self {
        self.notification_type = Some(notification_type.to_string());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note_message = Some(note.into());
        self
    }
}

pub struct NotificationRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> NotificationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        recipient: Recipient,
        draft: NotificationDraft,
    ) -> Result<NotificationModel, DbErr> {
        let (guest_id, admin_id) = match recipient {
            Recipient::Guest(id) => (Some(id), None),
            Recipient::Admin(id) => (None, Some(id)),
        };

        notification::ActiveModel {
            recipient_guest_id: Set(guest_id),
            recipient_admin_id: Set(admin_id),
            title: Set(draft.title),
            message: Set(draft.message),
            note_message: Set(draft.note_message),
            notification_type: Set(draft.notification_type),
            is_read: Set(false),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Sends one copy of `draft` to every admin; returns how many were sent.
    pub async fn broadcast_to_admins(&self, draft: &NotificationDraft) -> Result<usize, DbErr> {
        let admin_ids = AdminRepository::new(self.db).list_ids().await?;
        for admin_id in &admin_ids {
            self.create(Recipient::Admin(*admin_id), draft.clone())
                .await?;
        }
        Ok(admin_ids.len())
    }

    pub async fn list_for(&self, recipient: Recipient) -> Result<Vec<NotificationModel>, DbErr> {
        let filter = match recipient {
            Recipient::Guest(id) => notification::Column::RecipientGuestId.eq(id),
            Recipient::Admin(id) => notification::Column::RecipientAdminId.eq(id),
        };

        Notification::find()
            .filter(filter)
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn mark_read(&self, id: i32) -> Result<Option<NotificationModel>, DbErr> {
        let result = Notification::update_many()
            .set(notification::ActiveModel {
                is_read: Set(true),
                ..Default::default()
            })
            .filter(notification::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        Notification::find_by_id(id).one(self.db).await
    }

    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = Notification::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        Ok(Notification::delete_many()
            .exec(self.db)
            .await?
            .rows_affected)
    }
}
