//! # Admin Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::models::admin::{self, AdminRole, Entity as Admin, Model as AdminModel};

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
}

#[derive(Debug, Clone, Default)]
pub struct AdminProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<AdminRole>,
}

/// Repository for admin rows
pub struct AdminRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AdminRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewAdmin) -> Result<AdminModel, DbErr> {
        admin::ActiveModel {
            username: Set(new.username),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            role: Set(new.role),
            avatar_url: Set(None),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<AdminModel>, DbErr> {
        Admin::find_by_id(id).one(self.db).await
    }

    /// Login accepts either the username or the email address.
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<AdminModel>, DbErr> {
        Admin::find()
            .filter(
                Condition::any()
                    .add(admin::Column::Username.eq(identifier))
                    .add(admin::Column::Email.eq(identifier)),
            )
            .one(self.db)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<AdminModel>, DbErr> {
        Admin::find()
            .order_by_asc(admin::Column::Id)
            .all(self.db)
            .await
    }

    /// Ids of every admin, for broadcast notifications.
    pub async fn list_ids(&self) -> Result<Vec<i32>, DbErr> {
        Admin::find()
            .select_only()
            .column(admin::Column::Id)
            .order_by_asc(admin::Column::Id)
            .into_tuple::<i32>()
            .all(self.db)
            .await
    }

    pub async fn update_profile(
        &self,
        id: i32,
        update: AdminProfileUpdate,
    ) -> Result<Option<AdminModel>, DbErr> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(username) = update.username {
            model.username = Set(username);
        }
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(role) = update.role {
            model.role = Set(role);
        }

        model.update(self.db).await.map(Some)
    }

    pub async fn update_password(&self, id: i32, password_hash: String) -> Result<bool, DbErr> {
        let result = Admin::update_many()
            .set(admin::ActiveModel {
                password_hash: Set(password_hash),
                ..Default::default()
            })
            .filter(admin::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update_avatar(
        &self,
        id: i32,
        avatar_url: String,
    ) -> Result<Option<AdminModel>, DbErr> {
        let result = Admin::update_many()
            .set(admin::ActiveModel {
                avatar_url: Set(Some(avatar_url)),
                ..Default::default()
            })
            .filter(admin::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
