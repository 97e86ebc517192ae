//! # Guest Repository

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};

use crate::models::guest::{self, DEFAULT_MEMBERSHIP_LEVEL, Entity as Guest, Model as GuestModel};

/// Fields required to register a guest.
#[derive(Debug, Clone)]
pub struct NewGuest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub membership_level: Option<String>,
}

/// Profile fields a guest may edit; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct GuestProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Repository for guest rows
pub struct GuestRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> GuestRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewGuest) -> Result<GuestModel, DbErr> {
        let now = Utc::now().fixed_offset();

        guest::ActiveModel {
            name: Set(new.name),
            email: Set(new.email),
            phone: Set(new.phone),
            password_hash: Set(new.password_hash),
            membership_level: Set(new
                .membership_level
                .unwrap_or_else(|| DEFAULT_MEMBERSHIP_LEVEL.to_string())),
            membership_start: Set(now),
            membership_renewals: Set(0),
            avatar_url: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<GuestModel>, DbErr> {
        Guest::find_by_id(id).one(self.db).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<GuestModel>, DbErr> {
        Guest::find()
            .filter(guest::Column::Email.eq(email))
            .one(self.db)
            .await
    }

    /// Phone numbers are not unique, so every match is returned.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Vec<GuestModel>, DbErr> {
        Guest::find()
            .filter(guest::Column::Phone.eq(phone))
            .order_by_asc(guest::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<GuestModel>, DbErr> {
        Guest::find()
            .order_by_asc(guest::Column::Id)
            .all(self.db)
            .await
    }

    /// Case-insensitive substring match over name, email and phone.
    pub async fn search(&self, query: &str) -> Result<Vec<GuestModel>, DbErr> {
        let pattern = format!("%{}%", query.to_lowercase());
        let lower_like = |column: guest::Column| {
            Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone())
        };

        Guest::find()
            .filter(
                Condition::any()
                    .add(lower_like(guest::Column::Name))
                    .add(lower_like(guest::Column::Email))
                    .add(lower_like(guest::Column::Phone)),
            )
            .order_by_asc(guest::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn update_profile(
        &self,
        id: i32,
        update: GuestProfileUpdate,
    ) -> Result<Option<GuestModel>, DbErr> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(phone) = update.phone {
            model.phone = Set(phone);
        }

        model.update(self.db).await.map(Some)
    }

    pub async fn update_password(&self, id: i32, password_hash: String) -> Result<bool, DbErr> {
        let result = Guest::update_many()
            .set(guest::ActiveModel {
                password_hash: Set(password_hash),
                ..Default::default()
            })
            .filter(guest::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update_avatar(
        &self,
        id: i32,
        avatar_url: String,
    ) -> Result<Option<GuestModel>, DbErr> {
        let result = Guest::update_many()
            .set(guest::ActiveModel {
                avatar_url: Set(Some(avatar_url)),
                ..Default::default()
            })
            .filter(guest::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
