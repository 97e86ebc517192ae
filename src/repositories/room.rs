//! # Room Repository
//!
//! Reservation, check-in and release are conditional updates keyed on the
//! current status; see [`RoomTransition`] for the allowed source states.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};

use crate::models::room::{self, Entity as Room, Model as RoomModel, RoomStatus};
use crate::stay::transitions::RoomTransition;

/// Fields for a new room. A room created with a guest starts out reserved.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub room_number: String,
    pub reservation: Option<Reservation>,
}

#[derive(Debug, Clone, Copy)]
pub struct Reservation {
    pub guest_id: i32,
    pub hours_stay: f64,
}

/// Repository for room rows
pub struct RoomRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RoomRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewRoom) -> Result<RoomModel, DbErr> {
        let now = Utc::now().fixed_offset();
        let mut model = room::ActiveModel {
            room_number: Set(new.room_number),
            status: Set(RoomStatus::Available),
            guest_id: Set(None),
            hours_stay: Set(None),
            registration_time: Set(None),
            check_in: Set(None),
            check_out: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        if let Some(reservation) = new.reservation {
            model.status = Set(RoomStatus::Reserved);
            model.guest_id = Set(Some(reservation.guest_id));
            model.hours_stay = Set(Some(reservation.hours_stay));
            model.registration_time = Set(Some(now));
        }

        model.insert(self.db).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<RoomModel>, DbErr> {
        Room::find_by_id(id).one(self.db).await
    }

    pub async fn find_by_number(&self, room_number: &str) -> Result<Option<RoomModel>, DbErr> {
        Room::find()
            .filter(room::Column::RoomNumber.eq(room_number))
            .one(self.db)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<RoomModel>, DbErr> {
        Room::find()
            .order_by_asc(room::Column::RoomNumber)
            .all(self.db)
            .await
    }

    /// Reserved or occupied rooms held by `guest_id`.
    pub async fn list_held_by_guest(&self, guest_id: i32) -> Result<Vec<RoomModel>, DbErr> {
        Room::find()
            .filter(room::Column::GuestId.eq(guest_id))
            .filter(room::Column::Status.is_in([RoomStatus::Reserved, RoomStatus::Occupied]))
            .order_by_asc(room::Column::Id)
            .all(self.db)
            .await
    }

    /// Occupied rooms that carry a check-out time, for the checkout sweep.
    pub async fn list_occupied_with_check_out(&self) -> Result<Vec<RoomModel>, DbErr> {
        Room::find()
            .filter(room::Column::Status.eq(RoomStatus::Occupied))
            .filter(room::Column::CheckOut.is_not_null())
            .order_by_asc(room::Column::Id)
            .all(self.db)
            .await
    }

    /// available -> reserved for `guest_id`.
    pub async fn reserve(
        &self,
        room_number: &str,
        reservation: Reservation,
    ) -> Result<Option<RoomModel>, DbErr> {
        let now = Utc::now().fixed_offset();
        let transition = RoomTransition::Reserve;
        let result = Room::update_many()
            .set(room::ActiveModel {
                status: Set(transition.to_state()),
                guest_id: Set(Some(reservation.guest_id)),
                hours_stay: Set(Some(reservation.hours_stay)),
                registration_time: Set(Some(now)),
                check_in: Set(None),
                check_out: Set(None),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(room::Column::RoomNumber.eq(room_number))
            .filter(room::Column::Status.is_in(transition.from_states().iter().copied()))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_number(room_number).await
    }

    /// reserved -> occupied with the given stay window.
    pub async fn occupy(
        &self,
        id: i32,
        check_in: DateTimeWithTimeZone,
        check_out: DateTimeWithTimeZone,
    ) -> Result<Option<RoomModel>, DbErr> {
        let transition = RoomTransition::CheckIn;
        let result = Room::update_many()
            .set(room::ActiveModel {
                status: Set(transition.to_state()),
                check_in: Set(Some(check_in)),
                check_out: Set(Some(check_out)),
                updated_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            })
            .filter(room::Column::Id.eq(id))
            .filter(room::Column::Status.is_in(transition.from_states().iter().copied()))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// reserved/occupied -> available, clearing the guest and every stay
    /// field in one statement. With `expected_guest` set, the update only
    /// matches while that guest still holds the room.
    pub async fn release(
        &self,
        id: i32,
        expected_guest: Option<i32>,
    ) -> Result<Option<RoomModel>, DbErr> {
        let transition = RoomTransition::Release;
        let mut update = Room::update_many()
            .set(Self::cleared_stay())
            .filter(room::Column::Id.eq(id))
            .filter(room::Column::Status.is_in(transition.from_states().iter().copied()));
        if let Some(guest_id) = expected_guest {
            update = update.filter(room::Column::GuestId.eq(guest_id));
        }
        let result = update.exec(self.db).await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Toggles between `available` and `maintenance`.
    pub async fn set_maintenance(
        &self,
        id: i32,
        transition: RoomTransition,
    ) -> Result<Option<RoomModel>, DbErr> {
        debug_assert!(matches!(
            transition,
            RoomTransition::EnterMaintenance | RoomTransition::ExitMaintenance
        ));
        let result = Room::update_many()
            .set(room::ActiveModel {
                status: Set(transition.to_state()),
                updated_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            })
            .filter(room::Column::Id.eq(id))
            .filter(room::Column::Status.is_in(transition.from_states().iter().copied()))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Edits the room number and/or stay length.
    pub async fn update_details(
        &self,
        id: i32,
        room_number: Option<String>,
        hours_stay: Option<f64>,
    ) -> Result<Option<RoomModel>, DbErr> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(room_number) = room_number {
            model.room_number = Set(room_number);
        }
        if let Some(hours_stay) = hours_stay {
            model.hours_stay = Set(Some(hours_stay));
        }
        model.updated_at = Set(Utc::now().fixed_offset());

        model.update(self.db).await.map(Some)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = Room::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Returns every held room to `available`; with `include_maintenance`
    /// rooms under maintenance are reopened too. Used by the reset tool.
    pub async fn release_all(&self, include_maintenance: bool) -> Result<u64, DbErr> {
        let mut statuses = RoomTransition::Release.from_states().to_vec();
        if include_maintenance {
            statuses.extend(RoomTransition::ExitMaintenance.from_states());
        }

        let result = Room::update_many()
            .set(Self::cleared_stay())
            .filter(room::Column::Status.is_in(statuses))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    fn cleared_stay() -> room::ActiveModel {
        room::ActiveModel {
            status: Set(RoomStatus::Available),
            guest_id: Set(None),
            hours_stay: Set(None),
            registration_time: Set(None),
            check_in: Set(None),
            check_out: Set(None),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_guest, setup_db};

    #[tokio::test]
    async fn reserve_requires_available_room() {
        let db = setup_db().await;
        let ana = seed_guest(&db, "ana@example.com").await;
        let ben = seed_guest(&db, "ben@example.com").await;
        let repo = RoomRepository::new(&db);
        repo.create(NewRoom {
            room_number: "101".to_string(),
            reservation: None,
        })
        .await
        .unwrap();

        let reserved = repo
            .reserve(
                "101",
                Reservation {
                    guest_id: ana.id,
                    hours_stay: 2.0,
                },
            )
            .await
            .unwrap()
            .expect("available room should reserve");
        assert_eq!(reserved.status, RoomStatus::Reserved);
        assert_eq!(reserved.guest_id, Some(ana.id));
        assert!(reserved.registration_time.is_some());

        let stolen = repo
            .reserve(
                "101",
                Reservation {
                    guest_id: ben.id,
                    hours_stay: 1.0,
                },
            )
            .await
            .unwrap();
        assert!(stolen.is_none());
    }

    #[tokio::test]
    async fn maintenance_rooms_cannot_be_reserved() {
        let db = setup_db().await;
        let ana = seed_guest(&db, "ana@example.com").await;
        let repo = RoomRepository::new(&db);
        let room = repo
            .create(NewRoom {
                room_number: "202".to_string(),
                reservation: None,
            })
            .await
            .unwrap();

        repo.set_maintenance(room.id, RoomTransition::EnterMaintenance)
            .await
            .unwrap()
            .unwrap();

        let result = repo
            .reserve(
                "202",
                Reservation {
                    guest_id: ana.id,
                    hours_stay: 1.0,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn release_clears_the_whole_stay() {
        let db = setup_db().await;
        let ana = seed_guest(&db, "ana@example.com").await;
        let repo = RoomRepository::new(&db);
        let room = repo
            .create(NewRoom {
                room_number: "303".to_string(),
                reservation: Some(Reservation {
                    guest_id: ana.id,
                    hours_stay: 3.0,
                }),
            })
            .await
            .unwrap();
        let now = Utc::now().fixed_offset();
        repo.occupy(room.id, now, now + chrono::Duration::hours(3))
            .await
            .unwrap()
            .unwrap();

        // Wrong guest does not match
        assert!(repo.release(room.id, Some(ana.id + 100)).await.unwrap().is_none());

        let released = repo.release(room.id, Some(ana.id)).await.unwrap().unwrap();
        assert_eq!(released.status, RoomStatus::Available);
        assert_eq!(released.guest_id, None);
        assert_eq!(released.hours_stay, None);
        assert_eq!(released.check_in, None);
        assert_eq!(released.check_out, None);

        // Second release has nothing to match
        assert!(repo.release(room.id, None).await.unwrap().is_none());
    }
}
