//! # RFID Tag Repository
//!
//! Status changes go through [`RfidTagRepository::apply`], a single
//! conditional `UPDATE` guarded by the transition's allowed source states.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::models::rfid_tag::{self, Entity as RfidTag, Model as RfidTagModel, RfidStatus};
use crate::stay::transitions::RfidTransition;

/// Repository for RFID tag rows
pub struct RfidTagRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RfidTagRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Registers a new card in the `available` state.
    pub async fn create(&self, rfid_uid: &str) -> Result<RfidTagModel, DbErr> {
        let now = Utc::now().fixed_offset();
        rfid_tag::ActiveModel {
            rfid_uid: Set(rfid_uid.to_string()),
            status: Set(RfidStatus::Available),
            guest_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    pub async fn find_by_uid(&self, rfid_uid: &str) -> Result<Option<RfidTagModel>, DbErr> {
        RfidTag::find()
            .filter(rfid_tag::Column::RfidUid.eq(rfid_uid))
            .one(self.db)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<RfidTagModel>, DbErr> {
        RfidTag::find()
            .order_by_asc(rfid_tag::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn list_by_status(&self, status: RfidStatus) -> Result<Vec<RfidTagModel>, DbErr> {
        RfidTag::find()
            .filter(rfid_tag::Column::Status.eq(status))
            .order_by_asc(rfid_tag::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn list_by_guest(&self, guest_id: i32) -> Result<Vec<RfidTagModel>, DbErr> {
        RfidTag::find()
            .filter(rfid_tag::Column::GuestId.eq(guest_id))
            .order_by_asc(rfid_tag::Column::Id)
            .all(self.db)
            .await
    }

    /// Applies `transition` to the tag if it is still in an allowed source
    /// state. Returns `None` when no row matched.
    ///
    /// `guest_id` is only consulted for [`RfidTransition::Assign`].
    pub async fn apply(
        &self,
        rfid_uid: &str,
        transition: RfidTransition,
        guest_id: Option<i32>,
    ) -> Result<Option<RfidTagModel>, DbErr> {
        let mut changes = rfid_tag::ActiveModel {
            status: Set(transition.to_state()),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        match transition {
            RfidTransition::Assign => changes.guest_id = Set(guest_id),
            RfidTransition::Unassign => changes.guest_id = Set(None),
            RfidTransition::Activate | RfidTransition::MarkLost => {}
        }

        let result = RfidTag::update_many()
            .set(changes)
            .filter(rfid_tag::Column::RfidUid.eq(rfid_uid))
            .filter(rfid_tag::Column::Status.is_in(transition.from_states().iter().copied()))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_uid(rfid_uid).await
    }

    /// Returns every assigned/active tag owned by `guest_id` to the pool.
    pub async fn reset_for_guest(&self, guest_id: i32) -> Result<u64, DbErr> {
        let result = RfidTag::update_many()
            .set(rfid_tag::ActiveModel {
                status: Set(RfidStatus::Available),
                guest_id: Set(None),
                updated_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            })
            .filter(rfid_tag::Column::GuestId.eq(guest_id))
            .filter(
                rfid_tag::Column::Status
                    .is_in(RfidTransition::Unassign.from_states().iter().copied()),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Puts every tag back to `available`, lost ones included, and unbinds
    /// its guest; used by the reset tool.
    pub async fn reset_all(&self) -> Result<u64, DbErr> {
        let result = RfidTag::update_many()
            .set(rfid_tag::ActiveModel {
                status: Set(RfidStatus::Available),
                guest_id: Set(None),
                updated_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            })
            .filter(rfid_tag::Column::Status.ne(RfidStatus::Available))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_guest, setup_db};

    #[tokio::test]
    async fn assign_only_succeeds_from_available() {
        let db = setup_db().await;
        let guest = seed_guest(&db, "ana@example.com").await;
        let repo = RfidTagRepository::new(&db);
        repo.create("A1").await.unwrap();

        let assigned = repo
            .apply("A1", RfidTransition::Assign, Some(guest.id))
            .await
            .unwrap()
            .expect("tag should be assigned");
        assert_eq!(assigned.status, RfidStatus::Assigned);
        assert_eq!(assigned.guest_id, Some(guest.id));

        // A second assign loses the compare-and-set
        let again = repo
            .apply("A1", RfidTransition::Assign, Some(guest.id))
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn lost_tags_cannot_be_unassigned() {
        let db = setup_db().await;
        let repo = RfidTagRepository::new(&db);
        repo.create("L1").await.unwrap();

        let lost = repo
            .apply("L1", RfidTransition::MarkLost, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lost.status, RfidStatus::Lost);

        assert!(
            repo.apply("L1", RfidTransition::Unassign, None)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.apply("L1", RfidTransition::MarkLost, None)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn reset_for_guest_leaves_other_guests_alone() {
        let db = setup_db().await;
        let ana = seed_guest(&db, "ana@example.com").await;
        let ben = seed_guest(&db, "ben@example.com").await;
        let repo = RfidTagRepository::new(&db);
        for uid in ["T1", "T2", "T3"] {
            repo.create(uid).await.unwrap();
        }
        repo.apply("T1", RfidTransition::Assign, Some(ana.id))
            .await
            .unwrap();
        repo.apply("T2", RfidTransition::Assign, Some(ana.id))
            .await
            .unwrap();
        repo.apply("T2", RfidTransition::Activate, None)
            .await
            .unwrap();
        repo.apply("T3", RfidTransition::Assign, Some(ben.id))
            .await
            .unwrap();

        let reset = repo.reset_for_guest(ana.id).await.unwrap();
        assert_eq!(reset, 2);

        let t3 = repo.find_by_uid("T3").await.unwrap().unwrap();
        assert_eq!(t3.status, RfidStatus::Assigned);
        assert_eq!(t3.guest_id, Some(ben.id));
        assert!(repo.list_by_guest(ana.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_all_returns_lost_tags_too() {
        let db = setup_db().await;
        let ana = seed_guest(&db, "ana@example.com").await;
        let repo = RfidTagRepository::new(&db);
        for uid in ["R1", "R2", "R3"] {
            repo.create(uid).await.unwrap();
        }
        repo.apply("R1", RfidTransition::Assign, Some(ana.id))
            .await
            .unwrap();
        repo.apply("R2", RfidTransition::Assign, Some(ana.id))
            .await
            .unwrap();
        repo.apply("R2", RfidTransition::MarkLost, None)
            .await
            .unwrap();

        // R3 is already available and is left alone
        assert_eq!(repo.reset_all().await.unwrap(), 2);

        for tag in repo.list_all().await.unwrap() {
            assert_eq!(tag.status, RfidStatus::Available);
            assert!(tag.guest_id.is_none());
        }
    }
}
