//! # Stay lifecycle
//!
//! Door verification, check-in and checkout. These operations move a tag
//! and a room together, so they live here rather than in the handlers:
//! the HTTP layer, the checkout scheduler and the reset tool all go
//! through [`StayService`].

pub mod transitions;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use metrics::counter;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::SchedulerConfig;
use crate::models::guest::Model as GuestModel;
use crate::models::notification::{Recipient, kinds};
use crate::models::rfid_tag::{Model as RfidTagModel, RfidStatus};
use crate::models::room::{Model as RoomModel, RoomStatus};
use crate::repositories::{
    GuestRepository, NotificationDraft, NotificationRepository, RfidTagRepository, RoomRepository,
};
use transitions::{RfidTransition, compute_check_out, is_expired};

#[derive(Debug, Error)]
pub enum StayError {
    #[error("RFID tag {rfid_uid} is not registered")]
    RfidNotFound { rfid_uid: String },
    #[error("RFID tag {rfid_uid} is {status} and cannot open doors")]
    InvalidState { rfid_uid: String, status: RfidStatus },
    #[error("RFID tag {rfid_uid} is not assigned to a guest")]
    Unassigned { rfid_uid: String },
    #[error("Guest {guest_id} not found")]
    GuestNotFound { guest_id: i32 },
    #[error("Guest {guest_id} holds {candidates} rooms; a room number is required")]
    AmbiguousRoom { guest_id: i32, candidates: usize },
    #[error("Guest {guest_id} has no reserved or occupied room")]
    NoRoom { guest_id: i32 },
    #[error("Access to room {room_number} denied")]
    AccessDenied { room_number: String },
    #[error("Stay in room {room_number} has ended")]
    StayExpired { room_number: String },
    #[error("Room {room_number} has a stay length that cannot be scheduled")]
    InvalidStayLength { room_number: String },
    #[error("Room {room} not found")]
    RoomNotFound { room: String },
    #[error("{message}")]
    Conflict { message: String },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl StayError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StayError::RfidNotFound { .. } => "rfid_not_found",
            StayError::InvalidState { .. } => "invalid_state",
            StayError::Unassigned { .. } => "unassigned",
            StayError::GuestNotFound { .. } => "guest_not_found",
            StayError::AmbiguousRoom { .. } => "ambiguous_room",
            StayError::NoRoom { .. } => "no_room",
            StayError::AccessDenied { .. } => "access_denied",
            StayError::StayExpired { .. } => "stay_expired",
            StayError::InvalidStayLength { .. } => "invalid_stay_length",
            StayError::RoomNotFound { .. } => "room_not_found",
            StayError::Conflict { .. } => "conflict",
            StayError::Database(_) => "database",
        }
    }
}

/// Result of a granted door verification.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub rfid: RfidTagModel,
    pub guest: GuestModel,
    pub room: RoomModel,
}

/// Why a stay is being closed; selects the notification wording and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutReason {
    /// The stay window ran out (scheduler or a late door verify).
    Expired,
    /// Staff closed the stay through the API.
    Manual,
}

impl CheckoutReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutReason::Expired => "expired",
            CheckoutReason::Manual => "manual",
        }
    }

    fn notification_type(&self) -> &'static str {
        match self {
            CheckoutReason::Expired => kinds::AUTO_CHECKOUT,
            CheckoutReason::Manual => kinds::CHECKOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub room: RoomModel,
    pub tags_reset: u64,
}

pub struct StayService<'a> {
    db: &'a DatabaseConnection,
    checkout_grace: Duration,
}

impl<'a> StayService<'a> {
    pub fn new(db: &'a DatabaseConnection, checkout_grace: Duration) -> Self {
        Self { db, checkout_grace }
    }

    pub fn from_config(db: &'a DatabaseConnection, scheduler: &SchedulerConfig) -> Self {
        Self::new(db, Duration::seconds(scheduler.checkout_grace_seconds))
    }

    pub async fn verify(
        &self,
        rfid_uid: &str,
        room_number: Option<&str>,
    ) -> Result<VerifyOutcome, StayError> {
        self.verify_at(rfid_uid, room_number, Utc::now().fixed_offset())
            .await
    }

    /// Decides whether `rfid_uid` may open a room at `now`.
    ///
    /// The first granted verify of a reserved room checks the guest in and
    /// an assigned tag becomes active. A verify against an occupied room
    /// whose stay has run out performs the checkout and is refused.
    #[instrument(skip(self), fields(outcome = tracing::field::Empty))]
    pub async fn verify_at(
        &self,
        rfid_uid: &str,
        room_number: Option<&str>,
        now: DateTime<FixedOffset>,
    ) -> Result<VerifyOutcome, StayError> {
        let result = self.verify_inner(rfid_uid, room_number, now).await;
        let outcome = match &result {
            Ok(_) => "granted",
            Err(e) => e.kind(),
        };
        tracing::Span::current().record("outcome", outcome);
        counter!("rfid_verifications_total", "outcome" => outcome).increment(1);
        result
    }

    async fn verify_inner(
        &self,
        rfid_uid: &str,
        room_number: Option<&str>,
        now: DateTime<FixedOffset>,
    ) -> Result<VerifyOutcome, StayError> {
        let tags = RfidTagRepository::new(self.db);
        let tag = tags
            .find_by_uid(rfid_uid)
            .await?
            .ok_or_else(|| StayError::RfidNotFound {
                rfid_uid: rfid_uid.to_string(),
            })?;

        if !tag.status.grants_access() {
            return Err(StayError::InvalidState {
                rfid_uid: tag.rfid_uid,
                status: tag.status,
            });
        }
        let guest_id = tag.guest_id.ok_or_else(|| StayError::Unassigned {
            rfid_uid: tag.rfid_uid.clone(),
        })?;
        let guest = GuestRepository::new(self.db)
            .find_by_id(guest_id)
            .await?
            .ok_or(StayError::GuestNotFound { guest_id })?;

        let room = self.resolve_room(guest_id, room_number).await?;
        if room.guest_id != Some(guest_id) || !room.status.is_held() {
            return Err(StayError::AccessDenied {
                room_number: room.room_number,
            });
        }

        let room = match room.status {
            RoomStatus::Reserved => {
                let check_out = compute_check_out(now, room.hours_stay).ok_or_else(|| {
                    StayError::InvalidStayLength {
                        room_number: room.room_number.clone(),
                    }
                })?;
                let occupied = RoomRepository::new(self.db)
                    .occupy(room.id, now, check_out)
                    .await?
                    .ok_or_else(|| StayError::Conflict {
                        message: format!("Room {} changed state during check-in", room.room_number),
                    })?;
                info!(
                    room = %occupied.room_number,
                    guest_id,
                    check_out = %check_out,
                    "Guest checked in on first door verify"
                );
                occupied
            }
            _ => {
                let expired = room
                    .check_out
                    .is_some_and(|check_out| is_expired(check_out, now, self.checkout_grace));
                if expired {
                    let room_number = room.room_number.clone();
                    self.check_out_room(&room, CheckoutReason::Expired).await?;
                    return Err(StayError::StayExpired { room_number });
                }
                room
            }
        };

        let rfid = if tag.status == RfidStatus::Assigned {
            tags.apply(rfid_uid, RfidTransition::Activate, None)
                .await?
                .ok_or_else(|| StayError::Conflict {
                    message: format!("RFID tag {rfid_uid} changed state during verify"),
                })?
        } else {
            tag
        };

        Ok(VerifyOutcome { rfid, guest, room })
    }

    /// An explicit number must name an existing room; otherwise the guest
    /// must hold exactly one reserved or occupied room.
    async fn resolve_room(
        &self,
        guest_id: i32,
        room_number: Option<&str>,
    ) -> Result<RoomModel, StayError> {
        let rooms = RoomRepository::new(self.db);

        if let Some(number) = room_number.map(str::trim).filter(|n| !n.is_empty()) {
            return rooms
                .find_by_number(number)
                .await?
                .ok_or_else(|| StayError::AccessDenied {
                    room_number: number.to_string(),
                });
        }

        let mut held = rooms.list_held_by_guest(guest_id).await?;
        match held.len() {
            0 => Err(StayError::NoRoom { guest_id }),
            1 => Ok(held.remove(0)),
            candidates => Err(StayError::AmbiguousRoom {
                guest_id,
                candidates,
            }),
        }
    }

    /// Staff check-in of a reserved room; `at` defaults to now.
    #[instrument(skip(self))]
    pub async fn check_in(
        &self,
        room_id: i32,
        at: Option<DateTime<FixedOffset>>,
    ) -> Result<RoomModel, StayError> {
        let rooms = RoomRepository::new(self.db);
        let room = rooms
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| StayError::RoomNotFound {
                room: room_id.to_string(),
            })?;

        if room.status != RoomStatus::Reserved || room.guest_id.is_none() {
            return Err(StayError::Conflict {
                message: format!(
                    "Room {} is {} and cannot be checked in",
                    room.room_number, room.status
                ),
            });
        }

        let check_in = at.unwrap_or_else(|| Utc::now().fixed_offset());
        let check_out = compute_check_out(check_in, room.hours_stay).ok_or_else(|| {
            StayError::InvalidStayLength {
                room_number: room.room_number.clone(),
            }
        })?;
        let occupied = rooms
            .occupy(room.id, check_in, check_out)
            .await?
            .ok_or_else(|| StayError::Conflict {
                message: format!("Room {} changed state during check-in", room.room_number),
            })?;

        info!(room = %occupied.room_number, check_out = %check_out, "Room checked in");
        Ok(occupied)
    }

    /// Staff checkout of a reserved or occupied room.
    #[instrument(skip(self))]
    pub async fn check_out(&self, room_id: i32) -> Result<CheckoutOutcome, StayError> {
        let room = RoomRepository::new(self.db)
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| StayError::RoomNotFound {
                room: room_id.to_string(),
            })?;

        if !room.status.is_held() {
            return Err(StayError::Conflict {
                message: format!(
                    "Room {} is {} and has no stay to close",
                    room.room_number, room.status
                ),
            });
        }

        self.check_out_room(&room, CheckoutReason::Manual).await
    }

    /// Releases `room` and returns its guest's tags to the pool in one
    /// transaction, then notifies the guest and every admin.
    ///
    /// The release only matches while the same guest still holds the room;
    /// losing that race surfaces as [`StayError::Conflict`].
    pub async fn check_out_room(
        &self,
        room: &RoomModel,
        reason: CheckoutReason,
    ) -> Result<CheckoutOutcome, StayError> {
        let txn = self.db.begin().await?;

        let Some(released) = RoomRepository::new(&txn)
            .release(room.id, room.guest_id)
            .await?
        else {
            txn.rollback().await?;
            return Err(StayError::Conflict {
                message: format!("Room {} was already released", room.room_number),
            });
        };

        let tags_reset = match room.guest_id {
            Some(guest_id) => RfidTagRepository::new(&txn).reset_for_guest(guest_id).await?,
            None => 0,
        };
        txn.commit().await?;

        counter!("stay_checkouts_total", "reason" => reason.as_str()).increment(1);
        info!(
            room = %room.room_number,
            guest_id = ?room.guest_id,
            tags_reset,
            reason = reason.as_str(),
            "Room checked out"
        );

        if let Err(e) = self.notify_checkout(room, reason).await {
            warn!(room = %room.room_number, error = %e, "Failed to send checkout notifications");
        }

        Ok(CheckoutOutcome {
            room: released,
            tags_reset,
        })
    }

    async fn notify_checkout(&self, room: &RoomModel, reason: CheckoutReason) -> Result<(), DbErr> {
        let notifications = NotificationRepository::new(self.db);
        let (guest_title, guest_message, admin_title) = match reason {
            CheckoutReason::Expired => (
                "Automatic Checkout",
                format!(
                    "Your stay in room {} has ended and you have been checked out automatically.",
                    room.room_number
                ),
                "Room Auto Checkout",
            ),
            CheckoutReason::Manual => (
                "Checked Out",
                format!("You have been checked out of room {}.", room.room_number),
                "Room Checked Out",
            ),
        };

        if let Some(guest_id) = room.guest_id {
            notifications
                .create(
                    Recipient::Guest(guest_id),
                    NotificationDraft::new(guest_title, guest_message)
                        .with_type(reason.notification_type()),
                )
                .await?;
        }

        let guest_label = room
            .guest_id
            .map(|id| format!("guest #{id}"))
            .unwrap_or_else(|| "no guest".to_string());
        let admin_draft = NotificationDraft::new(
            admin_title,
            format!("Room {} is available again ({guest_label}).", room.room_number),
        )
        .with_type(reason.notification_type());
        notifications.broadcast_to_admins(&admin_draft).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_admin, seed_guest, seed_room, seed_tag, setup_db};
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, m, 0).unwrap().fixed_offset()
    }

    #[tokio::test]
    async fn first_verify_checks_in_and_activates_tag() {
        let db = setup_db().await;
        let guest = seed_guest(&db, "ana@example.com").await;
        seed_room(&db, "101", Some((guest.id, 2.0))).await;
        seed_tag(&db, "A1", Some(guest.id)).await;
        let stay = StayService::new(&db, Duration::zero());

        let outcome = stay.verify_at("A1", None, at(10, 0)).await.unwrap();
        assert_eq!(outcome.guest.id, guest.id);
        assert_eq!(outcome.rfid.status, RfidStatus::Active);
        assert_eq!(outcome.room.status, RoomStatus::Occupied);
        assert_eq!(outcome.room.check_in, Some(at(10, 0)));
        assert_eq!(outcome.room.check_out, Some(at(12, 0)));

        // Second verify keeps the original window
        let again = stay.verify_at("A1", Some("101"), at(11, 0)).await.unwrap();
        assert_eq!(again.room.check_out, Some(at(12, 0)));
        assert_eq!(again.rfid.status, RfidStatus::Active);
    }

    #[tokio::test]
    async fn unknown_lost_and_unassigned_tags_are_refused() {
        let db = setup_db().await;
        let stay = StayService::new(&db, Duration::zero());
        seed_tag(&db, "FREE", None).await;
        let lost = seed_tag(&db, "LOST", None).await;
        RfidTagRepository::new(&db)
            .apply(&lost.rfid_uid, RfidTransition::MarkLost, None)
            .await
            .unwrap();

        assert!(matches!(
            stay.verify_at("NOPE", None, at(10, 0)).await,
            Err(StayError::RfidNotFound { .. })
        ));
        assert!(matches!(
            stay.verify_at("FREE", None, at(10, 0)).await,
            Err(StayError::InvalidState {
                status: RfidStatus::Available,
                ..
            })
        ));
        assert!(matches!(
            stay.verify_at("LOST", None, at(10, 0)).await,
            Err(StayError::InvalidState {
                status: RfidStatus::Lost,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn room_resolution_needs_exactly_one_held_room() {
        let db = setup_db().await;
        let guest = seed_guest(&db, "ana@example.com").await;
        seed_tag(&db, "A1", Some(guest.id)).await;
        let stay = StayService::new(&db, Duration::zero());

        assert!(matches!(
            stay.verify_at("A1", None, at(10, 0)).await,
            Err(StayError::NoRoom { .. })
        ));

        seed_room(&db, "101", Some((guest.id, 1.0))).await;
        seed_room(&db, "102", Some((guest.id, 1.0))).await;
        assert!(matches!(
            stay.verify_at("A1", None, at(10, 0)).await,
            Err(StayError::AmbiguousRoom { candidates: 2, .. })
        ));

        let outcome = stay.verify_at("A1", Some("102"), at(10, 0)).await.unwrap();
        assert_eq!(outcome.room.room_number, "102");
    }

    #[tokio::test]
    async fn another_guests_room_is_denied() {
        let db = setup_db().await;
        let ana = seed_guest(&db, "ana@example.com").await;
        let ben = seed_guest(&db, "ben@example.com").await;
        seed_room(&db, "101", Some((ben.id, 1.0))).await;
        seed_room(&db, "102", Some((ana.id, 1.0))).await;
        seed_tag(&db, "A1", Some(ana.id)).await;
        let stay = StayService::new(&db, Duration::zero());

        assert!(matches!(
            stay.verify_at("A1", Some("101"), at(10, 0)).await,
            Err(StayError::AccessDenied { .. })
        ));
        assert!(matches!(
            stay.verify_at("A1", Some("999"), at(10, 0)).await,
            Err(StayError::AccessDenied { .. })
        ));
    }

    #[tokio::test]
    async fn expired_stay_is_checked_out_on_verify() {
        let db = setup_db().await;
        let guest = seed_guest(&db, "ana@example.com").await;
        seed_admin(&db, "frontdesk").await;
        let room = seed_room(&db, "101", Some((guest.id, 2.0))).await;
        seed_tag(&db, "A1", Some(guest.id)).await;
        let stay = StayService::new(&db, Duration::zero());

        stay.verify_at("A1", None, at(10, 0)).await.unwrap();
        let err = stay.verify_at("A1", None, at(12, 0)).await.unwrap_err();
        assert!(matches!(err, StayError::StayExpired { ref room_number } if room_number == "101"));

        let room = RoomRepository::new(&db).find_by_id(room.id).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        assert!(room.guest_id.is_none() && room.check_in.is_none() && room.check_out.is_none());

        let tag = RfidTagRepository::new(&db).find_by_uid("A1").await.unwrap().unwrap();
        assert_eq!(tag.status, RfidStatus::Available);
        assert!(tag.guest_id.is_none());

        let inbox = NotificationRepository::new(&db)
            .list_for(Recipient::Guest(guest.id))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].notification_type.as_deref(), Some(kinds::AUTO_CHECKOUT));
    }

    #[tokio::test]
    async fn grace_period_delays_expiry() {
        let db = setup_db().await;
        let guest = seed_guest(&db, "ana@example.com").await;
        seed_room(&db, "101", Some((guest.id, 1.0))).await;
        seed_tag(&db, "A1", Some(guest.id)).await;
        let stay = StayService::new(&db, Duration::minutes(5));

        stay.verify_at("A1", None, at(10, 0)).await.unwrap();
        assert!(stay.verify_at("A1", None, at(11, 4)).await.is_ok());
        assert!(matches!(
            stay.verify_at("A1", None, at(11, 5)).await,
            Err(StayError::StayExpired { .. })
        ));
    }

    #[tokio::test]
    async fn manual_check_in_and_check_out() {
        let db = setup_db().await;
        let guest = seed_guest(&db, "ana@example.com").await;
        let room = seed_room(&db, "101", Some((guest.id, 0.5))).await;
        let free = seed_room(&db, "102", None).await;
        seed_tag(&db, "A1", Some(guest.id)).await;
        let stay = StayService::new(&db, Duration::zero());

        assert!(matches!(
            stay.check_in(free.id, None).await,
            Err(StayError::Conflict { .. })
        ));
        assert!(matches!(
            stay.check_in(9999, None).await,
            Err(StayError::RoomNotFound { .. })
        ));

        let occupied = stay.check_in(room.id, Some(at(9, 0))).await.unwrap();
        assert_eq!(occupied.check_out, Some(at(9, 30)));

        let outcome = stay.check_out(room.id).await.unwrap();
        assert_eq!(outcome.room.status, RoomStatus::Available);
        assert_eq!(outcome.tags_reset, 1);

        assert!(matches!(
            stay.check_out(room.id).await,
            Err(StayError::Conflict { .. })
        ));

        let inbox = NotificationRepository::new(&db)
            .list_for(Recipient::Guest(guest.id))
            .await
            .unwrap();
        assert_eq!(inbox[0].notification_type.as_deref(), Some(kinds::CHECKOUT));
    }

    #[tokio::test]
    async fn unschedulable_stay_length_is_refused_without_changes() {
        let db = setup_db().await;
        let guest = seed_guest(&db, "ana@example.com").await;
        let room = seed_room(&db, "101", Some((guest.id, 1e12))).await;
        seed_tag(&db, "A1", Some(guest.id)).await;
        let stay = StayService::new(&db, Duration::zero());

        assert!(matches!(
            stay.verify_at("A1", None, at(10, 0)).await,
            Err(StayError::InvalidStayLength { .. })
        ));
        assert!(matches!(
            stay.check_in(room.id, Some(at(10, 0))).await,
            Err(StayError::InvalidStayLength { .. })
        ));

        let room = RoomRepository::new(&db)
            .find_by_id(room.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(room.status, RoomStatus::Reserved);
        assert!(room.check_in.is_none());

        let tag = RfidTagRepository::new(&db)
            .find_by_uid("A1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tag.status, RfidStatus::Assigned);

        // Staff can still clear the reservation
        let outcome = stay.check_out(room.id).await.unwrap();
        assert_eq!(outcome.room.status, RoomStatus::Available);
    }
}
