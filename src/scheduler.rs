//! # Checkout Scheduler
//!
//! Background task that sweeps occupied rooms on a fixed interval. Stays
//! about to end get a warning notification; stays past their check-out
//! time are closed through the shared checkout routine.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use metrics::{counter, gauge, histogram};
use sea_orm::{DatabaseConnection, DbErr};
use tokio::time::{Duration as TokioDuration, Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::notification::{Recipient, kinds};
use crate::models::room::Model as RoomModel;
use crate::repositories::{NotificationDraft, NotificationRepository, RoomRepository};
use crate::stay::transitions::{is_expired, minutes_remaining};
use crate::stay::{CheckoutReason, StayError, StayService};

/// Background scheduler service.
pub struct CheckoutScheduler {
    config: Arc<AppConfig>,
    db: Arc<DatabaseConnection>,
    /// Stays already warned, keyed by room and check-out time.
    warned: HashSet<(i32, DateTime<FixedOffset>)>,
}

#[derive(Debug, Default)]
struct TickStats {
    rooms_scanned: u64,
    warnings_sent: u64,
    checkouts: u64,
    rooms_with_errors: u64,
}

impl CheckoutScheduler {
    pub fn new(config: Arc<AppConfig>, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            warned: HashSet::new(),
        }
    }

    /// Run the scheduler loop until the provided shutdown token fires.
    #[instrument(skip_all)]
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), ApiError> {
        info!(
            tick_interval_seconds = self.config.scheduler.tick_interval_seconds,
            "Starting checkout scheduler"
        );
        let tick_interval = TokioDuration::from_secs(self.config.scheduler.tick_interval_seconds);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Checkout scheduler shutdown requested");
                    break;
                }
                _ = sleep(tick_interval) => {
                    let tick_started = Instant::now();
                    if let Err(err) = self.tick(Utc::now().fixed_offset()).await {
                        error!(error = ?err, "Scheduler tick failed");
                    }
                    let elapsed = tick_started.elapsed();
                    histogram!("checkout_scheduler_tick_duration_ms")
                        .record(elapsed.as_secs_f64() * 1_000.0);
                }
            }
        }

        info!("Checkout scheduler stopped");
        Ok(())
    }

    async fn tick(&mut self, now: DateTime<FixedOffset>) -> Result<TickStats, ApiError> {
        let mut stats = TickStats::default();

        let rooms = RoomRepository::new(self.db.as_ref())
            .list_occupied_with_check_out()
            .await
            .map_err(|err| map_db_err("failed to load occupied rooms", err))?;

        // Forget stays that have ended or been rescheduled.
        let live: HashSet<(i32, DateTime<FixedOffset>)> = rooms
            .iter()
            .filter_map(|room| room.check_out.map(|check_out| (room.id, check_out)))
            .collect();
        self.warned.retain(|key| live.contains(key));

        for room in rooms {
            stats.rooms_scanned += 1;
            if let Err(err) = self.process_room(&room, now, &mut stats).await {
                stats.rooms_with_errors += 1;
                error!(
                    error = %err,
                    room = %room.room_number,
                    "Failed to process room during checkout sweep"
                );
            }
        }

        gauge!("checkout_scheduler_occupied_rooms").set(stats.rooms_scanned as f64);

        debug!(
            scanned = stats.rooms_scanned,
            warnings = stats.warnings_sent,
            checkouts = stats.checkouts,
            errors = stats.rooms_with_errors,
            "Scheduler tick completed"
        );

        Ok(stats)
    }

    async fn process_room(
        &mut self,
        room: &RoomModel,
        now: DateTime<FixedOffset>,
        stats: &mut TickStats,
    ) -> Result<(), StayError> {
        let Some(check_out) = room.check_out else {
            return Ok(());
        };
        let scheduler = &self.config.scheduler;
        let grace = Duration::seconds(scheduler.checkout_grace_seconds);

        if is_expired(check_out, now, grace) {
            StayService::new(self.db.as_ref(), grace)
                .check_out_room(room, CheckoutReason::Expired)
                .await?;
            self.warned.remove(&(room.id, check_out));
            stats.checkouts += 1;
            counter!("checkout_scheduler_checkouts_total").increment(1);
            return Ok(());
        }

        // Any tick inside the lead window warns, so coarse intervals cannot skip it
        let remaining = minutes_remaining(check_out, now);
        let in_window = (0..=scheduler.warning_lead_minutes).contains(&remaining);
        if in_window && !self.warned.contains(&(room.id, check_out)) {
            self.send_warning(room, remaining).await?;
            self.warned.insert((room.id, check_out));
            stats.warnings_sent += 1;
            counter!("checkout_scheduler_warnings_total").increment(1);
        }

        Ok(())
    }

    async fn send_warning(&self, room: &RoomModel, remaining: i64) -> Result<(), DbErr> {
        let notifications = NotificationRepository::new(self.db.as_ref());

        if let Some(guest_id) = room.guest_id {
            notifications
                .create(
                    Recipient::Guest(guest_id),
                    NotificationDraft::new(
                        "Stay Ending Soon",
                        format!(
                            "Your stay in room {} ends in {remaining} minutes.",
                            room.room_number
                        ),
                    )
                    .with_type(kinds::STAY_ENDING_SOON),
                )
                .await?;
        }

        let admin_draft = NotificationDraft::new(
            "Stay Ending Soon",
            format!(
                "The stay in room {} ends in {remaining} minutes.",
                room.room_number
            ),
        )
        .with_type(kinds::STAY_ENDING_SOON);
        notifications.broadcast_to_admins(&admin_draft).await?;

        debug!(room = %room.room_number, remaining, "Sent stay ending warning");
        Ok(())
    }
}

fn map_db_err(context: &'static str, err: DbErr) -> ApiError {
    error!(error = ?err, context, "Database operation failed");
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_SERVER_ERROR",
        context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rfid_tag::RfidStatus;
    use crate::models::room::RoomStatus;
    use crate::repositories::RfidTagRepository;
    use crate::test_support::{seed_admin, seed_guest, seed_room, seed_tag, setup_db};
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, m, s)
            .unwrap()
            .fixed_offset()
    }

    async fn occupied_room(db: &DatabaseConnection) -> (i32, RoomModel) {
        let guest = seed_guest(db, "ana@example.com").await;
        seed_admin(db, "frontdesk").await;
        let room = seed_room(db, "101", Some((guest.id, 2.0))).await;
        seed_tag(db, "A1", Some(guest.id)).await;
        let room = RoomRepository::new(db)
            .occupy(room.id, at(10, 0, 0), at(12, 0, 0))
            .await
            .unwrap()
            .unwrap();
        (guest.id, room)
    }

    fn scheduler(db: DatabaseConnection) -> CheckoutScheduler {
        CheckoutScheduler::new(Arc::new(AppConfig::default()), Arc::new(db))
    }

    #[tokio::test]
    async fn warns_once_at_lead_time() {
        let db = setup_db().await;
        let (guest_id, _) = occupied_room(&db).await;
        let mut scheduler = scheduler(db.clone());

        let stats = scheduler.tick(at(11, 45, 0)).await.unwrap();
        assert_eq!(stats.warnings_sent, 0);

        let stats = scheduler.tick(at(11, 50, 0)).await.unwrap();
        assert_eq!(stats.warnings_sent, 1);

        // Same minute again: already warned
        let stats = scheduler.tick(at(11, 50, 30)).await.unwrap();
        assert_eq!(stats.warnings_sent, 0);

        let inbox = NotificationRepository::new(&db)
            .list_for(Recipient::Guest(guest_id))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].notification_type.as_deref(), Some(kinds::STAY_ENDING_SOON));
    }

    #[tokio::test]
    async fn coarse_ticks_still_warn_once() {
        let db = setup_db().await;
        let (guest_id, _) = occupied_room(&db).await;
        let mut config = AppConfig::default();
        config.scheduler.tick_interval_seconds = 120;
        let mut scheduler = CheckoutScheduler::new(Arc::new(config), Arc::new(db.clone()));

        // 15, 13, 11, 9 and 7 minutes left: the exact lead minute is never hit
        let mut warnings = 0;
        for minute in [45, 47, 49, 51, 53] {
            warnings += scheduler.tick(at(11, minute, 0)).await.unwrap().warnings_sent;
        }
        assert_eq!(warnings, 1);

        let inbox = NotificationRepository::new(&db)
            .list_for(Recipient::Guest(guest_id))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].message.contains("ends in 9 minutes"));
    }

    #[tokio::test]
    async fn expired_stay_is_checked_out() {
        let db = setup_db().await;
        let (guest_id, room) = occupied_room(&db).await;
        let mut scheduler = scheduler(db.clone());

        let stats = scheduler.tick(at(11, 59, 59)).await.unwrap();
        assert_eq!(stats.checkouts, 0);

        let stats = scheduler.tick(at(12, 0, 0)).await.unwrap();
        assert_eq!(stats.checkouts, 1);
        assert_eq!(stats.rooms_with_errors, 0);

        let room = RoomRepository::new(&db)
            .find_by_id(room.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        assert!(room.guest_id.is_none());

        let tag = RfidTagRepository::new(&db)
            .find_by_uid("A1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tag.status, RfidStatus::Available);

        let inbox = NotificationRepository::new(&db)
            .list_for(Recipient::Guest(guest_id))
            .await
            .unwrap();
        assert!(
            inbox
                .iter()
                .any(|n| n.notification_type.as_deref() == Some(kinds::AUTO_CHECKOUT))
        );

        // Nothing left to sweep
        let stats = scheduler.tick(at(12, 1, 0)).await.unwrap();
        assert_eq!(stats.rooms_scanned, 0);
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let db = setup_db().await;
        let token = CancellationToken::new();
        let handle = tokio::spawn(scheduler(db).run(token.clone()));
        token.cancel();
        handle.await.unwrap().unwrap();
    }
}
