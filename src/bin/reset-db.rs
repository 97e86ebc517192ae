//! Clears operational data between demo runs.
//!
//! Deletes access/activity logs, feedback, notifications and service
//! requests, then returns every RFID tag and held room to `available`.
//! Guests, admins and MAC address records are left intact.

use anyhow::{Context, Result, bail};
use clap::Parser;
use innkeeper::{
    config::ConfigLoader,
    db,
    repositories::{
        AccessLogRepository, ActivityLogRepository, FeedbackRepository, NotificationRepository,
        RfidTagRepository, RoomRepository, ServiceRequestRepository,
    },
    telemetry,
};
use sea_orm::TransactionTrait;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "reset-db", about = "Reset Innkeeper operational data")]
struct Args {
    /// Confirm the reset; nothing is changed without it
    #[arg(long)]
    yes: bool,

    /// Also reopen rooms that are under maintenance
    #[arg(long)]
    include_maintenance: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config)?;

    if !args.yes {
        bail!(
            "refusing to reset profile '{}' without --yes",
            config.profile
        );
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    if config.run_migrations {
        db::run_migrations(&db).await?;
    }

    let txn = db.begin().await.context("starting transaction")?;

    let access_logs = AccessLogRepository::new(&txn).delete_all().await?;
    let activity_logs = ActivityLogRepository::new(&txn).delete_all().await?;
    let feedback = FeedbackRepository::new(&txn).delete_all().await?;
    let notifications = NotificationRepository::new(&txn).delete_all().await?;
    let service_requests = ServiceRequestRepository::new(&txn).delete_all().await?;
    let tags = RfidTagRepository::new(&txn).reset_all().await?;
    let rooms = RoomRepository::new(&txn)
        .release_all(args.include_maintenance)
        .await?;

    txn.commit().await.context("committing reset")?;

    info!(
        profile = %config.profile,
        access_logs,
        activity_logs,
        feedback,
        notifications,
        service_requests,
        tags_reset = tags,
        rooms_released = rooms,
        "Database reset complete"
    );
    Ok(())
}
