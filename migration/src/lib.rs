//! Database migrations for the Innkeeper API.
//!
//! One migration per table, applied in dependency order (guests and admins
//! first, then the tables that reference them).

pub use sea_orm_migration::prelude::*;

mod m2026_01_05_000001_create_guests;
mod m2026_01_05_000002_create_admins;
mod m2026_01_05_000003_create_rfid_tags;
mod m2026_01_05_000004_create_rooms;
mod m2026_01_05_000005_create_service_requests;
mod m2026_01_05_000006_create_feedback_complaints;
mod m2026_01_05_000007_create_notifications;
mod m2026_01_05_000008_create_access_logs;
mod m2026_01_05_000009_create_activity_logs;
mod m2026_01_05_000010_create_mac_addresses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_01_05_000001_create_guests::Migration),
            Box::new(m2026_01_05_000002_create_admins::Migration),
            Box::new(m2026_01_05_000003_create_rfid_tags::Migration),
            Box::new(m2026_01_05_000004_create_rooms::Migration),
            Box::new(m2026_01_05_000005_create_service_requests::Migration),
            Box::new(m2026_01_05_000006_create_feedback_complaints::Migration),
            Box::new(m2026_01_05_000007_create_notifications::Migration),
            Box::new(m2026_01_05_000008_create_access_logs::Migration),
            Box::new(m2026_01_05_000009_create_activity_logs::Migration),
            Box::new(m2026_01_05_000010_create_mac_addresses::Migration),
        ]
    }
}
